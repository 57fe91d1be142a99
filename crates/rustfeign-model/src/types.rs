//! Small value types shared by descriptors, metadata, and templates.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP request verbs recognised by request-line annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// CONNECT
    Connect,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
    /// PATCH
    Patch,
}

impl HttpMethod {
    /// Returns the verb as it appears on the request line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Patch => "PATCH",
        }
    }

    /// Whether requests with this verb normally carry a body.
    #[must_use]
    pub fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "CONNECT" => Ok(Self::Connect),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "PATCH" => Ok(Self::Patch),
            other => Err(format!("unknown HTTP method: {other}")),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Connect => Self::CONNECT,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Trace => Self::TRACE,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

/// How a multi-valued query parameter is rendered on the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollectionFormat {
    /// One `name=value` pair per value.
    #[default]
    Exploded,
    /// Comma separated: `name=a,b`.
    Csv,
    /// Space separated: `name=a%20b`.
    Ssv,
    /// Tab separated: `name=a%09b`.
    Tsv,
    /// Pipe separated: `name=a|b`.
    Pipes,
}

impl CollectionFormat {
    /// The (already encoded) separator placed between values, or `None` for exploded.
    #[must_use]
    pub fn separator(&self) -> Option<&'static str> {
        match self {
            Self::Exploded => None,
            Self::Csv => Some(","),
            Self::Ssv => Some("%20"),
            Self::Tsv => Some("%09"),
            Self::Pipes => Some("|"),
        }
    }

    /// Render `name` with its encoded `values` as query-string fragments.
    #[must_use]
    pub fn render(&self, name: &str, values: &[String]) -> Vec<String> {
        if values.is_empty() {
            return vec![name.to_owned()];
        }
        match self.separator() {
            None => values.iter().map(|v| format!("{name}={v}")).collect(),
            Some(sep) => vec![format!("{name}={}", values.join(sep))],
        }
    }
}

/// Declared type of a method parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A string.
    String,
    /// A signed integer.
    Integer,
    /// A floating point number.
    Float,
    /// A boolean.
    Boolean,
    /// Raw bytes.
    Bytes,
    /// A sequence of elements.
    List(Box<ParamType>),
    /// A mapping.
    Map {
        /// Key type.
        key: Box<ParamType>,
        /// Value type.
        value: Box<ParamType>,
    },
    /// An absolute URI overriding the target URL.
    Uri,
    /// Per-call request options.
    Options,
    /// Any other structured type, by name.
    Object(String),
    /// No value.
    Unit,
}

impl ParamType {
    /// A list of `elem`.
    #[must_use]
    pub fn list(elem: ParamType) -> Self {
        Self::List(Box::new(elem))
    }

    /// A map from `key` to `value`.
    #[must_use]
    pub fn map(key: ParamType, value: ParamType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// A string-keyed map of arbitrary values.
    #[must_use]
    pub fn string_map() -> Self {
        Self::map(Self::String, Self::object("Object"))
    }

    /// A named structured type.
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    /// Whether this is a mapping type.
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map { .. })
    }

    /// Whether this is a mapping type keyed by strings.
    #[must_use]
    pub fn is_string_keyed_map(&self) -> bool {
        matches!(self, Self::Map { key, .. } if **key == Self::String)
    }

    /// The erased type name used in config keys.
    #[must_use]
    pub fn erased_name(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Integer => "i64",
            Self::Float => "f64",
            Self::Boolean => "bool",
            Self::Bytes => "Bytes",
            Self::List(_) => "Vec",
            Self::Map { .. } => "Map",
            Self::Uri => "Uri",
            Self::Options => "RequestOptions",
            Self::Object(name) => name,
            Self::Unit => "()",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(elem) => write!(f, "Vec<{elem}>"),
            Self::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            other => f.write_str(other.erased_name()),
        }
    }
}

/// Per-request transport options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestOptions {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
    /// Whether redirects are followed.
    pub follow_redirects: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
            follow_redirects: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_http_methods() {
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("get".parse::<HttpMethod>().is_err());
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_should_render_collection_formats() {
        let values = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(
            CollectionFormat::Exploded.render("x", &values),
            vec!["x=a", "x=b"]
        );
        assert_eq!(CollectionFormat::Csv.render("x", &values), vec!["x=a,b"]);
        assert_eq!(CollectionFormat::Ssv.render("x", &values), vec!["x=a%20b"]);
        assert_eq!(CollectionFormat::Pipes.render("x", &values), vec!["x=a|b"]);
        assert_eq!(CollectionFormat::Csv.render("flag", &[]), vec!["flag"]);
    }

    #[test]
    fn test_should_erase_generic_types() {
        assert_eq!(ParamType::list(ParamType::String).erased_name(), "Vec");
        assert_eq!(ParamType::string_map().erased_name(), "Map");
        assert_eq!(ParamType::object("User").erased_name(), "User");
        assert_eq!(
            ParamType::list(ParamType::Integer).to_string(),
            "Vec<i64>"
        );
    }

    #[test]
    fn test_should_detect_string_keyed_maps() {
        assert!(ParamType::string_map().is_string_keyed_map());
        assert!(!ParamType::map(ParamType::Integer, ParamType::String).is_string_keyed_map());
        assert!(!ParamType::String.is_map());
    }
}

//! Built-in annotations.
//!
//! The first group is the native declarative surface (request line, body, headers,
//! named parameters, query map, header map). The second group mirrors MVC-style
//! mappings and is understood by the mapping rule set.

use crate::descriptor::Annotation;
use crate::expander::ExpanderFactory;
use crate::types::{CollectionFormat, HttpMethod};

/// Static headers, on an interface or a method. Each entry is `"Name: value"`.
#[derive(Debug, Clone, Default)]
pub struct Headers(pub Vec<String>);

impl Headers {
    /// Headers from `"Name: value"` entries.
    #[must_use]
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = S>) -> Self {
        Self(entries.into_iter().map(Into::into).collect())
    }
}

impl Annotation for Headers {}

/// Verb and URI template of a method, e.g. `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone)]
pub struct RequestLine {
    /// The request line.
    pub value: String,
    /// Whether `/` in expanded path values is left unencoded.
    pub decode_slash: bool,
    /// How multi-valued query parameters are rendered.
    pub collection_format: CollectionFormat,
}

impl RequestLine {
    /// A request line with default flags.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            decode_slash: true,
            collection_format: CollectionFormat::Exploded,
        }
    }

    /// Set the slash-decoding flag.
    #[must_use]
    pub fn decode_slash(mut self, decode_slash: bool) -> Self {
        self.decode_slash = decode_slash;
        self
    }

    /// Set the collection format.
    #[must_use]
    pub fn collection_format(mut self, format: CollectionFormat) -> Self {
        self.collection_format = format;
        self
    }
}

impl Annotation for RequestLine {}

/// Literal body, or body template when it contains `{`.
#[derive(Debug, Clone)]
pub struct Body(pub String);

impl Body {
    /// A body annotation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl Annotation for Body {}

/// Marks a method the contract must not compile; invoking it always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ignore;

impl Annotation for Ignore {}

/// Binds a parameter to one or more template variables.
#[derive(Debug, Clone)]
pub struct Param {
    /// Variable names the parameter satisfies.
    pub names: Vec<String>,
    /// Custom expander, when the default string form is not wanted.
    pub expander: Option<ExpanderFactory>,
}

impl Param {
    /// Bind to a single variable name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            expander: None,
        }
    }

    /// Bind to several variable names.
    #[must_use]
    pub fn names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            expander: None,
        }
    }

    /// Use a custom expander.
    #[must_use]
    pub fn expander(mut self, factory: ExpanderFactory) -> Self {
        self.expander = Some(factory);
        self
    }
}

impl Annotation for Param {}

/// Marks a mapping (or object) parameter as a bulk query source.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryMap {
    /// Whether keys and values are already percent-encoded.
    pub encoded: bool,
}

impl QueryMap {
    /// A query map whose entries will be percent-encoded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A query map whose entries are already encoded.
    #[must_use]
    pub fn encoded() -> Self {
        Self { encoded: true }
    }
}

impl Annotation for QueryMap {}

/// Marks a string-keyed mapping parameter as a bulk header source.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderMap;

impl Annotation for HeaderMap {}

// ---------------------------------------------------------------------------
// Mapping-style annotations
// ---------------------------------------------------------------------------

/// MVC-style mapping, on an interface (path prefix) or a method.
#[derive(Debug, Clone, Default)]
pub struct RequestMapping {
    /// Verb; `GET` when not given.
    pub method: Option<HttpMethod>,
    /// Path, relative to the interface prefix.
    pub path: Option<String>,
    /// Media types produced by the server; the first becomes `Accept`.
    pub produces: Vec<String>,
    /// Media types consumed by the server; the first becomes `Content-Type`.
    pub consumes: Vec<String>,
    /// `"name=value"` header entries.
    pub headers: Vec<String>,
}

impl RequestMapping {
    /// A mapping for `method` on `path`.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// A `GET` mapping.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// A `POST` mapping.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// A path-only mapping, used as an interface-level prefix.
    #[must_use]
    pub fn prefix(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Add a produced media type.
    #[must_use]
    pub fn produces(mut self, media_type: impl Into<String>) -> Self {
        self.produces.push(media_type.into());
        self
    }

    /// Add a consumed media type.
    #[must_use]
    pub fn consumes(mut self, media_type: impl Into<String>) -> Self {
        self.consumes.push(media_type.into());
        self
    }

    /// Add a `"name=value"` header entry.
    #[must_use]
    pub fn header(mut self, entry: impl Into<String>) -> Self {
        self.headers.push(entry.into());
        self
    }
}

impl Annotation for RequestMapping {}

/// Sets the collection format of a mapped method.
#[derive(Debug, Clone, Copy)]
pub struct CollectionFormatting(pub CollectionFormat);

impl Annotation for CollectionFormatting {}

/// Binds a parameter to a path variable.
#[derive(Debug, Clone)]
pub struct PathVariable(pub String);

impl Annotation for PathVariable {}

/// Binds a parameter to a query parameter, or marks a map parameter as query map.
#[derive(Debug, Clone)]
pub struct RequestParam(pub String);

impl Annotation for RequestParam {}

/// Binds a parameter to a header, or marks a map parameter as header map.
#[derive(Debug, Clone)]
pub struct RequestHeader(pub String);

impl Annotation for RequestHeader {}

/// Marks an object parameter whose fields become query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryObject;

impl Annotation for QueryObject {}

//! Request templates and `{variable}` expansion.
//!
//! A [`RequestTemplate`] is first a skeleton, built once by the contract and owned by
//! [`MethodMetadata`](crate::metadata::MethodMetadata), then a per-call working copy:
//! the template compiler clones the skeleton, resolves it against the call's
//! [`Variables`], and layers query-map and header-map entries on top.
//!
//! Expansion rules:
//!
//! - path: values are percent-encoded; `/` stays literal when `decode_slash` is set;
//!   unresolved expressions expand to nothing.
//! - query: a value whose expressions are all unresolved is dropped, and a parameter
//!   left without values is removed; a lone `{list}` expression yields one value per
//!   element.
//! - headers: as query, without percent-encoding.
//! - body template: raw substitution; `%7B` / `%7D` escape literal braces.

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::{FeignError, FeignResult};
use crate::multimap::Multimap;
use crate::request::Request;
use crate::target::Target;
use crate::types::{CollectionFormat, HttpMethod};
use crate::value::Value;

/// Everything except RFC 3986 unreserved characters is encoded.
pub const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Default request charset.
pub const UTF_8: &str = "UTF-8";

/// Percent-encode a URI component.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

fn encode_path(value: &str, decode_slash: bool) -> String {
    let encoded = encode_component(value);
    if decode_slash {
        encoded.replace("%2F", "/")
    } else {
        encoded
    }
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

/// Ordered template variables for one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    entries: Vec<(String, Value)>,
}

impl Variables {
    /// An empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing a previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Whether `name` is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variable is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split into the variables whose names satisfy `pred`, and the rest.
    #[must_use]
    pub fn partition(&self, pred: impl Fn(&str) -> bool) -> (Self, Self) {
        let (selected, rest): (Vec<_>, Vec<_>) =
            self.entries.iter().cloned().partition(|(k, _)| pred(k));
        (Self { entries: selected }, Self { entries: rest })
    }

    /// Convert into a [`Value::Map`].
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Map(self.entries)
    }
}

// ---------------------------------------------------------------------------
// Expression scanning
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Literal(&'a str),
    Expression(&'a str),
}

fn chunks(template: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        if open > 0 {
            out.push(Chunk::Literal(&rest[..open]));
        }
        let inner = &rest[open + 1..close];
        let name = inner.split(':').next().unwrap_or(inner).trim();
        out.push(Chunk::Expression(name));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        out.push(Chunk::Literal(rest));
    }
    out
}

/// Variable names referenced by `template`, in order of appearance.
#[must_use]
pub fn expression_names(template: &str) -> Vec<&str> {
    chunks(template)
        .into_iter()
        .filter_map(|c| match c {
            Chunk::Expression(name) => Some(name),
            Chunk::Literal(_) => None,
        })
        .collect()
}

struct Expanded {
    text: String,
    expressions: usize,
    unresolved: usize,
}

impl Expanded {
    fn fully_unresolved(&self) -> bool {
        self.expressions > 0 && self.unresolved == self.expressions
    }
}

fn element_strings(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => None,
        Value::List(items) => Some(items.iter().filter_map(Value::to_template_string).collect()),
        other => other.to_template_string().map(|s| vec![s]),
    }
}

fn expand(
    template: &str,
    variables: &Variables,
    encode: &dyn Fn(&str) -> String,
    list_separator: &str,
) -> Expanded {
    let mut out = Expanded {
        text: String::with_capacity(template.len()),
        expressions: 0,
        unresolved: 0,
    };
    for chunk in chunks(template) {
        match chunk {
            Chunk::Literal(text) => out.text.push_str(text),
            Chunk::Expression(name) => {
                out.expressions += 1;
                match variables.get(name).and_then(element_strings) {
                    Some(values) if !values.is_empty() => {
                        let encoded: Vec<String> = values.iter().map(|v| encode(v)).collect();
                        out.text.push_str(&encoded.join(list_separator));
                    }
                    _ => out.unresolved += 1,
                }
            }
        }
    }
    out
}

/// Expand one multimap value template, possibly into several values.
fn expand_values(
    template: &str,
    variables: &Variables,
    encode: &dyn Fn(&str) -> String,
) -> Vec<String> {
    if let [Chunk::Expression(name)] = chunks(template).as_slice() {
        return variables
            .get(name)
            .and_then(element_strings)
            .unwrap_or_default()
            .iter()
            .map(|v| encode(v))
            .collect();
    }
    let expanded = expand(template, variables, encode, ",");
    if expanded.fully_unresolved() {
        Vec::new()
    } else {
        vec![expanded.text]
    }
}

fn resolve_multimap(map: &mut Multimap, variables: &Variables, encode: &dyn Fn(&str) -> String) {
    map.retain(|_, values| {
        if values.is_empty() {
            return true;
        }
        let resolved: Vec<String> = values
            .iter()
            .flat_map(|v| expand_values(v, variables, encode))
            .collect();
        *values = resolved;
        !values.is_empty()
    });
}

// ---------------------------------------------------------------------------
// RequestTemplate
// ---------------------------------------------------------------------------

/// A mutable request under construction.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    method: Option<HttpMethod>,
    target: Option<String>,
    uri: String,
    queries: Multimap,
    headers: Multimap,
    body: Option<Bytes>,
    body_template: Option<String>,
    charset: Option<String>,
    decode_slash: bool,
    collection_format: CollectionFormat,
    resolved: bool,
    feign_target: Option<Target>,
}

impl Default for RequestTemplate {
    fn default() -> Self {
        Self {
            method: None,
            target: None,
            uri: String::new(),
            queries: Multimap::new(),
            headers: Multimap::case_insensitive(),
            body: None,
            body_template: None,
            charset: None,
            decode_slash: true,
            collection_format: CollectionFormat::Exploded,
            resolved: false,
            feign_target: None,
        }
    }
}

impl RequestTemplate {
    /// An empty template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The HTTP verb, once set.
    #[must_use]
    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Set the HTTP verb.
    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = Some(method);
    }

    /// The path template (or resolved path).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.uri
    }

    /// Replace the URI template; a `?query` suffix is split into query templates.
    pub fn set_uri(&mut self, uri: &str) {
        self.uri.clear();
        self.append_uri(uri);
    }

    /// Append to the URI template; a `?query` suffix is split into query templates.
    pub fn append_uri(&mut self, uri: &str) {
        let (path, query) = match uri.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (uri, None),
        };
        self.uri.push_str(path);
        if let Some(query) = query {
            self.append_query_string(query);
        }
    }

    fn append_query_string(&mut self, query: &str) {
        for pair in query.split('&').filter(|s| !s.is_empty()) {
            match pair.split_once('=') {
                Some((name, value)) => self.queries.append(name, [value]),
                None => self.queries.append(pair, Vec::<String>::new()),
            }
        }
    }

    /// The explicit request target (scheme, host, optional base path).
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Set the request target; any `?query` suffix is merged into the query map.
    pub fn set_target(&mut self, url: &str) {
        let (base, query) = match url.split_once('?') {
            Some((b, q)) => (b, Some(q)),
            None => (url, None),
        };
        self.target = Some(base.trim_end_matches('/').to_owned());
        if let Some(query) = query {
            self.append_query_string(query);
        }
    }

    /// Query parameters (templates before resolution, encoded values after).
    #[must_use]
    pub fn queries(&self) -> &Multimap {
        &self.queries
    }

    /// Append query values under `name`.
    pub fn query<S: Into<String>>(&mut self, name: &str, values: impl IntoIterator<Item = S>) {
        self.queries.append(name, values);
    }

    /// Remove a query parameter.
    pub fn remove_query(&mut self, name: &str) -> Option<Vec<String>> {
        self.queries.remove(name)
    }

    /// Headers (templates before resolution).
    #[must_use]
    pub fn headers(&self) -> &Multimap {
        &self.headers
    }

    /// Append header values under `name`.
    pub fn header<S: Into<String>>(&mut self, name: &str, values: impl IntoIterator<Item = S>) {
        self.headers.append(name, values);
    }

    /// Replace the header values under `name`.
    pub fn set_header<S: Into<String>>(&mut self, name: &str, values: impl IntoIterator<Item = S>) {
        self.headers.replace(name, values);
    }

    /// Remove a header.
    pub fn remove_header(&mut self, name: &str) -> Option<Vec<String>> {
        self.headers.remove(name)
    }

    /// The body bytes, when set.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Set the body bytes and charset; clears any body template.
    pub fn set_body(&mut self, body: impl Into<Bytes>, charset: Option<&str>) {
        self.body = Some(body.into());
        self.charset = charset.map(ToOwned::to_owned);
        self.body_template = None;
    }

    /// Set a UTF-8 text body.
    pub fn set_body_text(&mut self, body: impl Into<String>) {
        self.set_body(Bytes::from(body.into()), Some(UTF_8));
    }

    /// The body template, when set.
    #[must_use]
    pub fn body_template(&self) -> Option<&str> {
        self.body_template.as_deref()
    }

    /// Set a body template; clears any literal body.
    pub fn set_body_template(&mut self, template: impl Into<String>) {
        self.body_template = Some(template.into());
        self.body = None;
        self.charset = Some(UTF_8.to_owned());
    }

    /// Body charset.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Whether `/` in path values stays unencoded.
    #[must_use]
    pub fn decode_slash(&self) -> bool {
        self.decode_slash
    }

    /// Set the slash-decoding flag.
    pub fn set_decode_slash(&mut self, decode_slash: bool) {
        self.decode_slash = decode_slash;
    }

    /// Rendering mode for multi-valued query parameters.
    #[must_use]
    pub fn collection_format(&self) -> CollectionFormat {
        self.collection_format
    }

    /// Set the collection format.
    pub fn set_collection_format(&mut self, format: CollectionFormat) {
        self.collection_format = format;
    }

    /// The logical target this template is built for.
    #[must_use]
    pub fn feign_target(&self) -> Option<&Target> {
        self.feign_target.as_ref()
    }

    /// Attach the logical target.
    pub fn set_feign_target(&mut self, target: Target) {
        self.feign_target = Some(target);
    }

    /// Whether [`resolve`](Self::resolve) has run.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Every variable name referenced by the URI, query, header, or body templates.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |template: &str| {
            for name in expression_names(template) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_owned());
                }
            }
        };
        push(&self.uri);
        for (_, values) in self.queries.iter() {
            values.iter().for_each(|v| push(v));
        }
        for (_, values) in self.headers.iter() {
            values.iter().for_each(|v| push(v));
        }
        if let Some(body) = &self.body_template {
            push(body);
        }
        names
    }

    /// Whether `name` is referenced by any template part.
    #[must_use]
    pub fn has_request_variable(&self, name: &str) -> bool {
        self.variables().iter().any(|n| n == name)
    }

    /// Substitute `variables` into every template part.
    pub fn resolve(&mut self, variables: &Variables) {
        let decode_slash = self.decode_slash;
        self.uri = expand(
            &self.uri,
            variables,
            &|v| encode_path(v, decode_slash),
            ",",
        )
        .text;

        resolve_multimap(&mut self.queries, variables, &encode_component);
        resolve_multimap(&mut self.headers, variables, &|v| v.to_owned());

        if let Some(body_template) = self.body_template.take() {
            let expanded = expand(&body_template, variables, &|v| v.to_owned(), ",");
            let text = expanded.text.replace("%7B", "{").replace("%7D", "}");
            self.body = Some(Bytes::from(text));
            self.charset.get_or_insert_with(|| UTF_8.to_owned());
        }

        self.resolved = true;
    }

    /// The rendered query string, without the leading `?`.
    #[must_use]
    pub fn query_line(&self) -> String {
        self.queries
            .iter()
            .flat_map(|(name, values)| self.collection_format.render(name, values))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// The full URL: target, path, and query string.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = self.target.clone().unwrap_or_default();
        url.push_str(&self.uri);
        if !self.queries.is_empty() {
            url.push('?');
            url.push_str(&self.query_line());
        }
        url
    }

    /// Freeze into an immutable [`Request`].
    ///
    /// # Errors
    /// Fails when the template is unresolved or has no HTTP verb.
    pub fn request(&self) -> FeignResult<Request> {
        if !self.resolved {
            return Err(FeignError::InvalidRequest(
                "template has not been resolved".to_owned(),
            ));
        }
        let method = self
            .method
            .ok_or_else(|| FeignError::InvalidRequest("request method not set".to_owned()))?;
        Ok(Request::new(
            method,
            self.url(),
            self.headers.clone(),
            self.body.clone(),
            self.charset.clone(),
        ))
    }
}

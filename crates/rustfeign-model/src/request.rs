//! Immutable requests handed to a client, and the responses it returns.

use bytes::Bytes;

use crate::multimap::Multimap;
use crate::types::HttpMethod;

/// A fully resolved HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: HttpMethod,
    url: String,
    headers: Multimap,
    body: Option<Bytes>,
    charset: Option<String>,
}

impl Request {
    /// Assemble a request.
    #[must_use]
    pub fn new(
        method: HttpMethod,
        url: String,
        headers: Multimap,
        body: Option<Bytes>,
        charset: Option<String>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            charset,
        }
    }

    /// HTTP verb.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Absolute (or target-relative) URL including the query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers.
    #[must_use]
    pub fn headers(&self) -> &Multimap {
        &self.headers
    }

    /// Body bytes.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Body as UTF-8 text, lossily.
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Body charset.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }
}

/// A response as returned by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code.
    pub status: u16,
    /// Reason phrase, when the transport reports one.
    pub reason: Option<String>,
    /// Headers.
    pub headers: Multimap,
    /// Body bytes.
    pub body: Bytes,
}

impl Response {
    /// A response with `status` and `body` and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: None,
            headers: Multimap::case_insensitive(),
            body: body.into(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.append(name, [value.into()]);
        self
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

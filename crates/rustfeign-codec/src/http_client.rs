//! Glue between finished requests and the [`http`] crate.
//!
//! Any transport speaking `http::Request<Bytes>` / `http::Response<Bytes>` can back
//! a client through [`HttpClient`].

use std::fmt;

use bytes::Bytes;
use futures::future::BoxFuture;
use rustfeign_core::handler::Client;
use rustfeign_model::{FeignError, FeignResult, Request, RequestOptions, Response};
use tracing::debug;

use crate::error::CodecError;

/// Future returned by an [`HttpClient`] send function.
pub type HttpFuture =
    BoxFuture<'static, Result<http::Response<Bytes>, Box<dyn std::error::Error + Send + Sync>>>;

/// Convert a finished request into an `http` request.
///
/// # Errors
/// Fails when the URL, a header name, or a header value is not valid HTTP.
pub fn to_http_request(request: &Request) -> Result<http::Request<Bytes>, CodecError> {
    let mut builder = http::Request::builder()
        .method(request.method().as_str())
        .uri(request.url());
    for (name, values) in request.headers().iter() {
        for value in values {
            builder = builder.header(name, value.as_str());
        }
    }
    Ok(builder.body(request.body().cloned().unwrap_or_default())?)
}

/// Convert an `http` response into a [`Response`].
///
/// Header values that are not visible ASCII are dropped.
#[must_use]
pub fn from_http_response(response: http::Response<Bytes>) -> Response {
    let (parts, body) = response.into_parts();
    let mut out = Response::new(parts.status.as_u16(), body);
    out.reason = parts.status.canonical_reason().map(str::to_owned);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            out.headers.append(name.as_str(), [value]);
        }
    }
    out
}

/// A [`Client`] backed by a function sending `http` requests.
pub struct HttpClient<F> {
    send: F,
}

impl<F> HttpClient<F>
where
    F: Fn(http::Request<Bytes>, RequestOptions) -> HttpFuture + Send + Sync,
{
    /// A client sending every request through `send`.
    pub fn new(send: F) -> Self {
        Self { send }
    }
}

impl<F> fmt::Debug for HttpClient<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HttpClient(..)")
    }
}

#[async_trait::async_trait]
impl<F> Client for HttpClient<F>
where
    F: Fn(http::Request<Bytes>, RequestOptions) -> HttpFuture + Send + Sync,
{
    async fn execute(&self, request: Request, options: RequestOptions) -> FeignResult<Response> {
        let http_request =
            to_http_request(&request).map_err(|e| FeignError::InvalidRequest(e.to_string()))?;
        debug!(method = %http_request.method(), uri = %http_request.uri(), "sending http request");
        let response = (self.send)(http_request, options)
            .await
            .map_err(FeignError::Transport)?;
        debug!(status = response.status().as_u16(), "received http response");
        Ok(from_http_response(response))
    }
}

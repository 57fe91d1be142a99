//! End-to-end tests for RustFeign clients.
//!
//! Proxies are built over a [`RecordingClient`] that answers from a script of
//! canned responses and keeps every request it was sent, so the tests can assert
//! the exact wire form of each call without a server.
//!
//! Run them with:
//! ```text
//! cargo test -p rustfeign-integration
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use bytes::Bytes;
use rustfeign_core::handler::Client;
use rustfeign_core::FeignBuilder;
use rustfeign_model::{FeignResult, Request, RequestOptions, Response};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A client answering from a script and recording what it was sent.
///
/// Once the script runs out every request gets `200` with an empty body.
#[derive(Debug, Default)]
pub struct RecordingClient {
    script: Mutex<VecDeque<Response>>,
    sent: Mutex<Vec<(Request, RequestOptions)>>,
}

impl RecordingClient {
    /// A shared client with an empty script.
    #[must_use]
    pub fn new() -> Arc<Self> {
        init_tracing();
        Arc::new(Self::default())
    }

    /// Queue a `status` response carrying `body`.
    pub fn respond(&self, status: u16, body: &str) {
        self.script
            .lock()
            .expect("script lock")
            .push_back(Response::new(status, Bytes::from(body.to_owned())));
    }

    /// Every request sent so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.sent
            .lock()
            .expect("sent lock")
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    /// The options of every request sent so far.
    #[must_use]
    pub fn options(&self) -> Vec<RequestOptions> {
        self.sent
            .lock()
            .expect("sent lock")
            .iter()
            .map(|(_, options)| *options)
            .collect()
    }

    /// The most recent request.
    ///
    /// # Panics
    /// Panics when nothing was sent.
    #[must_use]
    pub fn last(&self) -> Request {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl Client for RecordingClient {
    async fn execute(&self, request: Request, options: RequestOptions) -> FeignResult<Response> {
        tracing::debug!(method = %request.method(), url = request.url(), "recording request");
        self.sent
            .lock()
            .expect("sent lock")
            .push((request, options));
        let next = self.script.lock().expect("script lock").pop_front();
        Ok(next.unwrap_or_else(|| Response::new(200, Bytes::new())))
    }
}

/// A builder sending through `client`.
#[must_use]
pub fn feign(client: &Arc<RecordingClient>) -> FeignBuilder {
    FeignBuilder::with_client(client.clone())
}

mod test_form;
mod test_github;
mod test_mapping;
mod test_proxy;

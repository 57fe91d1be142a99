//! In-memory client for unit tests.

use std::sync::Mutex;

use bytes::Bytes;
use rustfeign_model::{FeignResult, Request, RequestOptions, Response};

use crate::handler::Client;

/// Answers every request with a fixed response and keeps what it was sent.
#[derive(Debug)]
pub(crate) struct RecordingClient {
    status: u16,
    body: Bytes,
    sent: Mutex<Vec<(Request, RequestOptions)>>,
}

impl RecordingClient {
    pub(crate) fn new(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body: Bytes::from_static(body.as_bytes()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sent(&self) -> Vec<(Request, RequestOptions)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Request {
        self.sent().pop().expect("no request was sent").0
    }
}

#[async_trait::async_trait]
impl Client for RecordingClient {
    async fn execute(&self, request: Request, options: RequestOptions) -> FeignResult<Response> {
        self.sent.lock().unwrap().push((request, options));
        Ok(Response::new(self.status, self.body.clone()))
    }
}

//! In-memory transport for unit tests.

use crate::error::Result;
use crate::http::{Request, Response, Transport};
use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

type Handler = Box<dyn Fn(&Request) -> Result<Response> + Send + Sync>;

/// Answers every request with `handler` and records what was sent.
pub struct RecordingTransport {
    handler: Handler,
    requests: Mutex<Vec<Request>>,
}

impl RecordingTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: &Request) -> Result<Response> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

pub fn response(url: &str, redirected: bool, status: u16, body: &str) -> Response {
    Response {
        url: Url::parse(url).unwrap(),
        redirected,
        status,
        body: body.to_string(),
    }
}

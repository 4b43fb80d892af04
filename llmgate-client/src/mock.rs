//! Scripted in-memory transport for deterministic tests.
//!
//! Responses are queued in order and every request is recorded, so tests
//! can assert both what was sent and how many calls happened.
//!
//! ```
//! use llmgate_client::mock::MockTransport;
//!
//! let transport = MockTransport::new()
//!     .with_json(200, r#"{"choices": []}"#)
//!     .with_transport_error("connection reset");
//! assert_eq!(transport.remaining(), 2);
//! assert_eq!(transport.call_count(), 0);
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{LlmError, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};

enum Scripted {
    Response(HttpResponse),
    TransportError(String),
}

/// A [`Transport`] that replays queued responses.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a raw body.
    #[must_use]
    pub fn with_response(self, response: HttpResponse) -> Self {
        self.script.lock().push_back(Scripted::Response(response));
        self
    }

    /// Queue a response with a JSON text body.
    #[must_use]
    pub fn with_json(self, status: u16, body: &str) -> Self {
        self.with_response(HttpResponse::new(status, body.as_bytes()))
    }

    /// Queue a connection failure.
    #[must_use]
    pub fn with_transport_error(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(Scripted::TransportError(message.into()));
        self
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Copies of every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Scripted responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request);
        match self.script.lock().pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::TransportError(message)) => Err(LlmError::Transport(message)),
            None => Err(LlmError::Transport("mock transport script exhausted".into())),
        }
    }
}

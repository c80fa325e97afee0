//! Common test utilities shared across integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use async_trait::async_trait;
use courier::{Courier, CourierError, HttpRequest, RawResponse, Transport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[allow(dead_code)]
pub const BASE_URL: &str = "https://api.example.com/v1/";

/// A canned transport reply. Errors are stored as text because
/// `CourierError` is not `Clone`.
#[derive(Debug, Clone)]
pub enum Reply {
    Response(RawResponse),
    Fail(String),
}

/// Transport that records every request and replays queued replies.
///
/// When the queue is empty it answers `200` with no body.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.push(Reply::Response(RawResponse::new(status, body.to_string())))
    }

    pub fn respond_status(&self, status: u16) -> &Self {
        self.push(Reply::Response(RawResponse::status_only(status)))
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.push(Reply::Fail(message.to_string()))
    }

    fn push(&self, reply: Reply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Requests seen so far, in dispatch order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse, CourierError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(CourierError::transport(message)),
            None => Ok(RawResponse::status_only(200)),
        }
    }
}

/// Creates a courier wired to a fresh mock transport.
#[allow(dead_code)]
pub fn mock_courier() -> (Courier, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let courier = Courier::builder(BASE_URL)
        .transport(transport.clone())
        .build();
    (courier, transport)
}

/// Same as [`mock_courier`] with server error normalization enabled.
#[allow(dead_code)]
pub fn normalizing_courier() -> (Courier, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let courier = Courier::builder(BASE_URL)
        .transport(transport.clone())
        .normalize_server_errors(true)
        .build();
    (courier, transport)
}

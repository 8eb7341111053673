//! Test doubles for the HTTP transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use http::{HeaderMap, Request, Response};

use crate::client::{HttpClient, HttpError};

/// A request as seen by the [`MockHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// Request target.
    pub uri: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw (compressed) request body.
    pub body: Vec<u8>,
}

type MockReply = Result<u16, String>;

/// An [`HttpClient`] that records every request and replies from a scripted
/// queue; once the queue is exhausted it accepts everything with `202`.
#[derive(Clone, Debug, Default)]
pub struct MockHttpClient {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
}

impl MockHttpClient {
    /// A mock accepting every request with status 202.
    pub fn new() -> Self {
        MockHttpClient::default()
    }

    /// Queue a response with the given status for the next request.
    pub fn respond_with(&self, status: u16) -> &Self {
        lock(&self.replies).push_back(Ok(status));
        self
    }

    /// Queue a transport failure (e.g. a timeout) for the next request.
    pub fn fail_with(&self, message: &str) -> &Self {
        lock(&self.replies).push_back(Err(message.to_string()));
        self
    }

    /// Number of requests attempted so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Snapshot of all requests attempted so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl HttpClient for MockHttpClient {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpError> {
        lock(&self.requests).push(RecordedRequest {
            uri: request.uri().to_string(),
            headers: request.headers().clone(),
            body: request.body().clone(),
        });

        match lock(&self.replies).pop_front().unwrap_or(Ok(202)) {
            Ok(status) => Ok(Response::builder().status(status).body(Vec::new())?),
            Err(message) => Err(message.into()),
        }
    }
}

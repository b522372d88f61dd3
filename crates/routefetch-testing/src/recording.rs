//! In-process transport that records requests instead of sending them

use crate::expectation::MockResponse;
use crate::server::RecordedRequest;
use async_trait::async_trait;
use routefetch_core::{
    BoxError, Client, FinalizedRequest, RequestOptions, RouteResolver, Transport,
    TransportResponse,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A [`Transport`] that stores every finalized request and answers from a
/// script.
///
/// Scripted replies are consumed in order; once the script is empty every
/// request gets the fallback response (`200 OK` with body `{}` by default).
/// Clones share the same log and script, so a test can keep one handle and
/// give another to the client.
///
/// ```rust,ignore
/// let transport = RecordingTransport::new();
/// let api = transport.client("/");
/// api.segment("users").get().execute().await?;
/// assert_eq!(transport.last_request().unwrap().url, "/users/");
/// ```
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Default)]
struct RecordingState {
    requests: Vec<FinalizedRequest>,
    script: VecDeque<Reply>,
    fallback: Option<MockResponse>,
}

enum Reply {
    Respond(MockResponse),
    Fail(String),
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root resolver of a client that dispatches through this transport
    pub fn client(&self, base_path: &str) -> RouteResolver {
        self.client_with(base_path, RequestOptions::new())
    }

    /// Like [`client`](Self::client), with base options
    pub fn client_with(&self, base_path: &str, base_options: RequestOptions) -> RouteResolver {
        Client::builder(base_path)
            .options(base_options)
            .transport(self.clone())
            .build()
    }

    /// Queue a response for the next unanswered request
    pub fn respond_with(&self, response: MockResponse) -> &Self {
        self.lock().script.push_back(Reply::Respond(response));
        self
    }

    /// Queue a transport failure for the next unanswered request
    pub fn fail_with(&self, message: impl Into<String>) -> &Self {
        self.lock().script.push_back(Reply::Fail(message.into()));
        self
    }

    /// Response used once the script runs out
    pub fn fallback(&self, response: MockResponse) -> &Self {
        self.lock().fallback = Some(response);
        self
    }

    /// Every request dispatched so far
    pub fn requests(&self) -> Vec<FinalizedRequest> {
        self.lock().requests.clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<FinalizedRequest> {
        self.lock().requests.last().cloned()
    }

    /// Requests converted to the mock server's shape, for use with matchers
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.lock().requests.iter().map(RecordedRequest::from).collect()
    }

    /// Forget recorded requests; the script is kept
    pub fn clear(&self) {
        self.lock().requests.clear();
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn dispatch(&self, request: FinalizedRequest) -> Result<TransportResponse, BoxError> {
        let mut state = self.lock();
        state.requests.push(request);
        match state.script.pop_front() {
            Some(Reply::Respond(response)) => Ok(response.to_transport_response()),
            Some(Reply::Fail(message)) => Err(message.into()),
            None => Ok(match &state.fallback {
                Some(response) => response.to_transport_response(),
                None => MockResponse::new().body("{}").to_transport_response(),
            }),
        }
    }
}

/// Shorthand for a client whose requests are only recorded
pub fn recording_client(base_path: &str) -> (RouteResolver, RecordingTransport) {
    let transport = RecordingTransport::new();
    (transport.client(base_path), transport)
}

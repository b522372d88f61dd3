use super::expectation::{Expectation, MockResponse, Times};
use super::matcher::RequestMatcher;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use routefetch_core::{create_client, FinalizedRequest, RequestOptions, RouteResolver};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

type GenericError = Box<dyn std::error::Error + Send + Sync>;
type Result<T> = std::result::Result<T, GenericError>;

/// A mock HTTP server on a random local port.
///
/// Expectations registered later take priority over earlier ones. Every
/// request is recorded, matched or not; unmatched requests get `404`.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct ServerState {
    expectations: Vec<Expectation>,
    received: Vec<RecordedRequest>,
    unmatched: Vec<RecordedRequest>,
}

/// A request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: http::Method,
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }

    /// Header value as text, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl From<&FinalizedRequest> for RecordedRequest {
    fn from(request: &FinalizedRequest) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }
        Self {
            method: request.method.clone(),
            path: request.path().to_string(),
            query: request.query().map(str::to_string),
            headers,
            body: request.body.clone().map(Bytes::from).unwrap_or_default(),
        }
    }
}

impl MockServer {
    /// Start a new mock server on a random port
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(Mutex::new(ServerState::default()));
        let state_clone = Arc::clone(&state);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = listener.accept() => match res {
                        Ok((stream, _)) => {
                            let io = TokioIo::new(stream);
                            let state = Arc::clone(&state_clone);
                            tokio::spawn(async move {
                                let service = service_fn(move |req| handle_request(req, Arc::clone(&state)));
                                if let Err(err) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                                    .serve_connection(io, service)
                                    .await
                                {
                                    tracing::debug!(error = %err, "mock server connection closed with error");
                                }
                            });
                        }
                        Err(err) => tracing::warn!(error = %err, "mock server accept failed"),
                    },
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:54321`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Root resolver of a client pointed at this server
    pub fn client(&self) -> RouteResolver {
        self.client_with(RequestOptions::new())
    }

    /// Like [`client`](Self::client), with base options
    pub fn client_with(&self, base_options: RequestOptions) -> RouteResolver {
        create_client(self.base_url(), base_options)
    }

    /// Every request received so far, in arrival order
    pub fn received_requests(&self) -> Vec<RecordedRequest> {
        self.lock().received.clone()
    }

    /// Requests that matched no expectation
    pub fn unmatched_requests(&self) -> Vec<RecordedRequest> {
        self.lock().unmatched.clone()
    }

    /// Register an expectation
    pub fn expect(&self, matcher: RequestMatcher) -> ExpectationBuilder {
        ExpectationBuilder {
            server: Arc::clone(&self.state),
            expectation: Some(Expectation::new(matcher)),
        }
    }

    /// Assert that every expectation saw the expected number of calls
    ///
    /// # Panics
    ///
    /// Panics with one line per unmet expectation.
    pub fn verify(&self) {
        let failures: Vec<String> = self
            .lock()
            .expectations
            .iter()
            .filter_map(Expectation::unmet)
            .collect();
        assert!(failures.is_empty(), "unmet expectations:\n{}", failures.join("\n"));
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Finishes an expectation; it is registered when dropped
pub struct ExpectationBuilder {
    server: Arc<Mutex<ServerState>>,
    expectation: Option<Expectation>,
}

impl ExpectationBuilder {
    pub fn respond_with(mut self, response: MockResponse) -> Self {
        self.update(|exp| exp.response = response);
        self
    }

    pub fn times(mut self, n: usize) -> Self {
        self.update(|exp| exp.times = Times::Exactly(n));
        self
    }

    pub fn once(mut self) -> Self {
        self.update(|exp| exp.times = Times::Once);
        self
    }

    pub fn at_least_once(mut self) -> Self {
        self.update(|exp| exp.times = Times::AtLeast(1));
        self
    }

    pub fn any_times(mut self) -> Self {
        self.update(|exp| exp.times = Times::Any);
        self
    }

    pub fn never(mut self) -> Self {
        self.update(|exp| exp.times = Times::Exactly(0));
        self
    }

    fn update(&mut self, f: impl FnOnce(&mut Expectation)) {
        if let Some(exp) = self.expectation.as_mut() {
            f(exp);
        }
    }
}

impl Drop for ExpectationBuilder {
    fn drop(&mut self) {
        if let Some(exp) = self.expectation.take() {
            let mut state = self.server.lock().unwrap_or_else(PoisonError::into_inner);
            state.expectations.push(exp);
        }
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<Mutex<ServerState>>,
) -> Result<Response<Full<Bytes>>> {
    let (parts, body) = req.into_parts();
    let recorded = RecordedRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body: body.collect().await?.to_bytes(),
    };

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.received.push(recorded.clone());

    // Later expectations override earlier ones
    let matched = state
        .expectations
        .iter_mut()
        .rev()
        .find(|exp| exp.matcher.matches(&recorded));

    match matched {
        Some(exp) => {
            exp.call_count += 1;
            let mut response = Response::builder().status(exp.response.status);
            for (name, value) in &exp.response.headers {
                response = response.header(name, value);
            }
            Ok(response.body(Full::new(exp.response.body.clone()))?)
        }
        None => {
            state.unmatched.push(recorded);
            Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Full::new(Bytes::from("No expectation matched")))?)
        }
    }
}

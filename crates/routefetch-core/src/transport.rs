//! The transport boundary
//!
//! The core never talks to the network itself. It produces a
//! [`FinalizedRequest`] and hands it to a [`Transport`], which answers with a
//! [`TransportResponse`] or fails with its own error.

use crate::options::RequestOptions;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;

/// Error type produced by transports
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Executes finalized requests
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send the request and return the complete response.
    ///
    /// Any status code is a successful dispatch; only failures to obtain a
    /// response (connection errors, timeouts) are errors.
    async fn dispatch(&self, request: FinalizedRequest) -> Result<TransportResponse, BoxError>;
}

/// A request ready to hand to the transport.
///
/// Derived from a builder on every dispatch and never stored by the core.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedRequest {
    /// Path or absolute URL, with parameters substituted and query appended
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Headers in merge order; names keep the caller's spelling
    pub headers: Vec<(String, String)>,
    /// Serialized body, `None` when nothing is sent
    pub body: Option<String>,
    /// Remaining transport options (everything except method, headers and body)
    pub options: RequestOptions,
}

impl FinalizedRequest {
    /// Look up a header, ignoring ASCII case. The last matching entry wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The path portion of the URL, without the query string
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// The query string without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, q)| q)
    }
}

/// A complete response as reported by the transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TransportResponse {
    /// Create a response with an empty body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Assemble a response from its parts
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Replace the body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Replace the body with serialized JSON and set `Content-Type`
    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        self.body = Bytes::from(body.to_string());
        self
    }

    /// Whether the status is in the 200-299 range
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Get the response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase of the status, empty when unknown
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the response body as bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

//! Error types for routefetch

use crate::transport::{BoxError, TransportResponse};
use std::fmt;
use thiserror::Error;

/// Result type alias for routefetch operations
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Every way a request chain can fail.
///
/// Callers normally care about one distinction: [`ClientError::Fetch`] means the
/// server answered with a non-success status and the response is available for
/// inspection; every other variant is a programmer, encoding or network error.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A route was navigated with a key that is not a string.
    #[error("only string keys can navigate routes, got {0}")]
    InvalidAccess(String),

    /// The method selector does not name a usable HTTP method.
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),

    /// The transport completed but the status was outside 200-299.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The transport itself failed. The original error is kept as-is.
    #[error(transparent)]
    Transport(BoxError),

    /// A descriptor value could not be converted to JSON.
    #[error("failed to serialize request {field}: {message}")]
    Serialize {
        /// Descriptor field that failed (`body`, `query`, `params`, `headers`)
        field: &'static str,
        /// Serializer message
        message: String,
    },

    /// The query encoder rejected the query value.
    #[error("failed to encode query string: {0}")]
    Query(String),

    /// A success response body did not decode into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Loading configuration from the environment failed.
    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl ClientError {
    /// Wrap a transport failure without altering it
    pub fn transport(err: impl Into<BoxError>) -> Self {
        ClientError::Transport(err.into())
    }

    /// Whether this error carries an HTTP response
    pub fn is_fetch(&self) -> bool {
        matches!(self, ClientError::Fetch(_))
    }

    /// The raw response of a [`ClientError::Fetch`]
    pub fn response(&self) -> Option<&TransportResponse> {
        match self {
            ClientError::Fetch(err) => Some(err.response()),
            _ => None,
        }
    }

    /// Take back the transport's own error, if that is what failed
    pub fn into_transport_error(self) -> Option<BoxError> {
        match self {
            ClientError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// A request that reached the server and came back with a non-success status.
///
/// The full response is retained so callers can read the status, headers and
/// body (which often holds a structured error document).
#[derive(Debug, Clone)]
pub struct FetchError {
    response: TransportResponse,
}

impl FetchError {
    /// Create a fetch error for the given response
    pub fn new(response: TransportResponse) -> Self {
        Self { response }
    }

    /// The response that failed
    pub fn response(&self) -> &TransportResponse {
        &self.response
    }

    /// Consume the error, returning the response
    pub fn into_response(self) -> TransportResponse {
        self.response
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request failed with status {} {}",
            self.response.status().as_u16(),
            self.response.status_text()
        )
    }
}

impl std::error::Error for FetchError {}

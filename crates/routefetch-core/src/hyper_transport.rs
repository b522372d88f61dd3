//! Default transport on top of hyper's pooled client

use crate::transport::{BoxError, FinalizedRequest, Transport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use http::Uri;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::fmt;

/// Plain-HTTP transport backed by `hyper-util`.
///
/// Absolute URLs are sent as-is. Relative paths (the usual result of a client
/// rooted at `/`) are resolved against the configured origin.
///
/// The `timeout_ms` option, when present, bounds the whole exchange.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    origin: Option<String>,
}

impl HyperTransport {
    /// Create a transport without an origin
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            origin: None,
        }
    }

    /// Resolve relative URLs against `origin` (e.g. `http://127.0.0.1:8080`)
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    fn resolve_uri(&self, url: &str) -> Result<Uri, BoxError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.parse()?);
        }
        match &self.origin {
            Some(origin) => {
                let origin = origin.trim_end_matches('/');
                let uri = if url.starts_with('/') {
                    format!("{origin}{url}")
                } else {
                    format!("{origin}/{url}")
                };
                Ok(uri.parse()?)
            }
            None => Err(format!("cannot dispatch relative URL `{url}` without an origin").into()),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn dispatch(&self, request: FinalizedRequest) -> Result<TransportResponse, BoxError> {
        let uri = self.resolve_uri(&request.url)?;
        let mut builder = http::Request::builder().method(request.method).uri(uri);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = request.body.map(Bytes::from).unwrap_or_default();
        let http_request = builder.body(Full::new(body))?;

        let exchange = async {
            let response = self.client.request(http_request).await?;
            let (parts, body) = response.into_parts();
            let bytes = body.collect().await?.to_bytes();
            Ok::<_, BoxError>(TransportResponse::from_parts(parts.status, parts.headers, bytes))
        };

        match request.options.timeout_duration() {
            Some(limit) => tokio::time::timeout(limit, exchange).await?,
            None => exchange.await,
        }
    }
}

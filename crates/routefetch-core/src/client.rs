//! Client construction

use crate::hyper_transport::HyperTransport;
use crate::options::RequestOptions;
use crate::query::{BracketEncoder, QueryEncoder};
use crate::resolver::RouteResolver;
use crate::transport::Transport;
use std::fmt;
use std::sync::Arc;

/// State shared, read-only, by every resolver and builder of one client
pub(crate) struct ClientShared {
    pub(crate) base_options: RequestOptions,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) encoder: Arc<dyn QueryEncoder>,
}

impl fmt::Debug for ClientShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientShared")
            .field("base_options", &self.base_options)
            .finish_non_exhaustive()
    }
}

/// Create a client rooted at `base_path`.
///
/// Requests go through a [`HyperTransport`] and queries are encoded with the
/// [`BracketEncoder`]. Use [`Client::builder`] to swap either.
///
/// # Example
///
/// ```rust,ignore
/// use routefetch_core::{create_client, RequestOptions};
/// use serde_json::json;
///
/// let api = create_client("http://localhost:8080/api", RequestOptions::new());
/// let user = api.segment("users").segment(":id").get()
///     .params(json!({"id": 7}))
///     .execute()
///     .await?;
/// ```
pub fn create_client(base_path: impl Into<String>, base_options: RequestOptions) -> RouteResolver {
    Client::builder(base_path).options(base_options).build()
}

/// Entry point for configuring a client
pub struct Client;

impl Client {
    /// Start configuring a client rooted at `base_path`
    pub fn builder(base_path: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            base_path: base_path.into(),
            options: RequestOptions::new(),
            transport: None,
            encoder: None,
        }
    }
}

/// Configures the shared parts of a client
pub struct ClientBuilder {
    base_path: String,
    options: RequestOptions,
    transport: Option<Arc<dyn Transport>>,
    encoder: Option<Arc<dyn QueryEncoder>>,
}

impl ClientBuilder {
    /// Options every request starts from
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom transport
    pub fn transport(self, transport: impl Transport) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Use a transport that is already shared with other clients
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom query encoder
    pub fn encoder(mut self, encoder: impl QueryEncoder) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Build the root resolver
    pub fn build(self) -> RouteResolver {
        let shared = ClientShared {
            base_options: self.options,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HyperTransport::new())),
            encoder: self.encoder.unwrap_or_else(|| Arc::new(BracketEncoder)),
        };
        RouteResolver::root(Arc::new(shared), self.base_path)
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_path", &self.base_path)
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .field("custom_encoder", &self.encoder.is_some())
            .finish()
    }
}

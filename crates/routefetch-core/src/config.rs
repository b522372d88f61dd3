//! Client configuration from the environment.
//!
//! Every field is read from a `ROUTEFETCH_`-prefixed variable:
//!
//! | Variable                 | Field        | Default |
//! |--------------------------|--------------|---------|
//! | `ROUTEFETCH_BASE_URL`    | `base_url`   | `/`     |
//! | `ROUTEFETCH_USER_AGENT`  | `user_agent` | none    |
//! | `ROUTEFETCH_TIMEOUT_MS`  | `timeout_ms` | none    |
//! | `ROUTEFETCH_ORIGIN`      | `origin`     | none    |
//!
//! ```ignore
//! use routefetch_core::config::{load_dotenv, ClientConfig};
//!
//! load_dotenv();
//! let api = ClientConfig::from_env()?.into_client();
//! ```

use crate::client::Client;
use crate::hyper_transport::HyperTransport;
use crate::options::RequestOptions;
use crate::resolver::RouteResolver;
use serde::Deserialize;
use std::time::Duration;

/// Prefix shared by all configuration variables
pub const ENV_PREFIX: &str = "ROUTEFETCH_";

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was present but could not be parsed
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),
}

/// Settings for a client built from the environment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Root path or URL of the API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `User-Agent` on every request
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Origin for relative base URLs, e.g. `http://127.0.0.1:8080`
    #[serde(default)]
    pub origin: Option<String>,
}

fn default_base_url() -> String {
    "/".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
            timeout_ms: None,
            origin: None,
        }
    }
}

impl ClientConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    /// Read the configuration from explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    /// Options every request of the configured client starts from
    pub fn base_options(&self) -> RequestOptions {
        let mut options = RequestOptions::new();
        if let Some(agent) = &self.user_agent {
            options = options.header("User-Agent", agent.as_str());
        }
        if let Some(ms) = self.timeout_ms {
            options = options.timeout(Duration::from_millis(ms));
        }
        options
    }

    /// Build a root resolver using the default hyper transport
    pub fn into_client(self) -> RouteResolver {
        let mut transport = HyperTransport::new();
        if let Some(origin) = &self.origin {
            transport = transport.with_origin(origin.as_str());
        }

        Client::builder(self.base_url.as_str())
            .options(self.base_options())
            .transport(transport)
            .build()
    }
}

/// Load variables from a `.env` file in the working directory, if any.
///
/// A missing file is not an error.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load variables from a specific `.env` file, if it exists
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) {
    let _ = dotenvy::from_path(path);
}

//! # routefetch Core
//!
//! Route resolution, the immutable request builder, option merging and the
//! transport boundary behind `routefetch`.
//!
//! This crate is not meant to be used directly. Use `routefetch` instead.
//!
//! A client is a tree of lazily created [`RouteResolver`] nodes. Each node
//! accumulates a path; selecting a method yields a [`RequestBuilder`], whose
//! mutators return new builders. Nothing is sent until `execute` (or `send`)
//! is awaited.

mod tracing_macros;

mod builder;
mod client;
#[cfg(feature = "config")]
pub mod config;
mod error;
mod hyper_transport;
mod options;
mod path_params;
mod query;
mod resolver;
mod schema;
mod transport;

// Public API
pub use builder::{carries_body, RequestBuilder, RequestDescriptor};
pub use client::{create_client, Client, ClientBuilder};
pub use error::{ClientError, FetchError, Result};
pub use hyper_transport::HyperTransport;
pub use options::{deep_merge, RequestOptions, BODY, HEADERS, METHOD, TIMEOUT_MS};
pub use path_params::{stringify, PathParams};
pub use query::{BracketEncoder, FormEncoder, QueryEncoder};
pub use resolver::{join, Access, RouteKey, RouteResolver, METHOD_SIGIL, UNSAFE_KEY};
pub use schema::{Endpoint, Schema, Unchecked};
pub use transport::{BoxError, FinalizedRequest, Transport, TransportResponse};

pub use http::{Method, StatusCode};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}

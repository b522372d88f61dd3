//! # routefetch
//!
//! A typed HTTP client where request paths are built by navigation.
//!
//! Each access on a [`RouteResolver`] descends one path segment; selecting a
//! method yields an immutable [`RequestBuilder`]. Builders are values: every
//! mutator returns a new builder, so a partially configured request can be
//! reused as a template.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use routefetch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> routefetch::Result<()> {
//!     let api = create_client("http://127.0.0.1:8080/api", RequestOptions::new());
//!
//!     // GET /api/users/7/?expand=posts
//!     let user = api
//!         .segment("users")
//!         .segment(":id")
//!         .get()
//!         .params(json!({"id": 7}))
//!         .query(json!({"expand": "posts"}))
//!         .execute()
//!         .await?;
//!
//!     // The same path through named access
//!     let same = api.resolve("users")?.into_route()?.resolve("$get")?.into_handler()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Typed endpoints
//!
//! ```rust,ignore
//! use routefetch::prelude::*;
//!
//! #[derive(Serialize)]
//! struct NewUser { name: String }
//!
//! #[derive(Deserialize)]
//! struct User { id: u64, name: String }
//!
//! endpoint! {
//!     pub CreateUser: POST {
//!         body = NewUser;
//!         response = User;
//!     }
//! }
//!
//! let user: User = api
//!     .segment("users")
//!     .endpoint::<CreateUser>()
//!     .body(NewUser { name: "Alice".into() })
//!     .execute()
//!     .await?;
//! ```
//!
//! ## Optional Features
//!
//! - `tracing` - debug events for every request, warnings for failed ones
//! - `config` - [`config::ClientConfig`] loaded from `ROUTEFETCH_*` variables
//! - `full` - all of the above
//!
//! ```toml
//! [dependencies]
//! routefetch = { version = "0.1", features = ["full"] }
//! ```

// Re-export core functionality
pub use routefetch_core::*;

/// Prelude module - import everything you need with `use routefetch::prelude::*`
pub mod prelude {
    pub use routefetch_core::{
        create_client,
        endpoint,
        // Navigation
        Access,
        Client,
        // Errors
        ClientError,
        Endpoint,
        FetchError,
        // Transport
        FinalizedRequest,
        HyperTransport,
        Method,
        QueryEncoder,
        RequestBuilder,
        RequestOptions,
        Result,
        RouteResolver,
        Schema,
        StatusCode,
        Transport,
        TransportResponse,
    };

    #[cfg(feature = "config")]
    pub use routefetch_core::config::{load_dotenv, ClientConfig};

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
}

//! Endpoint schemas
//!
//! A schema fixes, at compile time, what a request to one endpoint may carry
//! and what a success response decodes into. It has no runtime behaviour:
//! every value is converted to neutral JSON as soon as it enters a builder.
//!
//! ```rust,ignore
//! use routefetch_core::{endpoint, create_client, RequestOptions};
//!
//! endpoint! {
//!     /// `GET /users/:id`
//!     pub GetUser: GET {
//!         params = UserId;
//!         response = User;
//!     }
//! }
//!
//! let user = create_client("http://localhost:8080", RequestOptions::new())
//!     .segment("users")
//!     .segment(":id")
//!     .endpoint::<GetUser>()
//!     .params(UserId { id: 7 })
//!     .execute()
//!     .await?;
//! ```

use http::Method;
use serde::{de::DeserializeOwned, Serialize};

/// Payload shapes of a request
pub trait Schema: Send + Sync + 'static {
    /// Request body
    type Body: Serialize;
    /// Query string mapping
    type Query: Serialize;
    /// Path parameters
    type Params: Serialize;
    /// Extra request headers
    type Headers: Serialize;
    /// Decoded success response
    type Response: DeserializeOwned;
}

/// A schema bound to one HTTP method
pub trait Endpoint: Schema {
    /// Method used when the endpoint is selected
    const METHOD: Method;
}

/// Schema that accepts any JSON for every field.
///
/// Used for builders obtained by name lookup or explicit method selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchecked;

impl Schema for Unchecked {
    type Body = serde_json::Value;
    type Query = serde_json::Value;
    type Params = serde_json::Value;
    type Headers = serde_json::Value;
    type Response = serde_json::Value;
}

/// Declare an [`Endpoint`] type.
///
/// Every field is optional and defaults to `serde_json::Value`. Fields must
/// appear in the order `body`, `query`, `params`, `headers`, `response`.
#[macro_export]
macro_rules! endpoint {
    (@field) => { $crate::__private::Value };
    (@field $ty:ty) => { $ty };
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident : $method:ident {
            $(body = $body:ty;)?
            $(query = $query:ty;)?
            $(params = $params:ty;)?
            $(headers = $headers:ty;)?
            $(response = $response:ty;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::Schema for $name {
            type Body = $crate::endpoint!(@field $($body)?);
            type Query = $crate::endpoint!(@field $($query)?);
            type Params = $crate::endpoint!(@field $($params)?);
            type Headers = $crate::endpoint!(@field $($headers)?);
            type Response = $crate::endpoint!(@field $($response)?);
        }

        impl $crate::Endpoint for $name {
            const METHOD: $crate::Method = $crate::Method::$method;
        }
    };
}

//! Path-accumulating route resolver
//!
//! A [`RouteResolver`] is a lazy node in an unbounded route tree. Every name is
//! a valid child; names starting with `$` select an HTTP method instead.
//!
//! ```rust,ignore
//! let api = create_client("/", RequestOptions::new());
//!
//! // Named access, as it would be written against a dynamic route table
//! let list = api.resolve("users")?.into_route()?.resolve("$get")?.into_handler()?;
//!
//! // The same request through explicit methods
//! let list = api.segment("users").get();
//! ```

use crate::builder::RequestBuilder;
use crate::client::ClientShared;
use crate::error::{ClientError, Result};
use crate::schema::{Endpoint, Schema};
use http::Method;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Prefix that turns a name into a method selector
pub const METHOD_SIGIL: char = '$';

/// Reserved name that yields the unchecked resolver
pub const UNSAFE_KEY: &str = "$unsafe";

/// A name used to navigate a resolver.
///
/// Only text names are valid. Keys built from anything else are kept so the
/// failure surfaces as [`ClientError::InvalidAccess`] at the access site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKey {
    /// A text name
    Name(String),
    /// A non-text key, described for the error message
    Other(String),
}

impl From<&str> for RouteKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for RouteKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for RouteKey {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<Cow<'_, str>> for RouteKey {
    fn from(name: Cow<'_, str>) -> Self {
        Self::Name(name.into_owned())
    }
}

impl From<&[u8]> for RouteKey {
    fn from(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(name) => Self::Name(name.to_string()),
            Err(_) => Self::Other(format!("{} non-UTF-8 bytes", bytes.len())),
        }
    }
}

impl From<serde_json::Value> for RouteKey {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(name) => Self::Name(name),
            other => Self::Other(other.to_string()),
        }
    }
}

/// Outcome of a named access
#[derive(Debug, Clone)]
pub enum Access {
    /// A nested resolver
    Route(RouteResolver),
    /// A request builder for the selected method
    Handler(RequestBuilder),
}

impl Access {
    /// The nested resolver, or `InvalidAccess` if a method was selected
    pub fn into_route(self) -> Result<RouteResolver> {
        match self {
            Self::Route(route) => Ok(route),
            Self::Handler(builder) => Err(ClientError::InvalidAccess(format!(
                "`{}` selects a method, not a route",
                builder.method()
            ))),
        }
    }

    /// The request builder, or `InvalidAccess` if a route was selected
    pub fn into_handler(self) -> Result<RequestBuilder> {
        match self {
            Self::Handler(builder) => Ok(builder),
            Self::Route(route) => Err(ClientError::InvalidAccess(format!(
                "`{}` is a route, not a method",
                route.path()
            ))),
        }
    }
}

/// A node in the route tree
#[derive(Clone)]
pub struct RouteResolver {
    shared: Arc<ClientShared>,
    path: String,
    unchecked: bool,
}

impl RouteResolver {
    pub(crate) fn root(shared: Arc<ClientShared>, base_path: String) -> Self {
        Self {
            shared,
            path: base_path,
            unchecked: false,
        }
    }

    /// The accumulated path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this node descends from `$unsafe`
    pub fn is_unchecked(&self) -> bool {
        self.unchecked
    }

    /// Named access.
    ///
    /// `$unsafe` yields the unchecked resolver at the same path, `$name`
    /// selects the method `NAME`, and any other name descends one segment.
    pub fn resolve(&self, key: impl Into<RouteKey>) -> Result<Access> {
        let name = match key.into() {
            RouteKey::Name(name) => name,
            RouteKey::Other(desc) => {
                return Err(ClientError::InvalidAccess(format!(
                    "route keys must be strings, got {desc}"
                )))
            }
        };

        if name == UNSAFE_KEY {
            return Ok(Access::Route(self.unchecked()));
        }

        match name.strip_prefix(METHOD_SIGIL) {
            Some(selector) => {
                let method = self.select_method(selector)?;
                Ok(Access::Handler(self.method(method)))
            }
            None => Ok(Access::Route(self.segment(&name))),
        }
    }

    fn select_method(&self, selector: &str) -> Result<Method> {
        let upper = selector.to_ascii_uppercase();
        Method::from_bytes(upper.as_bytes()).map_err(|_| ClientError::InvalidMethod(upper))
    }

    /// Descend one segment. The name is never read as a method.
    pub fn segment(&self, name: &str) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            path: join(&self.path, name),
            unchecked: self.unchecked,
        }
    }

    /// The unchecked variant rooted at the same path
    pub fn unchecked(&self) -> Self {
        Self {
            unchecked: true,
            ..self.clone()
        }
    }

    /// Select a method at the current path
    pub fn method(&self, method: Method) -> RequestBuilder {
        self.typed(method)
    }

    /// Select a method and type the builder with schema `S`
    pub fn typed<S: Schema>(&self, method: Method) -> RequestBuilder<S> {
        RequestBuilder::new(Arc::clone(&self.shared), self.path.clone(), method)
    }

    /// Select the method declared by endpoint `E`
    pub fn endpoint<E: Endpoint>(&self) -> RequestBuilder<E> {
        self.typed(E::METHOD)
    }

    /// `GET` at the current path
    pub fn get(&self) -> RequestBuilder {
        self.method(Method::GET)
    }

    /// `POST` at the current path
    pub fn post(&self) -> RequestBuilder {
        self.method(Method::POST)
    }

    /// `PUT` at the current path
    pub fn put(&self) -> RequestBuilder {
        self.method(Method::PUT)
    }

    /// `PATCH` at the current path
    pub fn patch(&self) -> RequestBuilder {
        self.method(Method::PATCH)
    }

    /// `DELETE` at the current path
    pub fn delete(&self) -> RequestBuilder {
        self.method(Method::DELETE)
    }

    /// `HEAD` at the current path
    pub fn head(&self) -> RequestBuilder {
        self.method(Method::HEAD)
    }

    /// `OPTIONS` at the current path
    pub fn options(&self) -> RequestBuilder {
        self.method(Method::OPTIONS)
    }
}

impl fmt::Debug for RouteResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteResolver")
            .field("path", &self.path)
            .field("unchecked", &self.unchecked)
            .finish_non_exhaustive()
    }
}

/// Join two path pieces with exactly one `/`.
///
/// One trailing `/` is stripped from `left` and one leading `/` from `right`.
///
/// ```
/// use routefetch_core::join;
///
/// assert_eq!(join("/", "users"), "/users");
/// assert_eq!(join("/api/", "/v1"), "/api/v1");
/// assert_eq!(join("http://localhost/api", "users"), "http://localhost/api/users");
/// ```
pub fn join(left: &str, right: &str) -> String {
    let left = left.strip_suffix('/').unwrap_or(left);
    let right = right.strip_prefix('/').unwrap_or(right);
    let mut joined = String::with_capacity(left.len() + right.len() + 1);
    joined.push_str(left);
    joined.push('/');
    joined.push_str(right);
    joined
}

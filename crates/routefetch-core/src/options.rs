//! Transport options and their deep merge
//!
//! Options are kept as an order-preserving JSON object so that arbitrary
//! transport settings can ride along with the well-known keys (`method`,
//! `headers`, `body`, `timeout_ms`) and be combined field by field.

use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Key for the HTTP method
pub const METHOD: &str = "method";
/// Key for the header object
pub const HEADERS: &str = "headers";
/// Key for the serialized body
pub const BODY: &str = "body";
/// Key for a transport-side timeout in milliseconds
pub const TIMEOUT_MS: &str = "timeout_ms";

/// Request options passed down to the transport.
///
/// Combined with [`RequestOptions::merged`]: the right-hand side wins at every
/// leaf, nested objects are merged key by key, and arrays or scalars replace
/// whatever they land on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestOptions(Map<String, Value>);

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a JSON value. Anything but an object yields empty options.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Set a top-level option
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a single header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let headers = self
            .0
            .entry(HEADERS)
            .or_insert_with(|| Value::Object(Map::new()));
        if !headers.is_object() {
            *headers = Value::Object(Map::new());
        }
        if let Value::Object(map) = headers {
            map.insert(name.into(), Value::String(value.into()));
        }
        self
    }

    /// Set a transport-side timeout
    pub fn timeout(self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.with(TIMEOUT_MS, millis)
    }

    /// Read a top-level option
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a top-level option as a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Read the transport-side timeout, if any
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.0
            .get(TIMEOUT_MS)
            .and_then(Value::as_u64)
            .map(Duration::from_millis)
    }

    /// Remove and return a top-level option
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Check if no options are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Return a new set of options with `other` merged over `self`.
    ///
    /// Header names compare without ASCII case: a header in `other` replaces
    /// any header in `self` spelled differently.
    pub fn merged(&self, other: &RequestOptions) -> RequestOptions {
        let mut target = self.0.clone();
        if let (Some(Value::Object(target_headers)), Some(Value::Object(source_headers))) =
            (target.get_mut(HEADERS), other.0.get(HEADERS))
        {
            for name in source_headers.keys() {
                remove_header(target_headers, name);
            }
        }
        deep_merge(&mut target, &other.0);
        RequestOptions(target)
    }
}

/// Drop headers spelled differently from `name` but equal ignoring ASCII case
pub(crate) fn remove_header(headers: &mut Map<String, Value>, name: &str) {
    headers.retain(|existing, _| existing == name || !existing.eq_ignore_ascii_case(name));
}

impl From<Map<String, Value>> for RequestOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<RequestOptions> for Value {
    fn from(options: RequestOptions) -> Self {
        Value::Object(options.0)
    }
}

/// Merge `source` into `target`, right-most wins.
///
/// Two objects at the same key merge recursively. In every other case the
/// source value replaces the target value, so arrays are never merged by index.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, source_value) in source {
        match (target.get_mut(key), source_value) {
            (Some(Value::Object(target_map)), Value::Object(source_map)) => {
                deep_merge(target_map, source_map);
            }
            _ => {
                target.insert(key.clone(), source_value.clone());
            }
        }
    }
}

use crate::server::RecordedRequest;
use http::Method;
use serde_json::Value;

/// Matcher for recorded requests. All criteria must hold.
#[derive(Debug, Clone, Default)]
pub struct RequestMatcher {
    pub(crate) method: Option<Method>,
    pub(crate) path: Option<String>,
    pub(crate) query: Option<Option<String>>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) absent_headers: Vec<String>,
    pub(crate) body_json: Option<Value>,
    pub(crate) body_string: Option<String>,
    pub(crate) empty_body: bool,
}

impl RequestMatcher {
    /// Create a matcher that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a specific HTTP method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Match the path exactly, without the query string
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Match the raw query string exactly, as sent on the wire
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(Some(query.into()));
        self
    }

    /// Match requests without a query string
    pub fn no_query(mut self) -> Self {
        self.query = Some(None);
        self
    }

    /// Match a header value. Names are case-insensitive, values are not.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Match requests that do not carry `name`
    pub fn header_absent(mut self, name: impl Into<String>) -> Self {
        self.absent_headers.push(name.into());
        self
    }

    /// Match a JSON body by value, ignoring whitespace and key order.
    ///
    /// # Panics
    ///
    /// Panics if `body` cannot be serialized.
    pub fn body_json(mut self, body: impl serde::Serialize) -> Self {
        self.body_json = match serde_json::to_value(body) {
            Ok(value) => Some(value),
            Err(err) => panic!("body matcher is not serializable: {err}"),
        };
        self
    }

    /// Match the body text exactly
    pub fn body_string(mut self, body: impl Into<String>) -> Self {
        self.body_string = Some(body.into());
        self
    }

    /// Match requests that send no body
    pub fn no_body(mut self) -> Self {
        self.empty_body = true;
        self
    }

    /// Check a request against every criterion
    pub fn matches(&self, request: &RecordedRequest) -> bool {
        if self.method.as_ref().is_some_and(|m| *m != request.method) {
            return false;
        }

        if self.path.as_ref().is_some_and(|p| p != &request.path) {
            return false;
        }

        if let Some(expected) = &self.query {
            if expected.as_deref() != request.query.as_deref() {
                return false;
            }
        }

        for (name, value) in &self.headers {
            match request.headers.get(name.as_str()) {
                Some(actual) if actual == value.as_str() => {}
                _ => return false,
            }
        }

        if self
            .absent_headers
            .iter()
            .any(|name| request.headers.contains_key(name.as_str()))
        {
            return false;
        }

        if let Some(expected) = &self.body_json {
            match serde_json::from_slice::<Value>(&request.body) {
                Ok(actual) if &actual == expected => {}
                _ => return false,
            }
        }

        if let Some(expected) = &self.body_string {
            if std::str::from_utf8(&request.body).ok() != Some(expected.as_str()) {
                return false;
            }
        }

        !(self.empty_body && !request.body.is_empty())
    }
}

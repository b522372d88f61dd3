use super::matcher::RequestMatcher;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use routefetch_core::TransportResponse;

/// A request the mock server should receive, and how to answer it
#[derive(Debug, Clone)]
pub struct Expectation {
    pub(crate) matcher: RequestMatcher,
    pub(crate) response: MockResponse,
    pub(crate) times: Times,
    pub(crate) call_count: usize,
}

impl Expectation {
    /// Create an expectation answered with an empty `200 OK`
    pub fn new(matcher: RequestMatcher) -> Self {
        Self {
            matcher,
            response: MockResponse::default(),
            times: Times::Once,
            call_count: 0,
        }
    }

    /// Set the response
    pub fn respond_with(mut self, response: MockResponse) -> Self {
        self.response = response;
        self
    }

    /// Set how many calls are expected
    pub fn times(mut self, times: Times) -> Self {
        self.times = times;
        self
    }

    /// Number of requests matched so far
    pub fn call_count(&self) -> usize {
        self.call_count
    }

    /// Describe a call-count mismatch, if any
    pub(crate) fn unmet(&self) -> Option<String> {
        let n = self.call_count;
        let ok = match self.times {
            Times::Once => n == 1,
            Times::Exactly(expected) => n == expected,
            Times::AtLeast(min) => n >= min,
            Times::AtMost(max) => n <= max,
            Times::Any => true,
        };
        (!ok).then(|| format!("{:?} expected {:?} calls, got {}", self.matcher, self.times, n))
    }
}

/// How many times an expectation should be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    Once,
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    Any,
}

/// A canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl MockResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header.
    ///
    /// # Panics
    ///
    /// Panics if the name or value is not valid in an HTTP header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes())
            .unwrap_or_else(|_| panic!("invalid header name `{name}`"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|_| panic!("invalid header value `{value}`"));
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `body` as JSON and set `Content-Type`.
    ///
    /// # Panics
    ///
    /// Panics if `body` cannot be serialized.
    pub fn json(mut self, body: impl serde::Serialize) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = match serde_json::to_vec(&body) {
            Ok(bytes) => bytes.into(),
            Err(err) => panic!("mock response body is not serializable: {err}"),
        };
        self
    }

    /// The same response in the shape a transport returns
    pub fn to_transport_response(&self) -> TransportResponse {
        TransportResponse::from_parts(self.status, self.headers.clone(), self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_are_checked() {
        let mut exp = Expectation::new(RequestMatcher::new()).times(Times::AtLeast(2));
        exp.call_count = 1;
        assert!(exp.unmet().is_some());
        exp.call_count = 3;
        assert!(exp.unmet().is_none());

        let never = Expectation::new(RequestMatcher::new()).times(Times::Exactly(0));
        assert!(never.unmet().is_none());
    }

    #[test]
    fn test_json_response_converts() {
        let resp = MockResponse::new()
            .status(StatusCode::CREATED)
            .json(serde_json::json!({"id": 1}))
            .to_transport_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(resp.text(), r#"{"id":1}"#);
    }
}

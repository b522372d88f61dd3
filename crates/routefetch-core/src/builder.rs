//! Immutable request builder
//!
//! A [`RequestBuilder`] is a value: every mutator returns a new builder and
//! leaves the receiver untouched, so one builder can serve as the template for
//! any number of independent requests.

use crate::client::ClientShared;
use crate::error::{ClientError, FetchError, Result};
use crate::options::{self, RequestOptions};
use crate::path_params::PathParams;
use crate::schema::{Schema, Unchecked};
use crate::transport::{FinalizedRequest, TransportResponse};
use crate::tracing_macros::{trace_debug, trace_warn};
use http::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The request fields accumulated by a builder.
///
/// Each field is shared behind an `Arc`, so copying a descriptor to replace one
/// field never copies the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDescriptor {
    body: Option<Arc<Value>>,
    query: Option<Arc<Value>>,
    params: Option<Arc<Value>>,
    headers: Option<Arc<Value>>,
}

impl RequestDescriptor {
    /// Create an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Request body, if set
    pub fn body(&self) -> Option<&Value> {
        self.body.as_deref()
    }

    /// Query mapping, if set
    pub fn query(&self) -> Option<&Value> {
        self.query.as_deref()
    }

    /// Path parameters, if set
    pub fn params(&self) -> Option<&Value> {
        self.params.as_deref()
    }

    /// Extra headers, if set
    pub fn headers(&self) -> Option<&Value> {
        self.headers.as_deref()
    }

    /// Copy with the body replaced
    pub fn with_body(&self, body: Value) -> Self {
        Self {
            body: Some(Arc::new(body)),
            ..self.clone()
        }
    }

    /// Copy with the query replaced
    pub fn with_query(&self, query: Value) -> Self {
        Self {
            query: Some(Arc::new(query)),
            ..self.clone()
        }
    }

    /// Copy with the params replaced
    pub fn with_params(&self, params: Value) -> Self {
        Self {
            params: Some(Arc::new(params)),
            ..self.clone()
        }
    }

    /// Copy with the headers replaced
    pub fn with_headers(&self, headers: Value) -> Self {
        Self {
            headers: Some(Arc::new(headers)),
            ..self.clone()
        }
    }
}

/// Builds and executes one request.
///
/// `S` is the endpoint schema that types the mutators and the decoded
/// response; [`Unchecked`] accepts any JSON.
pub struct RequestBuilder<S: Schema = Unchecked> {
    shared: Arc<ClientShared>,
    path: String,
    method: Method,
    descriptor: RequestDescriptor,
    // First serialization failure, reported when the request is finalized
    pending_error: Option<(&'static str, String)>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> RequestBuilder<S> {
    pub(crate) fn new(shared: Arc<ClientShared>, path: String, method: Method) -> Self {
        Self {
            shared,
            path,
            method,
            descriptor: RequestDescriptor::new(),
            pending_error: None,
            _schema: PhantomData,
        }
    }

    /// The resolved path, before finalization
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The selected HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The accumulated descriptor
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// The options every request of this client starts from
    pub fn base_options(&self) -> &RequestOptions {
        &self.shared.base_options
    }

    /// Set the request body
    pub fn body(&self, body: S::Body) -> Self {
        self.set("body", serde_json::to_value(body), RequestDescriptor::with_body)
    }

    /// Set the query mapping
    pub fn query(&self, query: S::Query) -> Self {
        self.set("query", serde_json::to_value(query), RequestDescriptor::with_query)
    }

    /// Set the path parameters
    pub fn params(&self, params: S::Params) -> Self {
        self.set("params", serde_json::to_value(params), RequestDescriptor::with_params)
    }

    /// Set the extra headers
    pub fn headers(&self, headers: S::Headers) -> Self {
        self.set("headers", serde_json::to_value(headers), RequestDescriptor::with_headers)
    }

    /// Set the body from raw JSON, bypassing the schema
    pub fn body_value(&self, body: Value) -> Self {
        self.set("body", Ok(body), RequestDescriptor::with_body)
    }

    /// Set the query from raw JSON, bypassing the schema
    pub fn query_value(&self, query: Value) -> Self {
        self.set("query", Ok(query), RequestDescriptor::with_query)
    }

    /// Set the params from raw JSON, bypassing the schema
    pub fn params_value(&self, params: Value) -> Self {
        self.set("params", Ok(params), RequestDescriptor::with_params)
    }

    /// Set the headers from raw JSON, bypassing the schema
    pub fn headers_value(&self, headers: Value) -> Self {
        self.set("headers", Ok(headers), RequestDescriptor::with_headers)
    }

    fn set(
        &self,
        field: &'static str,
        value: std::result::Result<Value, serde_json::Error>,
        replace: fn(&RequestDescriptor, Value) -> RequestDescriptor,
    ) -> Self {
        let mut next = self.clone();
        match value {
            Ok(value) => next.descriptor = replace(&self.descriptor, value),
            Err(err) => {
                if next.pending_error.is_none() {
                    next.pending_error = Some((field, err.to_string()));
                }
            }
        }
        next
    }

    /// Whether this builder's method sends a body
    pub fn carries_body(&self) -> bool {
        carries_body(&self.method)
    }

    /// Resolve the request without sending it
    pub fn finalize(&self) -> Result<FinalizedRequest> {
        self.finalize_with(&RequestOptions::new())
    }

    /// Resolve the request with per-call options merged last
    pub fn finalize_with(&self, extra: &RequestOptions) -> Result<FinalizedRequest> {
        if let Some((field, message)) = &self.pending_error {
            return Err(ClientError::Serialize {
                field: *field,
                message: message.clone(),
            });
        }

        let mut url = self.path.clone();
        if !url.ends_with('/') {
            url.push('/');
        }

        if let Some(params) = self.descriptor.params() {
            url = PathParams::from_value(params).substitute(&url);
        }

        if let Some(query) = self.descriptor.query() {
            let encoded = self.shared.encoder.encode(query)?;
            if !encoded.is_empty() {
                url.push('?');
                url.push_str(&encoded);
            }
        }

        let mut headers = Map::new();
        if self.carries_body() {
            headers.insert(
                "Content-Type".to_string(),
                Value::String("application/json".to_string()),
            );
        }
        if let Some(Value::Object(extra_headers)) = self.descriptor.headers() {
            for (name, value) in extra_headers {
                options::remove_header(&mut headers, name);
                headers.insert(name.clone(), value.clone());
            }
        }

        let body = match self.descriptor.body() {
            Some(body) if self.carries_body() => Value::String(body.to_string()),
            _ => Value::Null,
        };

        let derived = RequestOptions::new()
            .with(options::METHOD, self.method.as_str())
            .with(options::HEADERS, headers)
            .with(options::BODY, body);

        let merged = self.shared.base_options.merged(&derived).merged(extra);
        let request = into_finalized(url, merged)?;

        trace_debug!(
            method = %request.method,
            url = %request.url,
            headers = request.headers.len(),
            has_body = request.body.is_some(),
            "finalized request"
        );

        Ok(request)
    }

    /// Finalize, dispatch and return the raw response.
    ///
    /// Fails with [`ClientError::Fetch`] when the status is not a success.
    pub async fn send(&self) -> Result<TransportResponse> {
        self.send_with(RequestOptions::new()).await
    }

    /// [`send`](Self::send) with per-call options
    pub async fn send_with(&self, extra: RequestOptions) -> Result<TransportResponse> {
        let request = self.finalize_with(&extra)?;
        #[cfg(feature = "tracing")]
        let (method, url) = (request.method.clone(), request.url.clone());

        let response = self
            .shared
            .transport
            .dispatch(request)
            .await
            .map_err(ClientError::Transport)?;

        if !response.ok() {
            trace_warn!(
                method = %method,
                url = %url,
                status = response.status().as_u16(),
                "request failed"
            );
            return Err(FetchError::new(response).into());
        }

        trace_debug!(
            method = %method,
            url = %url,
            status = response.status().as_u16(),
            "request completed"
        );

        Ok(response)
    }

    /// Finalize, dispatch and decode the JSON response
    pub async fn execute(&self) -> Result<S::Response> {
        self.execute_with(RequestOptions::new()).await
    }

    /// [`execute`](Self::execute) with per-call options merged over everything else
    pub async fn execute_with(&self, extra: RequestOptions) -> Result<S::Response> {
        let response = self.send_with(extra).await?;
        response.json().map_err(ClientError::Decode)
    }
}

impl<S: Schema> Clone for RequestBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            path: self.path.clone(),
            method: self.method.clone(),
            descriptor: self.descriptor.clone(),
            pending_error: self.pending_error.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: Schema> fmt::Debug for RequestBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// `GET` and `HEAD` never send a body or a default `Content-Type`
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

fn into_finalized(url: String, mut merged: RequestOptions) -> Result<FinalizedRequest> {
    let method = match merged.remove(options::METHOD) {
        Some(Value::String(name)) => {
            Method::from_bytes(name.as_bytes()).map_err(|_| ClientError::InvalidMethod(name))?
        }
        Some(other) => return Err(ClientError::InvalidMethod(other.to_string())),
        None => Method::GET,
    };

    let headers = match merged.remove(options::HEADERS) {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| header_text(value).map(|text| (name, text)))
            .collect(),
        _ => Vec::new(),
    };

    let body = match merged.remove(options::BODY) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    };

    Ok(FinalizedRequest {
        url,
        method,
        headers,
        body,
        options: merged,
    })
}

// `null` drops a header, which lets per-call options remove a default
fn header_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::transport::{BoxError, Transport};
    use async_trait::async_trait;
    use http::StatusCode;
    use proptest::prelude::*;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    struct Fixed(StatusCode, &'static str);

    #[async_trait]
    impl Transport for Fixed {
        async fn dispatch(
            &self,
            _request: FinalizedRequest,
        ) -> std::result::Result<TransportResponse, BoxError> {
            Ok(TransportResponse::new(self.0).with_body(self.1))
        }
    }

    fn builder(method: Method) -> RequestBuilder {
        Client::builder("/")
            .transport(Fixed(StatusCode::OK, "{}"))
            .build()
            .method(method)
    }

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_with_query() {
        let req = builder(Method::GET)
            .query(json!({"aaa": "123"}))
            .finalize()
            .unwrap();
        assert_eq!(req.url, "/?aaa=123");
        assert_eq!(req.method, Method::GET);
        assert!(req.headers.is_empty());
        assert_eq!(req.body, None);
    }

    #[test]
    fn test_post_with_query_body_and_headers() {
        let req = builder(Method::POST)
            .query(json!({"aaa": "123"}))
            .body(json!({"ping": 111}))
            .headers(json!({"X-ZZS": "zzs"}))
            .finalize()
            .unwrap();
        assert_eq!(req.url, "/?aaa=123");
        assert_eq!(req.method, Method::POST);
        assert_eq!(
            req.headers,
            headers(&[("Content-Type", "application/json"), ("X-ZZS", "zzs")])
        );
        assert_eq!(req.body.as_deref(), Some(r#"{"ping":111}"#));
    }

    #[test]
    fn test_get_ignores_body() {
        let req = builder(Method::GET).body(json!({"x": 1})).finalize().unwrap();
        assert_eq!(req.body, None);
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn test_absent_body_sends_nothing() {
        let req = builder(Method::DELETE).finalize().unwrap();
        assert_eq!(req.body, None);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_descriptor_headers_override_default() {
        let req = builder(Method::PUT)
            .headers(json!({"Content-Type": "text/plain"}))
            .finalize()
            .unwrap();
        assert_eq!(req.headers, headers(&[("Content-Type", "text/plain")]));
    }

    #[test]
    fn test_lowercase_descriptor_header_replaces_default() {
        let req = builder(Method::POST)
            .headers(json!({"content-type": "text/plain"}))
            .finalize()
            .unwrap();
        assert_eq!(req.headers, headers(&[("content-type", "text/plain")]));
    }

    #[test]
    fn test_lowercase_extra_header_replaces_default() {
        let extra = RequestOptions::new().header("content-type", "text/csv");
        let req = builder(Method::PUT).finalize_with(&extra).unwrap();
        assert_eq!(req.headers, headers(&[("content-type", "text/csv")]));

        let drop = RequestOptions::new().with("headers", json!({"CONTENT-TYPE": null}));
        let req = builder(Method::PUT).finalize_with(&drop).unwrap();
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_base_header_spelling_never_duplicates() {
        let client = Client::builder("/")
            .options(RequestOptions::new().header("content-type", "text/plain"))
            .transport(Fixed(StatusCode::OK, "{}"))
            .build();

        let post = client.post().finalize().unwrap();
        assert_eq!(post.headers, headers(&[("Content-Type", "application/json")]));

        let get = client.get().finalize().unwrap();
        assert_eq!(get.headers, headers(&[("content-type", "text/plain")]));

        let overridden = client
            .post()
            .headers(json!({"CONTENT-TYPE": "text/xml"}))
            .finalize()
            .unwrap();
        assert_eq!(overridden.headers, headers(&[("CONTENT-TYPE", "text/xml")]));
    }

    #[test]
    fn test_empty_or_missing_query_appends_nothing() {
        let req = builder(Method::GET).query(json!({})).finalize().unwrap();
        assert_eq!(req.url, "/");

        let req = builder(Method::GET).finalize().unwrap();
        assert_eq!(req.url, "/");
        assert!(!req.url.contains('?'));
    }

    #[test]
    fn test_option_precedence() {
        let client = Client::builder("/")
            .options(RequestOptions::new().header("X", "base"))
            .transport(Fixed(StatusCode::OK, "{}"))
            .build();
        let builder = client.get().headers(json!({"X": "desc"}));

        assert_eq!(builder.finalize().unwrap().header("X"), Some("desc"));

        let extra = RequestOptions::new().header("X", "extra");
        assert_eq!(builder.finalize_with(&extra).unwrap().header("X"), Some("extra"));
    }

    #[test]
    fn test_extra_options_can_override_method_and_drop_headers() {
        let extra = RequestOptions::new()
            .with("method", "PATCH")
            .with("headers", json!({"Content-Type": null}));
        let req = builder(Method::POST).finalize_with(&extra).unwrap();
        assert_eq!(req.method, Method::PATCH);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_transport_options_pass_through() {
        let extra = RequestOptions::new()
            .with("timeout_ms", 250)
            .with("credentials", "include");
        let req = builder(Method::GET).finalize_with(&extra).unwrap();
        assert_eq!(req.options.get_str("credentials"), Some("include"));
        assert_eq!(
            req.options.timeout_duration(),
            Some(std::time::Duration::from_millis(250))
        );
        assert!(req.options.get("method").is_none());
    }

    #[test]
    fn test_params_and_trailing_separator() {
        let client = Client::builder("/")
            .transport(Fixed(StatusCode::OK, "{}"))
            .build();
        let req = client
            .segment("users")
            .segment(":id")
            .get()
            .params(json!({"id": 42}))
            .finalize()
            .unwrap();
        assert_eq!(req.url, "/users/42/");
    }

    #[test]
    fn test_mutators_replace_wholesale() {
        let b = builder(Method::GET)
            .query(json!({"a": "1"}))
            .query(json!({"b": "2"}));
        assert_eq!(b.finalize().unwrap().url, "/?b=2");
    }

    #[test]
    fn test_branches_do_not_interfere() {
        let root = builder(Method::POST).query(json!({"shared": "1"}));
        let left = root.body(json!({"side": "left"}));
        let right = root.headers(json!({"X-Side": "right"}));

        assert_eq!(root.descriptor().body(), None);
        assert_eq!(left.descriptor().headers(), None);
        assert_eq!(right.descriptor().body(), None);
        assert_eq!(left.descriptor().query(), right.descriptor().query());
    }

    #[test]
    fn test_serialize_failure_surfaces_on_finalize() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<Ser: serde::Serializer>(
                &self,
                _serializer: Ser,
            ) -> std::result::Result<Ser::Ok, Ser::Error> {
                Err(serde::ser::Error::custom("broken body"))
            }
        }

        struct BrokenBody;
        impl Schema for BrokenBody {
            type Body = Broken;
            type Query = BTreeMap<String, String>;
            type Params = Value;
            type Headers = Value;
            type Response = Value;
        }

        let client = Client::builder("/")
            .transport(Fixed(StatusCode::OK, "{}"))
            .build();
        let b = client.typed::<BrokenBody>(Method::POST).body(Broken);
        match b.finalize() {
            Err(ClientError::Serialize { field, message }) => {
                assert_eq!(field, "body");
                assert!(message.contains("broken body"));
            }
            other => panic!("expected serialize error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_decodes_json() {
        let client = Client::builder("/")
            .transport(Fixed(StatusCode::OK, r#"{"bbb":"ok"}"#))
            .build();
        let value = client.get().execute().await.unwrap();
        assert_eq!(value, json!({"bbb": "ok"}));
    }

    #[tokio::test]
    async fn test_non_success_is_fetch_error() {
        let client = Client::builder("/")
            .transport(Fixed(StatusCode::NOT_FOUND, "missing"))
            .build();
        let err = client.get().execute().await.unwrap_err();
        let response = err.response().expect("fetch error carries response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "missing");
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let client = Client::builder("/")
            .transport(Fixed(StatusCode::OK, "not json"))
            .build();
        let err = client.get().execute().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    proptest! {
        #[test]
        fn prop_setting_twice_is_idempotent(key in "[a-z]{1,6}", value in "[a-zA-Z0-9]{0,8}") {
            let once = builder(Method::POST).query(json!({ &key: &value }));
            let twice = once.query(json!({ &key: &value }));
            prop_assert_eq!(once.finalize().unwrap(), twice.finalize().unwrap());
        }

        #[test]
        fn prop_body_less_methods_never_send_body(body in "[a-z]{0,12}", head in any::<bool>()) {
            let method = if head { Method::HEAD } else { Method::GET };
            let req = builder(method).body(json!({"b": body})).finalize().unwrap();
            prop_assert!(req.body.is_none());
        }
    }
}

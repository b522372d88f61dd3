//! Query string encoding
//!
//! The builder hands its `query` value to a [`QueryEncoder`] and appends the
//! result after a `?` when it is non-empty.

use crate::error::{ClientError, Result};
use serde_json::Value;

/// Turns a query value into the text after `?`.
///
/// Must return an empty string for `null` and for an empty object.
pub trait QueryEncoder: Send + Sync + 'static {
    /// Encode the query value
    fn encode(&self, query: &Value) -> Result<String>;
}

/// Bracket-notation encoder, the default.
///
/// Nested objects become `a[b]=c`, arrays become `a[0]=x`. Keys and values are
/// percent-encoded outside the unreserved set, so brackets appear as `%5B`/`%5D`
/// and spaces as `%20`. A `null` leaf encodes as `key=`; empty nested objects
/// and arrays produce nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketEncoder;

impl QueryEncoder for BracketEncoder {
    fn encode(&self, query: &Value) -> Result<String> {
        let mut pairs = Vec::new();
        match query {
            Value::Object(map) => {
                for (key, value) in map {
                    push_pairs(key, value, &mut pairs);
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    push_pairs(&index.to_string(), value, &mut pairs);
                }
            }
            _ => {}
        }
        Ok(pairs.join("&"))
    }
}

fn push_pairs(prefix: &str, value: &Value, pairs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                push_pairs(&format!("{prefix}[{key}]"), nested, pairs);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                push_pairs(&format!("{prefix}[{index}]"), nested, pairs);
            }
        }
        Value::Null => pairs.push(format!("{}=", urlencoding::encode(prefix))),
        Value::String(s) => pairs.push(format!(
            "{}={}",
            urlencoding::encode(prefix),
            urlencoding::encode(s)
        )),
        Value::Bool(b) => pairs.push(format!("{}={}", urlencoding::encode(prefix), b)),
        Value::Number(n) => pairs.push(format!(
            "{}={}",
            urlencoding::encode(prefix),
            urlencoding::encode(&n.to_string())
        )),
    }
}

/// Flat `application/x-www-form-urlencoded` encoder.
///
/// Only accepts an object of scalar values; nested values are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormEncoder;

impl QueryEncoder for FormEncoder {
    fn encode(&self, query: &Value) -> Result<String> {
        match query {
            Value::Null => Ok(String::new()),
            Value::Object(map) if map.is_empty() => Ok(String::new()),
            other => {
                serde_urlencoded::to_string(other).map_err(|e| ClientError::Query(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bracket(value: Value) -> String {
        BracketEncoder.encode(&value).unwrap()
    }

    #[test]
    fn test_flat_pairs_in_order() {
        assert_eq!(bracket(json!({"a": "1", "b": "2"})), "a=1&b=2");
        assert_eq!(bracket(json!({"aaa": "123"})), "aaa=123");
    }

    #[test]
    fn test_empty_inputs_encode_to_nothing() {
        assert_eq!(bracket(json!({})), "");
        assert_eq!(bracket(Value::Null), "");
        assert_eq!(bracket(json!("plain")), "");
        assert_eq!(bracket(json!({"a": {}, "b": []})), "");
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        assert_eq!(bracket(json!({"a": {"b": "c"}})), "a%5Bb%5D=c");
        assert_eq!(bracket(json!({"ids": [1, 2]})), "ids%5B0%5D=1&ids%5B1%5D=2");
        assert_eq!(
            bracket(json!({"f": {"tags": ["x"], "on": true}})),
            "f%5Btags%5D%5B0%5D=x&f%5Bon%5D=true"
        );
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        assert_eq!(bracket(json!({"q": "a b&c=d"})), "q=a%20b%26c%3Dd");
        assert_eq!(bracket(json!({"k~-_.": "~-_."})), "k~-_.=~-_.");
    }

    #[test]
    fn test_null_leaf_keeps_key() {
        assert_eq!(bracket(json!({"a": null, "b": 1})), "a=&b=1");
    }

    #[test]
    fn test_form_encoder_flat() {
        let encoded = FormEncoder.encode(&json!({"q": "a b", "page": 2})).unwrap();
        assert_eq!(encoded, "q=a+b&page=2");
        assert_eq!(FormEncoder.encode(&json!({})).unwrap(), "");
    }

    #[test]
    fn test_form_encoder_rejects_nested() {
        let err = FormEncoder.encode(&json!({"a": {"b": 1}})).unwrap_err();
        assert!(matches!(err, ClientError::Query(_)));
    }
}

//! Path parameter substitution
//!
//! Placeholders are whole path segments of the form `:name`, bounded by a
//! separator on both sides (`/:name/`). Substitution runs in a single pass over
//! the original template, so text inserted for one parameter is never scanned
//! for further placeholders and no character in a value has special meaning.

use serde_json::Value;
use smallvec::SmallVec;
use std::borrow::Cow;

/// Maximum number of path parameters to store on the stack.
/// Most routes have 1-4 parameters, so this covers the majority of cases
/// without heap allocation.
pub const STACK_PARAMS_CAPACITY: usize = 4;

/// Ordered parameter values, already stringified for insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: SmallVec<[(String, String); STACK_PARAMS_CAPACITY]>,
}

impl PathParams {
    /// Create a new empty path params collection.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: SmallVec::new(),
        }
    }

    /// Collect parameters from a JSON object, keeping key order.
    ///
    /// Values that are not objects carry no parameters.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), stringify(value)))
                .collect(),
            _ => Self::new(),
        }
    }

    /// Insert a key-value pair.
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.push((key.into(), value.into()));
    }

    /// Get a value by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Replace the first `/:key/` placeholder of every key in `path`.
    ///
    /// Placeholders without a value are left untouched. The first and last
    /// segments are never candidates because they lack a separator on one side.
    pub fn substitute(&self, path: &str) -> String {
        if self.inner.is_empty() {
            return path.to_string();
        }

        let template: Vec<&str> = path.split('/').collect();
        let mut output: Vec<Cow<'_, str>> = template.iter().map(|s| Cow::Borrowed(*s)).collect();
        let mut taken = vec![false; template.len()];
        let last = template.len().saturating_sub(1);

        for (key, value) in &self.inner {
            let found = (1..last).find(|&i| {
                !taken[i]
                    && template[i]
                        .strip_prefix(':')
                        .is_some_and(|name| name == key)
            });
            if let Some(i) = found {
                output[i] = Cow::Owned(value.clone());
                taken[i] = true;
            }
        }

        output.join("/")
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Text form of a parameter value as it appears in the path
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_replaces_bounded_placeholder() {
        let params = PathParams::from_value(&json!({"id": 42}));
        assert_eq!(params.substitute("/users/:id/"), "/users/42/");
    }

    #[test]
    fn test_missing_value_leaves_placeholder() {
        let params = PathParams::from_value(&json!({"id": 1}));
        assert_eq!(params.substitute("/a/:id/b/:other/"), "/a/1/b/:other/");
    }

    #[test]
    fn test_only_first_occurrence_per_key() {
        let params = PathParams::from_value(&json!({"id": 7}));
        assert_eq!(params.substitute("/:id/x/:id/"), "/7/x/:id/");
    }

    #[test]
    fn test_dollar_is_inserted_literally() {
        let params = PathParams::from_value(&json!({"name": "a$&b$1$$"}));
        assert_eq!(params.substitute("/files/:name/"), "/files/a$&b$1$$/");
    }

    #[test]
    fn test_inserted_text_is_not_rescanned() {
        let params = PathParams::from_value(&json!({"a": ":b", "b": "x"}));
        assert_eq!(params.substitute("/:a/:b/"), "/:b/x/");
    }

    #[test]
    fn test_adjacent_placeholders_share_separator() {
        let params = PathParams::from_value(&json!({"org": "acme", "repo": "rf"}));
        assert_eq!(params.substitute("/:org/:repo/"), "/acme/rf/");
    }

    #[test]
    fn test_unbounded_segments_are_ignored() {
        let params = PathParams::from_value(&json!({"id": 1}));
        assert_eq!(params.substitute(":id/"), ":id/");
        assert_eq!(params.substitute("/x/:id"), "/x/:id");
        assert_eq!(params.substitute("/x/:identity/"), "/x/:identity/");
    }

    #[test]
    fn test_absolute_url_host_untouched() {
        let params = PathParams::from_value(&json!({"id": "abc"}));
        assert_eq!(
            params.substitute("http://localhost:8080/items/:id/"),
            "http://localhost:8080/items/abc/"
        );
    }

    #[test]
    fn test_stringify_scalars_and_composites() {
        assert_eq!(stringify(&json!("s")), "s");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(null)), "null");
        assert_eq!(stringify(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_non_object_yields_no_params() {
        assert!(PathParams::from_value(&json!([1, 2])).is_empty());
        assert!(PathParams::from_value(&json!("id")).is_empty());
    }

    #[test]
    fn test_small_params_on_stack() {
        let params: PathParams = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.len(), 2);
        assert!(!params.inner.spilled());
    }

    proptest! {
        #[test]
        fn prop_value_lands_verbatim(value in "[a-zA-Z0-9$&.~:-]{1,16}") {
            let params = PathParams::from_value(&json!({"id": value.clone()}));
            prop_assert_eq!(params.substitute("/items/:id/"), format!("/items/{}/", value));
        }
    }
}

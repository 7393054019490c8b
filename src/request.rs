//! Request shaping: query strings, headers, prepared requests.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;

/// Insertion-ordered query parameters.
///
/// Entries whose value is falsy under JS rules (`null`, `false`, `0`, `""`)
/// are omitted from the query string entirely. Values are rendered verbatim
/// with no URL-encoding; callers needing encoding must pre-encode.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    entries: Vec<(String, Value)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping insertion order.
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the `?k=v&k2=v2` form, skipping falsy values.
    pub fn to_query_string(&self) -> String {
        let mut out = String::new();
        let mut count = 0;
        for (key, value) in &self.entries {
            if !is_truthy(value) {
                continue;
            }
            out.push(if count == 0 { '?' } else { '&' });
            out.push_str(key);
            out.push('=');
            out.push_str(&render_value(value));
            count += 1;
        }
        out
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// JS-style truthiness for query values. Empty arrays/objects are truthy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A fully shaped request, built fresh for every call.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: String,
    pub headers: HeaderMap,
}

/// Build a `HeaderMap` from string pairs, skipping entries that are not valid
/// header names or values.
pub(crate) fn build_header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        if let (Ok(name), Ok(val)) = (
            HeaderName::from_bytes(k.as_bytes()),
            HeaderValue::from_str(v),
        ) {
            map.insert(name, val);
        }
    }
    map
}

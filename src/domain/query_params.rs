//! Flattened parameters handed to a query capability.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Parameters compared by value: two sets built from equal state are equal
/// regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`QueryParams::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn page(&self) -> Option<u64> {
        self.get("page").and_then(Value::as_u64)
    }

    pub fn size(&self) -> Option<u64> {
        self.get("size").and_then(Value::as_u64)
    }

    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// String values of a key, whether it holds one string or an array.
    pub fn values(&self, key: &str) -> Vec<&str> {
        match self.get(key) {
            Some(Value::String(value)) => vec![value.as_str()],
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable textual form used when composing registry keys.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl FromIterator<(String, Value)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_is_structural() {
        let a = QueryParams::new().with("page", 0).with("size", 10);
        let b = QueryParams::new().with("size", 10).with("page", 0);
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn values_reads_scalars_and_arrays() {
        let params = QueryParams::new()
            .with("status", json!(["ACTIVE", "BLOCKED"]))
            .with("type", "PDF");
        assert_eq!(params.values("status"), vec!["ACTIVE", "BLOCKED"]);
        assert_eq!(params.values("type"), vec!["PDF"]);
        assert!(params.values("missing").is_empty());
    }

    #[test]
    fn page_and_size_accessors() {
        let params = QueryParams::new().with("page", 4).with("size", 20);
        assert_eq!(params.page(), Some(4));
        assert_eq!(params.size(), Some(20));
    }
}

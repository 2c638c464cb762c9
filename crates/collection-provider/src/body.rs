//! The search request body accumulated by the extension chain.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Key holding the query clause.
pub const QUERY: &str = "query";
/// Key holding aggregations.
pub const AGGS: &str = "aggs";
/// Key holding the page size.
pub const SIZE: &str = "size";
/// Key holding the page offset.
pub const FROM: &str = "from";
/// Key holding sort clauses.
pub const SORT: &str = "sort";

/// Returns the canonical match-all query.
pub fn match_all() -> Value {
    json!({ "match_all": {} })
}

/// A search request body.
///
/// Keys holding JSON `null` are treated as absent everywhere; `0`, `""` and
/// `false` are real values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryBody(Map<String, Value>);

impl QueryBody {
    /// Creates an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value at `key` unless it is absent or null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Returns a mutable reference to the value at `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns whether `key` holds a non-null value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Sets `key` only when it is absent or null, and returns whatever value
    /// ends up stored there.
    pub fn set_if_absent(&mut self, key: &str, value: impl Into<Value>) -> &Value {
        self.set_if_absent_with(key, || value)
    }

    /// Like [`set_if_absent`](Self::set_if_absent), but only computes the
    /// value when the key is absent or null.
    pub fn set_if_absent_with<V, F>(&mut self, key: &str, value: F) -> &Value
    where
        V: Into<Value>,
        F: FnOnce() -> V,
    {
        if !self.contains(key) {
            self.0.insert(key.to_string(), value().into());
        }
        &self.0[key]
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Number of top-level keys, null ones included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the body has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the body into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for QueryBody {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<QueryBody> for Value {
    fn from(body: QueryBody) -> Self {
        body.into_value()
    }
}

//! Ordered map of logical field names to raw values.

use crate::error::{JoblyError, JoblyResult};
use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An insertion-ordered map from logical field name (e.g. `minSalary`) to value.
///
/// Iteration order decides placeholder numbering in the fragment builders, so the
/// N-th key always lines up with `$N` and the N-th bound value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(IndexMap<String, FieldValue>);

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert a field. Re-inserting an existing key replaces the value but keeps its slot.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Consuming version of [`FieldMap::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Build a map from a JSON object, keeping its key order.
    pub fn from_json(value: serde_json::Value) -> JoblyResult<Self> {
        let serde_json::Value::Object(object) = value else {
            return Err(JoblyError::bad_request("Expected a JSON object"));
        };
        object
            .into_iter()
            .map(|(k, v)| FieldValue::try_from(v).map(|v| (k, v)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

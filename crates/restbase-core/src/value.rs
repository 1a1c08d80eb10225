use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// A dynamic row type wrapping a HashMap of column name to JSON value.
/// Used for the string-based (dynamic) API when not using typed structs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Row(pub HashMap<String, JsonValue>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Set a column value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a column value.
    pub fn get_value(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Check if a column exists.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Get a typed value from a column, returning None if missing or wrong type.
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get column names.
    pub fn columns(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the row and return the inner HashMap.
    pub fn into_inner(self) -> HashMap<String, JsonValue> {
        self.0
    }
}

impl Deref for Row {
    type Target = HashMap<String, JsonValue>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Row {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(map)
    }
}

impl<K: Into<String>, V: Into<JsonValue>, const N: usize> From<[(K, V); N]> for Row {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl From<Row> for JsonValue {
    fn from(row: Row) -> Self {
        JsonValue::Object(row.0.into_iter().collect())
    }
}

/// Body of an insert: one row or a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    One(Row),
    Many(Vec<Row>),
}

impl Payload {
    /// Number of rows carried.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_json(self) -> JsonValue {
        match self {
            Self::One(row) => row.into(),
            Self::Many(rows) => JsonValue::Array(rows.into_iter().map(JsonValue::from).collect()),
        }
    }
}

impl From<Row> for Payload {
    fn from(row: Row) -> Self {
        Self::One(row)
    }
}

impl From<Vec<Row>> for Payload {
    fn from(rows: Vec<Row>) -> Self {
        Self::Many(rows)
    }
}

/// Macro for constructing a `Row` with key-value pairs.
///
/// # Examples
/// ```
/// use restbase_core::row;
/// let row = row![("name", "Spring sale"), ("step_count", 3)];
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new()
    };
    ($(($key:expr, $val:expr)),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $(
            row.set($key, $crate::__json::json!($val));
        )+
        row
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_set_get() {
        let mut row = Row::new();
        row.set("status", "draft");
        assert_eq!(row.get_value("status"), Some(&JsonValue::from("draft")));
        assert!(row.contains("status"));
        assert!(!row.contains("missing"));
    }

    #[test]
    fn test_row_get_as() {
        let row = row![("sent", 42)];
        assert_eq!(row.get_as::<i64>("sent"), Some(42));
        assert_eq!(row.get_as::<String>("sent"), None);
    }

    #[test]
    fn test_payload_one_serializes_as_object() {
        let payload = Payload::from(row![("name", "Welcome")]);
        let json = payload.into_json();
        assert!(json.is_object());
        assert_eq!(json["name"], "Welcome");
    }

    #[test]
    fn test_payload_many_serializes_as_array() {
        let payload = Payload::from(vec![row![("n", 1)], row![("n", 2)]]);
        assert_eq!(payload.len(), 2);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
    }
}

//! Flat key/value record holding one form's input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use portal_directory::JsonObject;

/// Field name to value mapping owned by one workflow model for the duration
/// of a request. Values are strings, with `null` for a few optional fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord(JsonObject);

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill in fields absent from the record. Present fields, even `null`
    /// ones, are left alone.
    pub fn with_defaults(mut self, defaults: &[(&str, Value)]) -> Self {
        for (field, value) in defaults {
            self.0
                .entry(field.to_string())
                .or_insert_with(|| value.clone());
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// String form of a scalar field. Numeric identifiers handed back by the
    /// directory come out as their decimal text.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Whether the field holds a meaningful value: not absent, `null`,
    /// `false`, zero or an empty string.
    pub fn is_truthy(&self, field: &str) -> bool {
        match self.0.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => !value.is_empty(),
            Some(Value::Number(value)) => value.as_f64().map_or(true, |n| n != 0.0),
            Some(_) => true,
        }
    }

    /// Shallow merge, overwriting existing fields.
    pub fn merge(&mut self, other: JsonObject) {
        self.0.extend(other);
    }

    /// Copy of the record minus the named fields.
    pub fn without(&self, fields: &[&str]) -> JsonObject {
        self.0
            .iter()
            .filter(|(key, _)| !fields.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    pub fn into_object(self) -> JsonObject {
        self.0
    }
}

impl From<JsonObject> for FormRecord {
    fn from(object: JsonObject) -> Self {
        Self(object)
    }
}

impl<K, V> FromIterator<(K, V)> for FormRecord
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

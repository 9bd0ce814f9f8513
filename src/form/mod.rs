//! Form data — the field store behind every wizard screen.
//!
//! DESIGN
//! ======
//! `FormData` is an ordered map from field name to a tagged `FieldValue`.
//! Updates are top-level shallow merges: setting a key replaces that key's
//! value and leaves every other key untouched. Nested objects are replaced
//! whole unless the caller opts into `merge_field_deep`.
//!
//! Screens that need a statically typed view of a filled form convert it with
//! `to_typed`, which projects the map into plain JSON and deserializes it.

pub mod de;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::Date;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("form data does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{field}` is not a valid amount: {value}")]
    InvalidAmount { field: String, value: String },
}

// =============================================================================
// FIELD VALUES
// =============================================================================

/// Handle to a file picked in an upload control. Only metadata is kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl FileHandle {
    #[must_use]
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self { name: name.into(), size_bytes, mime_type: mime_type.into() }
    }
}

/// A single form field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(#[serde(with = "de::iso_date")] Date),
    Object(FormData),
    File(FileHandle),
    List(Vec<FieldValue>),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&FormData> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is parsed after stripping thousands
    /// separators, since amount inputs hold what the user typed.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        }
    }

    /// True when the value would render as an empty input.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Object(obj) => obj.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::File(file) => file.name.is_empty(),
            Self::Bool(_) | Self::Date(_) => false,
        }
    }

    /// Plain JSON projection (untagged), used for typed conversion.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Bool(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(de::format_date(*d)),
            Self::Object(obj) => obj.to_json(),
            Self::File(file) => serde_json::json!({
                "name": file.name,
                "sizeBytes": file.size_bytes,
                "mimeType": file.mime_type,
            }),
            Self::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<FileHandle> for FieldValue {
    fn from(value: FileHandle) -> Self {
        Self::File(value)
    }
}

impl From<FormData> for FieldValue {
    fn from(value: FormData) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        Self::List(value)
    }
}

/// Build a value from plain JSON, as produced by a form control.
/// `null` becomes blank text.
impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Text(String::new()),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(map.into_iter().collect()),
        }
    }
}

// =============================================================================
// FORM DATA
// =============================================================================

/// Partially-filled form data for one wizard instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    fields: BTreeMap<String, FieldValue>,
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-merge `value` under `key` and return the updated map.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Shallow-merge `value` under `key` in place, returning the previous value.
    /// Every other key is left as it was.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Like `set_field`, but when both the existing and the new value are
    /// objects their keys are merged recursively instead of replaced.
    pub fn merge_field_deep(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        match value.into() {
            FieldValue::Object(update) => match self.fields.get_mut(&key) {
                Some(FieldValue::Object(existing)) => {
                    for (k, v) in update.fields {
                        existing.merge_field_deep(k, v);
                    }
                }
                _ => {
                    self.fields.insert(key, FieldValue::Object(update));
                }
            },
            value => {
                self.fields.insert(key, value);
            }
        }
    }

    /// Shallow-merge every key of `other` into this map.
    pub fn merge(&mut self, other: FormData) {
        self.fields.extend(other.fields);
    }

    pub fn remove_field(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Look up a dotted path such as `supplyChainDetails.supplierName`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// True when `path` is missing or holds a blank value.
    #[must_use]
    pub fn is_blank(&self, path: &str) -> bool {
        self.get_path(path).is_none_or(FieldValue::is_blank)
    }

    /// True when `path` holds a boolean `true`.
    #[must_use]
    pub fn flag(&self, path: &str) -> bool {
        self.get_path(path).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    /// True when `path` holds a finite number greater than zero.
    #[must_use]
    pub fn positive_number(&self, path: &str) -> bool {
        self.get_path(path)
            .and_then(FieldValue::as_number)
            .is_some_and(|n| n.is_finite() && n > 0.0)
    }

    /// Read `path` as a positive amount, failing with a typed error.
    pub fn amount(&self, path: &str) -> Result<f64, FormError> {
        let value = self
            .get_path(path)
            .ok_or_else(|| FormError::MissingField(path.to_owned()))?;
        match value.as_number() {
            Some(n) if n.is_finite() && n > 0.0 => Ok(n),
            _ => Err(FormError::InvalidAmount { field: path.to_owned(), value: value.to_json().to_string() }),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain JSON projection of the whole map.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Convert into a per-wizard struct.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, FormError> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

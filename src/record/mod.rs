//! Records - the schemaless unit of storage.
//!
//! A `Record` is a flat map from field name to a closed set of value shapes.
//! Everything that crosses the wire or the store boundary is a `Record`;
//! typed views (see `catalog`) are derived from it, never the other way
//! around.
//!
//! ## Example
//!
//! ```
//! use dive_catalog::record::{Record, Value};
//!
//! let mut record = Record::new();
//! record.insert("title", "Wreck Dive");
//! record.insert("includes", vec!["Boat".to_string(), "Guide".to_string()]);
//!
//! assert_eq!(record.get("title"), Some(&Value::String("Wreck Dive".into())));
//! assert_eq!(record.id(), None);
//! ```

pub mod coercion;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use coercion::{ArrayField, ARRAY_FIELDS};

/// Name of a field within a record.
pub type FieldName = String;

/// The identifier field shared by every collection.
pub const ID_FIELD: &str = "id";

/// A single field value.
///
/// Deliberately closed: nested objects and mixed arrays are rejected when a
/// record is decoded, so coercion and SQL binding can match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    StringArray(Vec<String>),
}

impl Value {
    /// Borrow the text of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A `String` value that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::String(s) => s.trim().is_empty(),
            Value::Null => true,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StringArray(value)
    }
}

/// A flat map of field name to value.
///
/// Field order is the map's sorted order, which keeps generated statements
/// deterministic for a given field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<FieldName, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<FieldName>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// The record's identifier, if present and non-blank.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
    }

    /// Set the identifier field.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    /// Borrow a field as text.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &Value)> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.keys()
    }

    pub(crate) fn fields_mut(&mut self) -> &mut BTreeMap<FieldName, Value> {
        &mut self.fields
    }
}

impl FromIterator<(FieldName, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (FieldName, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (FieldName, Value);
    type IntoIter = std::collections::btree_map::IntoIter<FieldName, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

//! Schema coercion for array-valued fields.
//!
//! The store keeps `includes`, `features` and `categories` as JSON text;
//! everything above the store works with string lists. `decode_*` runs on
//! the read path, `encode_*` on the write path. Both are total and
//! idempotent: a malformed field degrades to its raw text instead of failing
//! the record, and coercing an already-coerced value changes nothing.

use tracing::warn;

use super::{Record, Value};

/// Fields persisted as serialized text and exposed as string lists.
pub const ARRAY_FIELDS: &[&str] = &["includes", "features", "categories"];

/// An array-valued field at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayField {
    /// Serialized form as held by the store.
    Raw(String),
    /// Structured form used by callers.
    Structured(Vec<String>),
}

impl ArrayField {
    /// View a value as an array field. Scalars other than text are not
    /// array fields and yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(ArrayField::Raw(text.clone())),
            Value::StringArray(list) => Some(ArrayField::Structured(list.clone())),
            _ => None,
        }
    }

    /// Parse into the structured form. Text that is not a JSON array of
    /// strings is handed back unchanged as the error.
    pub fn into_structured(self) -> Result<Vec<String>, ArrayField> {
        match self {
            ArrayField::Structured(list) => Ok(list),
            ArrayField::Raw(text) => {
                serde_json::from_str::<Vec<String>>(&text).map_err(|_| ArrayField::Raw(text))
            }
        }
    }

    /// Serialize into the stored text form.
    pub fn into_raw(self) -> String {
        match self {
            ArrayField::Raw(text) => text,
            // A Vec<String> always serializes.
            ArrayField::Structured(list) => {
                serde_json::to_string(&list).unwrap_or_else(|_| "[]".to_string())
            }
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ArrayField::Raw(text) => Value::String(text),
            ArrayField::Structured(list) => Value::StringArray(list),
        }
    }
}

/// Whether `field` is one of the known array-valued fields.
pub fn is_array_field(field: &str) -> bool {
    ARRAY_FIELDS.contains(&field)
}

/// Read-path coercion of a single value.
pub fn decode_value(value: Value) -> Value {
    match ArrayField::from_value(&value) {
        Some(field) => match field.into_structured() {
            Ok(list) => Value::StringArray(list),
            Err(raw) => raw.into_value(),
        },
        None => value,
    }
}

/// Write-path coercion of a single value.
pub fn encode_value(value: Value) -> Value {
    match value {
        Value::StringArray(list) => Value::String(ArrayField::Structured(list).into_raw()),
        other => other,
    }
}

/// Normalize every known array field of a record to its structured form.
pub fn decode_record(mut record: Record) -> Record {
    for field in ARRAY_FIELDS {
        if let Some(value) = record.fields_mut().remove(*field) {
            let decoded = decode_value(value);
            if let Value::String(text) = &decoded {
                if !text.is_empty() {
                    warn!(field = *field, "array field is not a JSON string list, passing through");
                }
            }
            record.fields_mut().insert(field.to_string(), decoded);
        }
    }
    record
}

/// Serialize every known array field of a record to its stored text form.
pub fn encode_record(mut record: Record) -> Record {
    for field in ARRAY_FIELDS {
        if let Some(value) = record.fields_mut().remove(*field) {
            record
                .fields_mut()
                .insert(field.to_string(), encode_value(value));
        }
    }
    record
}

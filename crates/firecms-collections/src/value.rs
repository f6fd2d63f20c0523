//! Dynamic document values
//!
//! Collection definitions carry free-form configuration next to their typed
//! fields. [`FieldValue`] models those values, including the three states
//! that have no JSON representation: a field that is present but unset, a
//! code-defined function, and the store's "delete this field" sentinel.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Opaque reference to a code-defined function.
///
/// Functions (property builders, callbacks, custom actions) live in the UI
/// layer. The core only needs to recognize them so they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef(String);

impl FunctionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A dynamic value in a collection document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),

    /// Field present without a value, e.g. cleared in the editor
    Undefined,

    /// Code-defined value, never persisted
    Function(FunctionRef),

    /// Instructs the store to delete the field
    Delete,
}

impl FieldValue {
    /// String value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Map entries, if this is a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, FieldValue::Function(_))
    }

    /// Check if this value, or any value nested in it, is `Undefined`.
    pub fn contains_undefined(&self) -> bool {
        match self {
            FieldValue::Undefined => true,
            FieldValue::Array(items) => items.iter().any(FieldValue::contains_undefined),
            FieldValue::Map(entries) => entries.values().any(FieldValue::contains_undefined),
            _ => false,
        }
    }

    /// Check if this value, or any value nested in it, is a function.
    pub fn contains_function(&self) -> bool {
        match self {
            FieldValue::Function(_) => true,
            FieldValue::Array(items) => items.iter().any(FieldValue::contains_function),
            FieldValue::Map(entries) => entries.values().any(FieldValue::contains_function),
            _ => false,
        }
    }

    /// JSON form of the value as the store would hold it after a write.
    ///
    /// Returns `None` for values that leave nothing behind in the store
    /// (`Undefined`, `Function`, `Delete`); such map entries are omitted.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            FieldValue::Null => Some(Value::Null),
            FieldValue::Bool(b) => Some(Value::Bool(*b)),
            FieldValue::Number(n) => Some(Value::Number(n.clone())),
            FieldValue::String(s) => Some(Value::String(s.clone())),
            FieldValue::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|v| v.to_json().unwrap_or(Value::Null))
                    .collect(),
            )),
            FieldValue::Map(entries) => Some(Value::Object(
                entries
                    .iter()
                    .filter_map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                    .collect(),
            )),
            FieldValue::Undefined | FieldValue::Function(_) | FieldValue::Delete => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => FieldValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => {
                FieldValue::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::String).unwrap_or(FieldValue::Undefined)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Number(n) => n.serialize(serializer),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Map(entries) => {
                let kept: Vec<_> = entries
                    .iter()
                    .filter(|(_, v)| !matches!(v, FieldValue::Undefined | FieldValue::Function(_)))
                    .collect();
                let mut map = serializer.serialize_map(Some(kept.len()))?;
                for (k, v) in kept {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            // Delete sentinels are translated by the store adapter before a
            // payload is serialized.
            FieldValue::Null
            | FieldValue::Undefined
            | FieldValue::Function(_)
            | FieldValue::Delete => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FieldValue::from)
    }
}

/// Recursively drop function values.
///
/// Map entries holding functions are removed and so are function elements
/// of arrays.
pub fn remove_functions(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Map(entries) => FieldValue::Map(remove_functions_in_map(entries)),
        FieldValue::Array(items) => FieldValue::Array(
            items
                .into_iter()
                .filter(|v| !v.is_function())
                .map(remove_functions)
                .collect(),
        ),
        other => other,
    }
}

/// Map form of [`remove_functions`].
pub fn remove_functions_in_map(
    entries: IndexMap<String, FieldValue>,
) -> IndexMap<String, FieldValue> {
    entries
        .into_iter()
        .filter(|(_, v)| !v.is_function())
        .map(|(k, v)| (k, remove_functions(v)))
        .collect()
}

/// Recursively replace `Undefined` with the `Delete` sentinel.
///
/// A partial update then clears fields that were unset in the editor instead
/// of leaving the previously stored value in place.
pub fn set_undefined_to_delete(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Undefined => FieldValue::Delete,
        FieldValue::Map(entries) => FieldValue::Map(set_undefined_to_delete_in_map(entries)),
        FieldValue::Array(items) => {
            FieldValue::Array(items.into_iter().map(set_undefined_to_delete).collect())
        }
        other => other,
    }
}

/// Map form of [`set_undefined_to_delete`].
pub fn set_undefined_to_delete_in_map(
    entries: IndexMap<String, FieldValue>,
) -> IndexMap<String, FieldValue> {
    entries
        .into_iter()
        .map(|(k, v)| (k, set_undefined_to_delete(v)))
        .collect()
}

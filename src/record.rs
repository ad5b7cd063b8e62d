//! Tabular record model: tagged scalar values and ordered field maps.
//!
//! A [`Record`] is one row of a flat table: an ordered mapping from field
//! name to a [`FieldValue`] scalar. Field order follows insertion order,
//! which for JSON-loaded datasets is the object key order of the source
//! row. Nested structures are not representable; they are dropped during
//! JSON conversion and never participate in search.

use std::borrow::Cow;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A scalar field value.
///
/// All classification, matching, and numeric coercion in the crate
/// operates on this tagged type. Deserializes untagged, so JSON scalars
/// map directly: `null` → `Null`, `true` → `Bool`, `42`/`4.2` → `Number`,
/// `"x"` → `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent/unknown value. Never matches and never coerces.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Numeric value. Integers are widened to `f64`.
    Number(f64),
    /// Free text.
    Text(String),
}

impl FieldValue {
    /// Convert a JSON value to a scalar, or `None` for arrays/objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(FieldValue::Null),
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Stringified form used for substring matching, highlighting, and
    /// suggestions. `Null` has no text form.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            FieldValue::Number(n) => Some(Cow::Owned(n.to_string())),
            FieldValue::Text(s) => Some(Cow::Borrowed(s)),
        }
    }

    /// Numeric coercion: numbers pass through, text is parsed, booleans
    /// and nulls fail.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            FieldValue::Bool(_) | FieldValue::Null => None,
        }
    }

    /// Whether the value coerces to a number.
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// Whether the value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One row of a flat table.
///
/// Fields keep their insertion order; setting an existing field replaces
/// its value in place without reordering. Records in one dataset are
/// assumed to share a compatible field set.
///
/// # Example
///
/// ```rust
/// use rowsift::record::Record;
///
/// let record = Record::new()
///     .with("name", "Alice")
///     .with("age", 30);
/// assert_eq!(record.field_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create an empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Convert a JSON object to a record, dropping nested values.
    ///
    /// Returns `None` when the JSON value is not an object. Key order of
    /// the source object is preserved as field order.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut record = Record::with_capacity(object.len());
        for (name, v) in object {
            if let Some(scalar) = FieldValue::from_json(v) {
                record.set(name.clone(), scalar);
            }
        }
        Some(record)
    }

    /// Set a field value, preserving the field's original position when
    /// it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Builder: set a field and return the record.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Check whether a field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a map of field names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    record.set(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Convert a JSON array of flat objects into a dataset.
///
/// Non-object rows are skipped; nested values inside rows are dropped.
/// Returns an empty vector when `value` is not an array.
pub fn records_from_json(value: &serde_json::Value) -> Vec<Record> {
    value
        .as_array()
        .map(|rows| rows.iter().filter_map(Record::from_json).collect())
        .unwrap_or_default()
}

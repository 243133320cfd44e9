//! Record capability: how a Rust type describes its persisted fields.

use super::column::{ColumnType, FieldSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A type the admin can list and edit.
///
/// Field names in `describe_columns` must match the serde field names, since rows are
/// produced by serializing the record.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table (or collection) name used by storage.
    fn table_name() -> &'static str;

    /// Persisted fields in declaration order.
    fn describe_columns() -> Vec<FieldSchema>;
}

/// Infer field metadata from a serialized sample record (usually `T::default()`).
///
/// Type tags come from the JSON shape of each value: numbers with a fractional part are
/// floats, nulls are nullable text, arrays and objects are relationship-like JSON columns.
/// The field named `primary_key` is flagged as the key. Non-object samples yield no fields.
pub fn describe_from_sample<T: Serialize>(sample: &T, primary_key: &str) -> Vec<FieldSchema> {
    let Ok(Value::Object(map)) = serde_json::to_value(sample) else {
        return Vec::new();
    };
    map.into_iter()
        .map(|(name, value)| {
            let mut field = match &value {
                Value::Bool(_) => FieldSchema::new(name, ColumnType::Bool),
                Value::Number(n) if n.is_f64() => FieldSchema::new(name, ColumnType::Float),
                Value::Number(_) => FieldSchema::new(name, ColumnType::Integer),
                Value::String(_) => FieldSchema::new(name, ColumnType::Text),
                Value::Null => FieldSchema::new(name, ColumnType::Text).nullable(),
                Value::Array(_) | Value::Object(_) => FieldSchema::new(name, ColumnType::Json).relationship(),
            };
            if field.name == primary_key {
                field = field.primary_key();
            }
            field
        })
        .collect()
}

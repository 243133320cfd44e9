//! Model: column list and record <-> row conversion for one record type.

use super::column::Column;
use super::record::Record;
use crate::error::{AppError, ConfigError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::TypeId;
use std::collections::HashSet;

/// Column storage name -> value. Keys are exactly the owning model's columns.
pub type Row = Map<String, Value>;

#[derive(Clone, Debug)]
pub struct Model {
    type_id: TypeId,
    type_name: &'static str,
    name: String,
    table_name: String,
    columns: Vec<Column>,
    primary_key: usize,
}

impl Model {
    /// Build from the record's field metadata. Requires exactly one primary-key field.
    pub fn build<T: Record>() -> Result<Self, ConfigError> {
        let type_name = std::any::type_name::<T>();
        let name = short_type_name(type_name).to_string();
        let columns: Vec<Column> = T::describe_columns().into_iter().map(Column::from).collect();

        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.storage_name.as_str()) {
                return Err(ConfigError::DuplicateColumn {
                    model: name,
                    column: c.storage_name.clone(),
                });
            }
        }

        let pk_positions: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key)
            .map(|(i, _)| i)
            .collect();
        let primary_key = match pk_positions.as_slice() {
            [single] => *single,
            [] => return Err(ConfigError::PrimaryKeyMissing { model: name }),
            many => {
                let cols = many
                    .iter()
                    .map(|&i| columns[i].storage_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ConfigError::CompositePrimaryKey { model: name, columns: cols });
            }
        };

        tracing::debug!(model = %name, columns = columns.len(), "model built");
        Ok(Model {
            type_id: TypeId::of::<T>(),
            type_name,
            name,
            table_name: T::table_name().to_string(),
            columns,
            primary_key,
        })
    }

    /// Short type name, e.g. "Post".
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn primary_key(&self) -> &Column {
        &self.columns[self.primary_key]
    }

    pub fn column(&self, storage_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.storage_name == storage_name)
    }

    /// Columns that are not association fields. Default sortable set.
    pub fn columns_excluding_relationships(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| !c.is_relationship).collect()
    }

    pub fn is_model_of<T: Record>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    fn check_type<T: Record>(&self) -> Result<(), ConfigError> {
        if self.is_model_of::<T>() {
            Ok(())
        } else {
            Err(self.mismatch::<T>())
        }
    }

    fn mismatch<T: ?Sized>(&self) -> ConfigError {
        ConfigError::ModelMismatch {
            expected: self.type_name.to_string(),
            found: std::any::type_name::<T>().to_string(),
        }
    }

    /// Row with every column set to its default value.
    pub fn empty_row(&self) -> Row {
        self.columns
            .iter()
            .map(|c| (c.storage_name.clone(), c.default_value()))
            .collect()
    }

    /// Project a record into a row. Accepts the record by value or by reference (`&T`, `&&T`, ...).
    ///
    /// Every serialized field must belong to this model; a value of another type fails with
    /// `ModelMismatch` instead of producing a partial row.
    pub fn to_row<R: Serialize>(&self, instance: R) -> Result<Row, AppError> {
        let value = serde_json::to_value(&instance)
            .map_err(|e| AppError::Storage(format!("serialize {}: {}", self.name, e)))?;
        let Value::Object(mut fields) = value else {
            return Err(self.mismatch::<R>().into());
        };
        let row: Row = self
            .columns
            .iter()
            .map(|c| {
                let v = fields.remove(&c.field_name).unwrap_or_else(|| c.default_value());
                (c.storage_name.clone(), v)
            })
            .collect();
        if !fields.is_empty() {
            return Err(self.mismatch::<R>().into());
        }
        Ok(row)
    }

    /// Rebuild a record from a row. Missing columns take their default value.
    pub fn from_row<T: Record>(&self, row: &Row) -> Result<T, AppError> {
        self.check_type::<T>()?;
        let fields: Map<String, Value> = self
            .columns
            .iter()
            .map(|c| {
                let v = row.get(&c.storage_name).cloned().unwrap_or_else(|| c.default_value());
                (c.field_name.clone(), v)
            })
            .collect();
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::Validation(format!("{}: {}", self.name, e)))
    }

    /// New record built from the default row.
    pub fn new_instance<T: Record>(&self) -> Result<T, AppError> {
        self.from_row(&self.empty_row())
    }

    /// Empty, typed collection for this model's records.
    pub fn new_slice<T: Record>(&self) -> Result<Vec<T>, ConfigError> {
        self.check_type::<T>()?;
        Ok(Vec::new())
    }

    /// Value of the primary-key column in `row`.
    pub fn primary_key_value<'r>(&self, row: &'r Row) -> Result<&'r Value, AppError> {
        let pk = self.primary_key();
        row.get(&pk.storage_name)
            .ok_or_else(|| AppError::BadRequest(format!("row has no '{}' value", pk.storage_name)))
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

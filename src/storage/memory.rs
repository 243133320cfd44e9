//! In-process storage. Rows live in insertion order per table.

use super::{is_unset_key, Storage};
use crate::error::AppError;
use crate::model::{ColumnType, Model, Row};
use crate::query::Query;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing key generation and conflict checks.
    pub fn seed(&self, model: &Model, rows: impl IntoIterator<Item = Row>) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.entry(model.table_name().to_string()).or_default().extend(rows);
    }

    /// Number of rows stored for `model`.
    pub fn row_count(&self, model: &Model) -> usize {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(model.table_name()).map_or(0, Vec::len)
    }
}

fn key_matches(model: &Model, row: &Row, pk: &Value) -> bool {
    let name = &model.primary_key().storage_name;
    row.get(name).is_some_and(|v| compare_values(v, pk) == Ordering::Equal)
}

fn next_key(model: &Model, rows: &[Row]) -> Result<Value, AppError> {
    let pk = model.primary_key();
    match pk.type_tag {
        ColumnType::Integer => {
            let max = rows
                .iter()
                .filter_map(|r| r.get(&pk.storage_name).and_then(Value::as_i64))
                .max()
                .unwrap_or(0);
            let next = max
                .checked_add(1)
                .ok_or_else(|| AppError::Conflict(format!("{} key space exhausted", model.name())))?;
            Ok(Value::Number(next.into()))
        }
        _ => Ok(Value::String(uuid::Uuid::new_v4().to_string())),
    }
}

/// Total order over JSON cells: nulls first, then numbers, strings, bools, the rest by text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.to_lowercase(),
        Value::Null => String::new(),
        other => other.to_string().to_lowercase(),
    }
}

fn matches_search(row: &Row, query: &Query) -> bool {
    let Some(term) = query.search.as_deref() else {
        return true;
    };
    let searchable = &query.options().searchable;
    if searchable.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    searchable
        .iter()
        .filter_map(|name| row.get(name))
        .any(|v| cell_text(v).contains(&term))
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list(&self, model: &Model, query: &Query) -> Result<(u64, Vec<Row>), AppError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<Row> = tables
            .get(model.table_name())
            .map(|rows| rows.iter().filter(|r| matches_search(r, query)).cloned().collect())
            .unwrap_or_default();
        drop(tables);

        let sort = query
            .sort_column
            .clone()
            .unwrap_or_else(|| model.primary_key().storage_name.clone());
        let desc = query.sort_desc && query.sort_column.is_some();
        rows.sort_by(|a, b| {
            let ord = compare_values(
                a.get(&sort).unwrap_or(&Value::Null),
                b.get(&sort).unwrap_or(&Value::Null),
            );
            if desc {
                ord.reverse()
            } else {
                ord
            }
        });

        let total = rows.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let page: Vec<Row> = rows
            .into_iter()
            .skip(offset)
            .take(query.effective_page_size() as usize)
            .collect();
        tracing::debug!(table = %model.table_name(), total, returned = page.len(), "memory list");
        Ok((total, page))
    }

    async fn get(&self, model: &Model, pk: &Value) -> Result<Option<Row>, AppError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .get(model.table_name())
            .and_then(|rows| rows.iter().find(|r| key_matches(model, r, pk)))
            .cloned())
    }

    async fn insert(&self, model: &Model, mut row: Row) -> Result<Row, AppError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let rows = tables.entry(model.table_name().to_string()).or_default();
        let pk_name = model.primary_key().storage_name.clone();
        let key = row.get(&pk_name).cloned().unwrap_or(Value::Null);
        if is_unset_key(&key) {
            let key = next_key(model, rows)?;
            row.insert(pk_name, key);
        } else if rows.iter().any(|r| key_matches(model, r, &key)) {
            return Err(AppError::Conflict(format!("{} with key {} already exists", model.name(), key)));
        }
        for c in model.columns() {
            row.entry(c.storage_name.clone()).or_insert_with(|| c.default_value());
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, model: &Model, pk: &Value, changes: Row) -> Result<Row, AppError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let row = tables
            .get_mut(model.table_name())
            .and_then(|rows| rows.iter_mut().find(|r| key_matches(model, r, pk)))
            .ok_or_else(|| AppError::NotFound(format!("{} {}", model.name(), pk)))?;
        for (k, v) in changes {
            if model.column(&k).is_some_and(|c| !c.is_primary_key) {
                row.insert(k, v);
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, model: &Model, pk: &Value) -> Result<bool, AppError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(rows) = tables.get_mut(model.table_name()) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| !key_matches(model, r, pk));
        Ok(rows.len() < before)
    }
}

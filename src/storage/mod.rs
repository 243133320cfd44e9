//! Persistence collaborator behind model views.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::error::AppError;
use crate::model::{Model, Row};
use crate::query::Query;
use async_trait::async_trait;
use serde_json::Value;

/// Row storage for any model. Rows are keyed by the model's column storage names.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Total matching rows (ignoring paging) and the requested page.
    async fn list(&self, model: &Model, query: &Query) -> Result<(u64, Vec<Row>), AppError>;

    async fn get(&self, model: &Model, pk: &Value) -> Result<Option<Row>, AppError>;

    /// Store a new row and return it as stored (generated key filled in).
    async fn insert(&self, model: &Model, row: Row) -> Result<Row, AppError>;

    /// Overwrite the columns present in `changes`. `NotFound` when no row has that key.
    async fn update(&self, model: &Model, pk: &Value, changes: Row) -> Result<Row, AppError>;

    /// Whether a row was deleted.
    async fn delete(&self, model: &Model, pk: &Value) -> Result<bool, AppError>;
}

/// A key value still at its zero value, to be generated by storage.
pub(crate) fn is_unset_key(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

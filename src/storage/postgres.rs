//! PostgreSQL storage over a shared pool, using the safe SQL builder.

use super::{is_unset_key, Storage};
use crate::error::AppError;
use crate::model::{ColumnType, Model, Row};
use crate::query::Query;
use crate::sql::{count, delete, insert, select_by_pk, select_page, update, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
    schema: Option<String>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        PgStorage { pool, schema: None }
    }

    /// Qualify every table with `schema` instead of relying on the search path.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    async fn fetch_optional(&self, model: &Model, q: &QueryBuf) -> Result<Option<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_row(model, &r)))
    }

    async fn fetch_all(&self, model: &Model, q: &QueryBuf) -> Result<Vec<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|r| row_to_row(model, r)).collect())
    }

    async fn fetch_count(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let n = query.fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn list(&self, model: &Model, query: &Query) -> Result<(u64, Vec<Row>), AppError> {
        let total = self.fetch_count(&count(model, query, self.schema())).await?;
        let rows = self.fetch_all(model, &select_page(model, query, self.schema())).await?;
        Ok((total, rows))
    }

    async fn get(&self, model: &Model, pk: &Value) -> Result<Option<Row>, AppError> {
        let mut q = select_by_pk(model, self.schema());
        q.params.push(pk.clone());
        self.fetch_optional(model, &q).await
    }

    async fn insert(&self, model: &Model, row: Row) -> Result<Row, AppError> {
        let include_pk = model
            .primary_key_value(&row)
            .map(|v| !is_unset_key(v))
            .unwrap_or(false);
        let q = insert(model, &row, include_pk, self.schema());
        self.fetch_optional(model, &q)
            .await
            .map_err(conflict_on_unique_violation)?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, model: &Model, pk: &Value, changes: Row) -> Result<Row, AppError> {
        let q = update(model, pk, &changes, self.schema());
        self.fetch_optional(model, &q)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", model.name(), pk)))
    }

    async fn delete(&self, model: &Model, pk: &Value) -> Result<bool, AppError> {
        let mut q = delete(model, self.schema());
        q.params.push(pk.clone());
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let deleted = query.fetch_optional(&self.pool).await?;
        Ok(deleted.is_some())
    }
}

fn conflict_on_unique_violation(e: AppError) -> AppError {
    match &e {
        AppError::Db(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
            AppError::Conflict(db.message().to_string())
        }
        _ => e,
    }
}

fn row_to_row(model: &Model, row: &PgRow) -> Row {
    model
        .columns()
        .iter()
        .map(|c| (c.storage_name.clone(), cell_to_value(row, &c.storage_name, c.type_tag)))
        .collect()
}

/// Decode one cell guided by the column type, falling back to text.
fn cell_to_value(row: &PgRow, name: &str, type_tag: ColumnType) -> Value {
    use sqlx::Row as _;
    match type_tag {
        ColumnType::Bool => {
            if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
                return Value::Bool(b);
            }
        }
        ColumnType::Integer => {
            if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
                return Value::Number(n.into());
            }
            if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
                return Value::Number(n.into());
            }
            if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
                return Value::Number(n.into());
            }
        }
        ColumnType::Float => {
            if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
                if let Some(n) = serde_json::Number::from_f64(n) {
                    return Value::Number(n);
                }
            }
        }
        ColumnType::Uuid => {
            if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
                return Value::String(u.to_string());
            }
        }
        ColumnType::DateTime => {
            if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
                return Value::String(d.to_rfc3339());
            }
            if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
                return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
            }
        }
        ColumnType::Date => {
            if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
                return Value::String(d.format("%Y-%m-%d").to_string());
            }
        }
        ColumnType::Json => {
            if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
                return j;
            }
        }
        ColumnType::Text => {}
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}

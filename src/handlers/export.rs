//! CSV export of the current list query.

use crate::error::AppError;
use crate::extractors::QueryPairs;
use crate::view::ModelViewState;
use axum::{
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use serde_json::Value;
use std::sync::Arc;

fn cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rows matching the list filters and sort, capped at the view's export limit, labels as header.
pub async fn csv(
    Extension(view): Extension<Arc<ModelViewState>>,
    QueryPairs(params): QueryPairs,
) -> Result<Response, AppError> {
    view.require(view.config.can_export, "export")?;
    let mut query = view.query(&params);
    query.page = 0;
    query.page_size = view.config.export_max_rows.max(1);
    let (total, rows) = view.storage.list(&view.model, &query).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let storage_err = |e: csv::Error| AppError::Storage(format!("csv: {}", e));
    writer
        .write_record(view.export_columns.iter().map(|c| c.label.as_str()))
        .map_err(storage_err)?;
    for row in &rows {
        let record: Vec<String> = view
            .export_columns
            .iter()
            .map(|c| row.get(&c.storage_name).map(cell).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(storage_err)?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| AppError::Storage(format!("csv: {}", e)))?;

    let filename = format!("{}_{}.csv", view.endpoint, chrono::Utc::now().format("%Y%m%d_%H%M%S"));
    tracing::info!(view = %view.name, rows = rows.len(), total, "export");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response())
}

//! Inline edit from the list view. Plain-text responses.

use crate::error::AppError;
use crate::extractors::FormPairs;
use crate::model::Row;
use crate::response::plain_text;
use crate::validation::RequestValidator;
use crate::view::ModelViewState;
use axum::{
    http::{Method, StatusCode},
    response::Response,
    Extension,
};
use std::sync::Arc;

pub const PK_FIELD: &str = "list_form_pk";
pub const SAVED: &str = "Record was successfully saved.";

/// Update the editable columns of one row.
///
/// 404 when the view has no editable column, 405 unless POST, 400 without `list_form_pk`
/// or when no editable column was submitted. Submitted columns outside the editable list are
/// not applied and are named in the response; 500 when storage fails.
pub async fn update(method: Method, Extension(view): Extension<Arc<ModelViewState>>, form: FormPairs) -> Response {
    if view.editable.is_empty() {
        return plain_text(StatusCode::NOT_FOUND, "Inline editing is not enabled.");
    }
    if method != Method::POST {
        return plain_text(StatusCode::METHOD_NOT_ALLOWED, AppError::MethodNotAllowed.to_string());
    }
    let Some(raw_pk) = form.get(PK_FIELD) else {
        return plain_text(StatusCode::BAD_REQUEST, format!("Missing '{}'.", PK_FIELD));
    };
    let pk = match view.parse_pk(raw_pk) {
        Ok(pk) => pk,
        Err(e) => return plain_text(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut changes = Row::new();
    let mut rejected = Vec::new();
    for (name, raw) in form.0.iter().filter(|(k, _)| k != PK_FIELD) {
        if !view.is_editable(name) {
            rejected.push(AppError::ColumnNotEditable(name.clone()).to_string());
            continue;
        }
        let Some(column) = view.model.column(name) else {
            continue;
        };
        match column.parse_value(raw) {
            Ok(v) => {
                changes.insert(name.clone(), v);
            }
            Err(msg) => return plain_text(StatusCode::BAD_REQUEST, msg),
        }
    }
    if changes.is_empty() {
        let mut msg = String::from("No editable column submitted.");
        for r in &rejected {
            msg.push('\n');
            msg.push_str(r);
        }
        return plain_text(StatusCode::BAD_REQUEST, msg);
    }
    if let Err(e) = RequestValidator::validate_partial(&changes, &view.config.validation) {
        return plain_text(StatusCode::BAD_REQUEST, e.to_string());
    }

    match view.storage.update(&view.model, &pk, changes).await {
        Ok(_) => {
            tracing::info!(view = %view.name, pk = %raw_pk, rejected = rejected.len(), "inline update");
            let mut msg = String::from(SAVED);
            for r in &rejected {
                msg.push('\n');
                msg.push_str(r);
            }
            plain_text(StatusCode::OK, msg)
        }
        Err(AppError::NotFound(_)) => plain_text(StatusCode::NOT_FOUND, "Record does not exist."),
        Err(e) => {
            tracing::error!(view = %view.name, pk = %raw_pk, error = %e, "inline update failed");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update record.")
        }
    }
}

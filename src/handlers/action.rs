//! Bulk actions over selected rows: confirm, then execute.

use crate::error::AppError;
use crate::extractors::FormPairs;
use crate::state::AdminState;
use crate::view::{ActionView, ModelViewState};
use axum::{extract::State, response::Redirect, Extension, Json};
use std::sync::Arc;

const ACTION_DELETE: &str = "delete";

/// The requested action and selected row ids, after permission checks.
fn selection(view: &ModelViewState, form: &FormPairs) -> Result<(String, Vec<String>), AppError> {
    let action = form
        .get("action")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing 'action'".into()))?;
    match action {
        ACTION_DELETE => view.require(view.config.can_delete, "delete")?,
        other => return Err(AppError::BadRequest(format!("unknown action '{}'", other))),
    }
    let ids: Vec<String> = form
        .get_all("rowid")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return Err(AppError::BadRequest("no rows selected".into()));
    }
    Ok((action.to_string(), ids))
}

pub async fn confirm(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    form: FormPairs,
) -> Result<Json<ActionView>, AppError> {
    let (action, ids) = selection(&view, &form)?;
    for id in &ids {
        view.parse_pk(id)?;
    }
    let no_args: [&str; 0] = [];
    Ok(Json(ActionView {
        message: format!("Are you sure you want to {} {} {} record(s)?", action, ids.len(), view.name),
        execute_url: view.url(&admin, ".execute_view", &no_args)?,
        cancel_url: view.url(&admin, ".index_view", &no_args)?,
        action,
        ids,
    }))
}

pub async fn execute(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    form: FormPairs,
) -> Result<Redirect, AppError> {
    let (action, ids) = selection(&view, &form)?;
    let keys = ids.iter().map(|id| view.parse_pk(id)).collect::<Result<Vec<_>, _>>()?;
    let mut affected = 0usize;
    for pk in &keys {
        if view.storage.delete(&view.model, pk).await? {
            affected += 1;
        }
    }
    tracing::info!(view = %view.name, %action, requested = keys.len(), affected, "bulk action executed");
    let no_args: [&str; 0] = [];
    Ok(Redirect::to(&view.url(&admin, ".index_view", &no_args)?))
}

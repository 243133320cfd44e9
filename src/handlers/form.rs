//! Create, edit, details and delete endpoints of a model view.

use crate::error::AppError;
use crate::extractors::{FormPairs, QueryPairs};
use crate::handlers::list::link;
use crate::model::{Column, ColumnType, Row};
use crate::state::AdminState;
use crate::validation::RequestValidator;
use crate::view::{pk_param, DetailField, DetailsView, FormField, FormView, ModelViewState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

const ADD_ANOTHER: &str = "_add_another";
const CONTINUE_EDITING: &str = "_continue_editing";

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Primary key from the `id` query parameter.
fn pk_from_query(view: &ModelViewState, params: &[(String, String)]) -> Result<Value, AppError> {
    let raw = param(params, "id").ok_or_else(|| AppError::BadRequest("missing 'id' parameter".into()))?;
    view.parse_pk(raw)
}

async fn load_row(view: &ModelViewState, pk: &Value) -> Result<Row, AppError> {
    view.storage
        .get(&view.model, pk)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", view.name, pk_param(pk))))
}

fn form_view(
    view: &ModelViewState,
    title: String,
    action_url: String,
    cancel_url: String,
    values: &Row,
    errors: &HashMap<String, String>,
) -> FormView {
    let fields = view
        .form_columns
        .iter()
        .map(|c| FormField {
            name: c.storage_name.clone(),
            label: c.label.clone(),
            type_tag: c.type_tag,
            required: c.required,
            value: values.get(&c.storage_name).cloned().unwrap_or_else(|| c.default_value()),
            choices: c.choices.clone(),
            error: errors.get(&c.storage_name).cloned(),
        })
        .collect();
    FormView {
        title,
        action_url,
        cancel_url,
        fields,
    }
}

/// Parse submitted form columns into typed values. Unchecked checkboxes are absent and read as false.
/// On failure the raw submitted values are returned alongside per-column messages.
fn parse_submission(view: &ModelViewState, form: &FormPairs) -> Result<Row, (Row, HashMap<String, String>)> {
    let mut row = Row::new();
    let mut raw = Row::new();
    let mut errors = HashMap::new();
    for c in &view.form_columns {
        let submitted = form.get(&c.storage_name);
        raw.insert(
            c.storage_name.clone(),
            submitted.map_or_else(|| c.default_value(), |s| Value::String(s.to_string())),
        );
        match parse_column(c, submitted) {
            Ok(v) => {
                row.insert(c.storage_name.clone(), v);
            }
            Err(msg) => {
                errors.insert(c.storage_name.clone(), msg);
            }
        }
    }
    for (col, msg) in RequestValidator::errors(&row, &view.config.validation) {
        errors.entry(col).or_insert(msg);
    }
    if errors.is_empty() {
        Ok(row)
    } else {
        Err((raw, errors))
    }
}

fn parse_column(c: &Column, submitted: Option<&str>) -> Result<Value, String> {
    if c.type_tag == ColumnType::Bool && submitted.is_none() {
        return Ok(Value::Bool(false));
    }
    let s = submitted.unwrap_or("");
    if c.required && s.trim().is_empty() && c.type_tag != ColumnType::Bool {
        return Err(format!("{} is required", c.label));
    }
    c.parse_value(s)
}

/// Where to go after a successful save.
fn after_save(
    view: &ModelViewState,
    admin: &AdminState,
    form: &FormPairs,
    pk: &Value,
) -> Result<Redirect, AppError> {
    let no_args: [&str; 0] = [];
    let url = if form.contains(ADD_ANOTHER) {
        view.url(admin, ".create_view", &no_args)?
    } else if form.contains(CONTINUE_EDITING) {
        view.url(admin, ".edit_view", &["id".to_string(), pk_param(pk)])?
    } else {
        view.url(admin, ".index_view", &no_args)?
    };
    Ok(Redirect::to(&url))
}

pub async fn create_form(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
) -> Result<Json<FormView>, AppError> {
    view.require(view.config.can_create, "create")?;
    let no_args: [&str; 0] = [];
    Ok(Json(form_view(
        &view,
        format!("Create {}", view.name),
        view.url(&admin, ".create_view", &no_args)?,
        view.url(&admin, ".index_view", &no_args)?,
        &view.model.empty_row(),
        &HashMap::new(),
    )))
}

pub async fn create_submit(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    form: FormPairs,
) -> Result<Response, AppError> {
    view.require(view.config.can_create, "create")?;
    let row = match parse_submission(&view, &form) {
        Ok(row) => row,
        Err((raw, errors)) => {
            let no_args: [&str; 0] = [];
            let body = form_view(
                &view,
                format!("Create {}", view.name),
                view.url(&admin, ".create_view", &no_args)?,
                view.url(&admin, ".index_view", &no_args)?,
                &raw,
                &errors,
            );
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response());
        }
    };
    let mut full = view.model.empty_row();
    full.extend(row);
    let created = view.storage.insert(&view.model, full).await?;
    let pk = view.model.primary_key_value(&created)?.clone();
    tracing::info!(view = %view.name, pk = %pk_param(&pk), "record created");
    Ok(after_save(&view, &admin, &form, &pk)?.into_response())
}

pub async fn edit_form(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    QueryPairs(params): QueryPairs,
) -> Result<Json<FormView>, AppError> {
    view.require(view.config.can_edit, "edit")?;
    let pk = pk_from_query(&view, &params)?;
    let row = load_row(&view, &pk).await?;
    let no_args: [&str; 0] = [];
    Ok(Json(form_view(
        &view,
        format!("Edit {}", view.name),
        view.url(&admin, ".edit_view", &["id".to_string(), pk_param(&pk)])?,
        view.url(&admin, ".index_view", &no_args)?,
        &row,
        &HashMap::new(),
    )))
}

pub async fn edit_submit(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    QueryPairs(params): QueryPairs,
    form: FormPairs,
) -> Result<Response, AppError> {
    view.require(view.config.can_edit, "edit")?;
    let pk = pk_from_query(&view, &params)?;
    let changes = match parse_submission(&view, &form) {
        Ok(row) => row,
        Err((raw, errors)) => {
            let no_args: [&str; 0] = [];
            let body = form_view(
                &view,
                format!("Edit {}", view.name),
                view.url(&admin, ".edit_view", &["id".to_string(), pk_param(&pk)])?,
                view.url(&admin, ".index_view", &no_args)?,
                &raw,
                &errors,
            );
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response());
        }
    };
    view.storage.update(&view.model, &pk, changes).await?;
    tracing::info!(view = %view.name, pk = %pk_param(&pk), "record updated");
    Ok(after_save(&view, &admin, &form, &pk)?.into_response())
}

pub async fn details(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    QueryPairs(params): QueryPairs,
) -> Result<Json<DetailsView>, AppError> {
    view.require(view.config.can_view_details, "details")?;
    let pk = pk_from_query(&view, &params)?;
    let row = load_row(&view, &pk).await?;
    let labels: HashMap<&str, &str> = view
        .list_columns
        .iter()
        .chain(view.form_columns.iter())
        .map(|c| (c.storage_name.as_str(), c.label.as_str()))
        .collect();
    let fields = view
        .model
        .columns()
        .iter()
        .map(|c| DetailField {
            name: c.storage_name.clone(),
            label: labels.get(c.storage_name.as_str()).copied().unwrap_or(&c.label).to_string(),
            value: row.get(&c.storage_name).cloned().unwrap_or(Value::Null),
        })
        .collect();
    let id = ["id".to_string(), pk_param(&pk)];
    let no_args: [&str; 0] = [];
    Ok(Json(DetailsView {
        title: view.name.clone(),
        list_url: view.url(&admin, ".index_view", &no_args)?,
        edit_url: link(view.config.can_edit, || view.url(&admin, ".edit_view", &id))?,
        delete_url: link(view.config.can_delete, || view.url(&admin, ".delete_view", &id))?,
        pk,
        fields,
    }))
}

/// Delete one record. The key comes from the form body or, failing that, the query string.
pub async fn delete(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    QueryPairs(params): QueryPairs,
    form: FormPairs,
) -> Result<Redirect, AppError> {
    view.require(view.config.can_delete, "delete")?;
    let raw = form
        .get("id")
        .or_else(|| param(&params, "id"))
        .ok_or_else(|| AppError::BadRequest("missing 'id' parameter".into()))?;
    let pk = view.parse_pk(raw)?;
    if !view.storage.delete(&view.model, &pk).await? {
        return Err(AppError::NotFound(format!("{} {}", view.name, pk_param(&pk))));
    }
    tracing::info!(view = %view.name, pk = %pk_param(&pk), "record deleted");
    let no_args: [&str; 0] = [];
    Ok(Redirect::to(&view.url(&admin, ".index_view", &no_args)?))
}

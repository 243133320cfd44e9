//! Model views: one record type exposed as a fixed subtree of admin endpoints.

pub mod models;

pub use models::*;

use crate::blueprint::Blueprint;
use crate::config::{validate_view_config, ModelViewConfig};
use crate::error::{AppError, ConfigError};
use crate::handlers::{action, ajax, export, form, list};
use crate::model::{Column, Model, ModelRegistry, Record};
use crate::query::{Query, QueryOptions};
use crate::state::AdminState;
use crate::storage::Storage;
use axum::routing::{any, get, post};
use axum::Extension;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Everything a model view's handlers need, shared by every route of the view.
pub struct ModelViewState {
    pub name: String,
    pub endpoint: String,
    pub category: Option<String>,
    pub model: Arc<Model>,
    pub config: ModelViewConfig,
    pub storage: Arc<dyn Storage>,
    pub query_options: Arc<QueryOptions>,
    /// Visible list columns, labels overridden.
    pub list_columns: Vec<Column>,
    pub form_columns: Vec<Column>,
    pub export_columns: Vec<Column>,
    pub editable: HashSet<String>,
}

impl ModelViewState {
    /// Parse request parameters against this view's query options.
    pub fn query(&self, params: &[(String, String)]) -> Query {
        Query::from_request(params, Arc::clone(&self.query_options))
    }

    /// Typed primary-key value from its request string.
    pub fn parse_pk(&self, raw: &str) -> Result<Value, AppError> {
        let pk = self.model.primary_key();
        pk.type_tag
            .parse_value(raw)
            .map_err(|e| AppError::BadRequest(format!("invalid {}: {}", pk.storage_name, e)))
    }

    /// URL of an endpoint of this view (".edit_view") or any absolute endpoint.
    pub fn url<A: AsRef<str>>(&self, admin: &AdminState, endpoint: &str, args: &[A]) -> Result<String, AppError> {
        Ok(admin.view_url(&self.endpoint, endpoint, args)?)
    }

    pub fn require(&self, allowed: bool, what: &str) -> Result<(), AppError> {
        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("{} is disabled for {}", what, self.name)))
        }
    }

    pub fn is_editable(&self, column: &str) -> bool {
        self.editable.contains(column)
    }
}

impl std::fmt::Debug for ModelViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelViewState")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model.name())
            .finish()
    }
}

/// Request-parameter string for a primary-key value.
pub fn pk_param(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug)]
pub struct ModelView {
    state: Arc<ModelViewState>,
    blueprint: Blueprint<AdminState>,
}

impl ModelView {
    /// Build the view for `T`, memoizing its model in `registry`, and wire its endpoint subtree.
    pub fn new<T: Record>(
        registry: &ModelRegistry,
        storage: Arc<dyn Storage>,
        config: ModelViewConfig,
    ) -> Result<Self, ConfigError> {
        let model = registry.get_or_build::<T>()?;
        Self::with_model(model, storage, config)
    }

    pub fn with_model(model: Arc<Model>, storage: Arc<dyn Storage>, config: ModelViewConfig) -> Result<Self, ConfigError> {
        validate_view_config(&model, &config)?;

        let name = config.name.clone().unwrap_or_else(|| model.name().to_string());
        let endpoint = config.endpoint.clone().unwrap_or_else(|| model.name().to_lowercase());
        let url = config.url.clone().unwrap_or_else(|| format!("/{}", endpoint));

        let labelled = |names: &[String], fallback: Vec<&Column>| -> Vec<Column> {
            let picked: Vec<&Column> = if names.is_empty() {
                fallback
            } else {
                names.iter().filter_map(|n| model.column(n)).collect()
            };
            picked
                .into_iter()
                .map(|c| {
                    let mut c = c.clone();
                    if let Some(label) = config.column_labels.get(&c.storage_name) {
                        c.label = label.clone();
                    }
                    c
                })
                .collect()
        };

        let list_columns = labelled(&config.column_list, model.columns_excluding_relationships());
        let form_columns = labelled(
            &config.form_columns,
            model
                .columns()
                .iter()
                .filter(|c| !c.is_primary_key && !c.is_relationship)
                .collect(),
        );
        let export_columns = labelled(&config.column_export_list, list_columns.iter().collect());

        let sortable: HashSet<String> = match &config.column_sortable_list {
            Some(names) => names.iter().cloned().collect(),
            None => model
                .columns_excluding_relationships()
                .into_iter()
                .map(|c| c.storage_name.clone())
                .collect(),
        };
        let query_options = Arc::new(QueryOptions {
            columns: list_columns.iter().map(|c| c.storage_name.clone()).collect(),
            sortable,
            searchable: config.column_searchable_list.clone(),
            page_size: config.page_size,
            can_set_page_size: config.can_set_page_size,
            max_page_size: config.max_page_size,
        });

        let state = Arc::new(ModelViewState {
            editable: config.column_editable_list.iter().cloned().collect(),
            category: config.category.clone(),
            name: name.clone(),
            endpoint: endpoint.clone(),
            model,
            config,
            storage,
            query_options,
            list_columns,
            form_columns,
            export_columns,
        });

        let blueprint = Self::wire(&state, endpoint, url, name);
        tracing::debug!(view = %state.name, endpoint = %state.endpoint, "model view built");
        Ok(ModelView { state, blueprint })
    }

    fn wire(state: &Arc<ModelViewState>, endpoint: String, url: String, name: String) -> Blueprint<AdminState> {
        let ext = Extension(Arc::clone(state));
        Blueprint::new(endpoint, url)
            .with_name(name)
            .with_child(Blueprint::new("index", "/").with_handler(get(list::index).layer(ext.clone())))
            .with_child(Blueprint::new("index_view", "/"))
            .with_child(
                Blueprint::new("create_view", "/new")
                    .with_handler(get(form::create_form).post(form::create_submit).layer(ext.clone())),
            )
            .with_child(
                Blueprint::new("details_view", "/details").with_handler(get(form::details).layer(ext.clone())),
            )
            .with_child(
                Blueprint::new("edit_view", "/edit")
                    .with_handler(get(form::edit_form).post(form::edit_submit).layer(ext.clone())),
            )
            .with_child(Blueprint::new("delete_view", "/delete").with_handler(post(form::delete).layer(ext.clone())))
            .with_child(Blueprint::new("action_view", "/action").with_handler(post(action::confirm).layer(ext.clone())))
            .with_child(
                Blueprint::new("execute_view", "/execute").with_handler(post(action::execute).layer(ext.clone())),
            )
            .with_child(Blueprint::new("export", "/export").with_handler(get(export::csv).layer(ext.clone())))
            .with_child(Blueprint::new("ajax_update", "/ajax/update").with_handler(any(ajax::update).layer(ext)))
    }

    pub fn state(&self) -> &Arc<ModelViewState> {
        &self.state
    }

    pub fn blueprint(&self) -> &Blueprint<AdminState> {
        &self.blueprint
    }

    pub fn endpoint(&self) -> &str {
        &self.state.endpoint
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.state.model
    }

    pub fn into_blueprint(self) -> Blueprint<AdminState> {
        self.blueprint
    }
}

//! Model view configuration. Deserializable so views can be configured from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

/// How one model is presented. Column references use storage names.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelViewConfig {
    /// Display name; defaults to the model's type name.
    #[serde(default)]
    pub name: Option<String>,
    /// Endpoint name; defaults to the lowercased type name.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Path under the admin root; defaults to "/" + endpoint.
    #[serde(default)]
    pub url: Option<String>,
    /// Menu category; the view is listed under it when set.
    #[serde(default)]
    pub category: Option<String>,
    /// Visible list columns. Empty means every non-relationship column.
    #[serde(default)]
    pub column_list: Vec<String>,
    /// Sortable columns. `None` means every non-relationship column.
    #[serde(default)]
    pub column_sortable_list: Option<Vec<String>>,
    /// Columns editable inline from the list view.
    #[serde(default)]
    pub column_editable_list: Vec<String>,
    #[serde(default)]
    pub column_searchable_list: Vec<String>,
    /// Exported columns. Empty means the list columns.
    #[serde(default)]
    pub column_export_list: Vec<String>,
    /// Columns on create/edit forms. Empty means every non-key, non-relationship column.
    #[serde(default)]
    pub form_columns: Vec<String>,
    #[serde(default)]
    pub column_labels: HashMap<String, String>,
    #[serde(default = "default_true")]
    pub can_create: bool,
    #[serde(default = "default_true")]
    pub can_edit: bool,
    #[serde(default = "default_true")]
    pub can_delete: bool,
    #[serde(default = "default_true")]
    pub can_view_details: bool,
    #[serde(default)]
    pub can_export: bool,
    #[serde(default)]
    pub can_set_page_size: bool,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Row cap for export.
    #[serde(default = "default_export_max_rows")]
    pub export_max_rows: u32,
    #[serde(default)]
    pub validation: HashMap<String, ValidationRule>,
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    500
}

fn default_export_max_rows() -> u32 {
    10_000
}

impl Default for ModelViewConfig {
    fn default() -> Self {
        ModelViewConfig {
            name: None,
            endpoint: None,
            url: None,
            category: None,
            column_list: Vec::new(),
            column_sortable_list: None,
            column_editable_list: Vec::new(),
            column_searchable_list: Vec::new(),
            column_export_list: Vec::new(),
            form_columns: Vec::new(),
            column_labels: HashMap::new(),
            can_create: true,
            can_edit: true,
            can_delete: true,
            can_view_details: true,
            can_export: false,
            can_set_page_size: false,
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            export_max_rows: default_export_max_rows(),
            validation: HashMap::new(),
        }
    }
}

impl ModelViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn column_list<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_list = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn column_sortable_list<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_sortable_list = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn column_editable_list<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_editable_list = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn column_searchable_list<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_searchable_list = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn column_export_list<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_export_list = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn form_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.form_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn column_label(mut self, column: impl Into<String>, label: impl Into<String>) -> Self {
        self.column_labels.insert(column.into(), label.into());
        self
    }

    pub fn can_create(mut self, allowed: bool) -> Self {
        self.can_create = allowed;
        self
    }

    pub fn can_edit(mut self, allowed: bool) -> Self {
        self.can_edit = allowed;
        self
    }

    pub fn can_delete(mut self, allowed: bool) -> Self {
        self.can_delete = allowed;
        self
    }

    pub fn can_view_details(mut self, allowed: bool) -> Self {
        self.can_view_details = allowed;
        self
    }

    pub fn can_export(mut self, allowed: bool) -> Self {
        self.can_export = allowed;
        self
    }

    pub fn can_set_page_size(mut self, allowed: bool) -> Self {
        self.can_set_page_size = allowed;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn export_max_rows(mut self, rows: u32) -> Self {
        self.export_max_rows = rows;
        self
    }

    pub fn validation(mut self, column: impl Into<String>, rule: ValidationRule) -> Self {
        self.validation.insert(column.into(), rule);
        self
    }
}

//! Typed view-models emitted by the admin handlers as JSON.

use crate::model::{Choice, ColumnType, Row};
use crate::state::MenuEntry;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ListView {
    pub title: String,
    pub columns: Vec<ListColumn>,
    pub rows: Vec<ListRow>,
    /// One-based current page.
    pub page: u32,
    pub num_pages: u32,
    pub total: u64,
    pub page_size: u32,
    pub search: Option<String>,
    pub pager: Pager,
    pub actions: ListActions,
}

#[derive(Debug, Serialize)]
pub struct ListColumn {
    pub name: String,
    pub label: String,
    pub editable: bool,
    /// Link that sorts by this column, toggling direction when it is the active sort.
    pub sort_url: Option<String>,
    /// "asc" or "desc" when this column is the active sort.
    pub sort_direction: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ListRow {
    pub pk: Value,
    pub values: Row,
    pub view_url: Option<String>,
    pub edit_url: Option<String>,
    pub delete_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageLink {
    pub number: u32,
    pub url: String,
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct Pager {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub pages: Vec<PageLink>,
}

#[derive(Debug, Default, Serialize)]
pub struct ListActions {
    pub create_url: Option<String>,
    pub export_url: Option<String>,
    /// Bulk action confirmation endpoint (POST).
    pub action_url: Option<String>,
    /// Inline edit endpoint (POST), present when some column is editable.
    pub ajax_update_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub type_tag: ColumnType,
    pub required: bool,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub title: String,
    /// POST target of the form.
    pub action_url: String,
    pub cancel_url: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Serialize)]
pub struct DetailField {
    pub name: String,
    pub label: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct DetailsView {
    pub title: String,
    pub pk: Value,
    pub fields: Vec<DetailField>,
    pub list_url: String,
    pub edit_url: Option<String>,
    pub delete_url: Option<String>,
}

/// Confirmation step of a bulk action.
#[derive(Debug, Serialize)]
pub struct ActionView {
    pub action: String,
    pub message: String,
    pub ids: Vec<String>,
    pub execute_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub name: String,
    pub menu: Vec<MenuEntry>,
}

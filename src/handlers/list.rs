//! List view: one page of rows with sort, pager and row action links.

use crate::blueprint::flatten_pairs;
use crate::error::AppError;
use crate::extractors::QueryPairs;
use crate::query::Query;
use crate::state::AdminState;
use crate::view::{pk_param, ListActions, ListColumn, ListRow, ListView, ModelViewState, PageLink, Pager};
use axum::{extract::State, Extension, Json};
use std::sync::Arc;

/// Pages shown on each side of the current one.
const PAGER_WINDOW: u32 = 3;

pub async fn index(
    State(admin): State<AdminState>,
    Extension(view): Extension<Arc<ModelViewState>>,
    QueryPairs(params): QueryPairs,
) -> Result<Json<ListView>, AppError> {
    let mut query = view.query(&params);
    let (total, rows) = view.storage.list(&view.model, &query).await?;
    query.set_total(total);
    tracing::debug!(view = %view.name, total, page = query.page, "list");

    let list_url = |q: &Query| view.url(&admin, ".index_view", &flatten_pairs(&q.to_args()));

    let columns = view
        .list_columns
        .iter()
        .map(|c| {
            let name = c.storage_name.as_str();
            let active = query.sort_column.as_deref() == Some(name);
            let sort_url = if query.options().sortable.contains(name) {
                let desc = active && !query.sort_desc;
                Some(list_url(&query.with_sort(name, desc))?)
            } else {
                None
            };
            Ok(ListColumn {
                name: c.storage_name.clone(),
                label: c.label.clone(),
                editable: view.is_editable(name),
                sort_url,
                sort_direction: active.then_some(if query.sort_desc { "desc" } else { "asc" }),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let mut list_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let pk = view.model.primary_key_value(&row)?.clone();
        let id = ["id".to_string(), pk_param(&pk)];
        let values = view
            .list_columns
            .iter()
            .map(|c| {
                let v = row.get(&c.storage_name).cloned().unwrap_or(serde_json::Value::Null);
                (c.storage_name.clone(), v)
            })
            .collect();
        list_rows.push(ListRow {
            view_url: link(view.config.can_view_details, || view.url(&admin, ".details_view", &id))?,
            edit_url: link(view.config.can_edit, || view.url(&admin, ".edit_view", &id))?,
            delete_url: link(view.config.can_delete, || view.url(&admin, ".delete_view", &id))?,
            pk,
            values,
        });
    }

    let current = query.page;
    let last = query.num_pages.saturating_sub(1);
    let pages = (current.saturating_sub(PAGER_WINDOW)..=current.saturating_add(PAGER_WINDOW).min(last))
        .map(|p| {
            Ok(PageLink {
                number: p + 1,
                url: list_url(&query.with_page(p))?,
                current: p == current,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    let pager = Pager {
        prev: link(current > 0, || list_url(&query.with_page(current - 1)))?,
        next: link(current < last, || list_url(&query.with_page(current + 1)))?,
        pages,
    };

    let no_args: [&str; 0] = [];
    let actions = ListActions {
        create_url: link(view.config.can_create, || view.url(&admin, ".create_view", &no_args))?,
        export_url: link(view.config.can_export, || {
            view.url(&admin, ".export", &flatten_pairs(&query.to_args()))
        })?,
        action_url: link(view.config.can_delete, || view.url(&admin, ".action_view", &no_args))?,
        ajax_update_url: link(!view.editable.is_empty(), || view.url(&admin, ".ajax_update", &no_args))?,
    };

    Ok(Json(ListView {
        title: view.name.clone(),
        columns,
        rows: list_rows,
        page: query.page.saturating_add(1),
        num_pages: query.num_pages,
        total: query.total,
        page_size: query.effective_page_size(),
        search: query.search.clone(),
        pager,
        actions,
    }))
}

/// URL when `enabled`, else `None`.
pub(crate) fn link<F>(enabled: bool, make: F) -> Result<Option<String>, AppError>
where
    F: FnOnce() -> Result<String, AppError>,
{
    if enabled {
        make().map(Some)
    } else {
        Ok(None)
    }
}

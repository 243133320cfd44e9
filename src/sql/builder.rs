//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for a model.

use crate::model::{Column, Model, Row};
use crate::query::Query;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: names come from model metadata only).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(table)),
        None => quoted(table),
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its placeholder, cast to the column type.
    fn push_param(&mut self, column: &Column, v: Value) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), column.type_tag.pg_cast())
    }

    fn push_text(&mut self, v: String) -> String {
        self.params.push(Value::String(v));
        format!("${}", self.params.len())
    }
}

/// SELECT list. Floats are read back as float8 so numeric columns decode too.
fn select_column_list(model: &Model) -> String {
    model
        .columns()
        .iter()
        .map(|c| {
            let q = quoted(&c.storage_name);
            match c.type_tag {
                crate::model::ColumnType::Float => format!("{}::float8 AS {}", q, q),
                _ => q,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// ` WHERE (a::text ILIKE $n OR b::text ILIKE $n)` for the query's search term, or empty.
fn search_clause(model: &Model, query: &Query, q: &mut QueryBuf) -> String {
    let Some(term) = query.search.as_deref() else {
        return String::new();
    };
    let columns: Vec<&Column> = query
        .options()
        .searchable
        .iter()
        .filter_map(|name| model.column(name))
        .collect();
    if columns.is_empty() {
        return String::new();
    }
    let ph = q.push_text(format!("%{}%", escape_like(term)));
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{}::text ILIKE {}", quoted(&c.storage_name), ph))
        .collect();
    format!(" WHERE ({})", parts.join(" OR "))
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// One page of rows: search filter, ORDER BY the sort column (primary key when unsorted), LIMIT/OFFSET.
pub fn select_page(model: &Model, query: &Query, schema: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, model.table_name());
    let where_clause = search_clause(model, query, &mut q);
    let sort = query
        .sort_column
        .as_deref()
        .and_then(|name| model.column(name))
        .unwrap_or_else(|| model.primary_key());
    let direction = if query.sort_desc && query.sort_column.is_some() { "DESC" } else { "ASC" };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} {} LIMIT {} OFFSET {}",
        select_column_list(model),
        table,
        where_clause,
        quoted(&sort.storage_name),
        direction,
        query.effective_page_size(),
        query.offset()
    );
    q
}

/// COUNT(*) under the same search filter as [`select_page`].
pub fn count(model: &Model, query: &Query, schema: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, model.table_name());
    let where_clause = search_clause(model, query, &mut q);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", table, where_clause);
    q
}

/// SELECT by primary key. Caller binds the key as the sole param.
pub fn select_by_pk(model: &Model, schema: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = model.primary_key();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1::{}",
        select_column_list(model),
        qualified_table(schema, model.table_name()),
        quoted(&pk.storage_name),
        pk.type_tag.pg_cast()
    );
    q
}

/// INSERT every column present in `row`. The primary key is left to the database default unless `include_pk`.
pub fn insert(model: &Model, row: &Row, include_pk: bool, schema: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in model.columns() {
        if c.is_primary_key && !include_pk {
            continue;
        }
        let Some(v) = row.get(&c.storage_name) else { continue };
        placeholders.push(q.push_param(c, v.clone()));
        cols.push(quoted(&c.storage_name));
    }
    let table = qualified_table(schema, model.table_name());
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, select_column_list(model))
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            select_column_list(model)
        )
    };
    q
}

/// UPDATE by primary key: SET only the model's non-key columns present in `row`.
/// With nothing to set this degrades to a select of the row.
pub fn update(model: &Model, pk: &Value, row: &Row, schema: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, model.table_name());
    let key = model.primary_key();
    let mut sets = Vec::new();
    for c in model.columns() {
        if c.is_primary_key {
            continue;
        }
        let Some(v) = row.get(&c.storage_name) else { continue };
        let ph = q.push_param(c, v.clone());
        sets.push(format!("{} = {}", quoted(&c.storage_name), ph));
    }
    if sets.is_empty() {
        let mut select = select_by_pk(model, schema);
        select.params.push(pk.clone());
        return select;
    }
    let id_ph = q.push_param(key, pk.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        table,
        sets.join(", "),
        quoted(&key.storage_name),
        id_ph,
        select_column_list(model)
    );
    q
}

/// DELETE by primary key. Caller binds the key as the sole param.
pub fn delete(model: &Model, schema: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = model.primary_key();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1::{} RETURNING {}",
        qualified_table(schema, model.table_name()),
        quoted(&pk.storage_name),
        pk.type_tag.pg_cast(),
        quoted(&pk.storage_name)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnType, FieldSchema, Record};
    use crate::query::QueryOptions;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Serialize, Deserialize)]
    struct Ticket {
        id: i64,
        title: String,
        score: f64,
    }

    impl Record for Ticket {
        fn table_name() -> &'static str {
            "tickets"
        }

        fn describe_columns() -> Vec<FieldSchema> {
            vec![
                FieldSchema::new("id", ColumnType::Integer).primary_key(),
                FieldSchema::new("title", ColumnType::Text),
                FieldSchema::new("score", ColumnType::Float),
            ]
        }
    }

    fn options() -> Arc<QueryOptions> {
        Arc::new(QueryOptions {
            columns: vec!["id".into(), "title".into(), "score".into()],
            sortable: ["id", "title"].iter().map(|s| s.to_string()).collect(),
            searchable: vec!["title".into()],
            ..QueryOptions::default()
        })
    }

    #[test]
    fn select_page_orders_searches_and_pages() {
        let model = Model::build::<Ticket>().unwrap();
        let params = vec![
            ("sort".to_string(), "1".to_string()),
            ("desc".to_string(), "1".to_string()),
            ("page".to_string(), "3".to_string()),
            ("search".to_string(), "50%".to_string()),
        ];
        let query = Query::from_request(&params, options());
        let q = select_page(&model, &query, Some("app"));
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"title\", \"score\"::float8 AS \"score\" FROM \"app\".\"tickets\" \
             WHERE (\"title\"::text ILIKE $1) ORDER BY \"title\" DESC LIMIT 20 OFFSET 40"
        );
        assert_eq!(q.params, vec![json!("%50\\%%")]);
    }

    #[test]
    fn unsorted_page_orders_by_primary_key() {
        let model = Model::build::<Ticket>().unwrap();
        let query = Query::new(options());
        let q = select_page(&model, &query, None);
        assert!(q.sql.ends_with("FROM \"tickets\" ORDER BY \"id\" ASC LIMIT 20 OFFSET 0"));
        let c = count(&model, &query, None);
        assert_eq!(c.sql, "SELECT COUNT(*) FROM \"tickets\"");
        assert!(c.params.is_empty());
    }

    #[test]
    fn insert_skips_key_and_casts_params() {
        let model = Model::build::<Ticket>().unwrap();
        let row = model.to_row(Ticket { id: 0, title: "a".into(), score: 1.5 }).unwrap();
        let q = insert(&model, &row, false, None);
        assert!(q.sql.starts_with("INSERT INTO \"tickets\" (\"title\", \"score\") VALUES ($1::text, $2::double precision)"));
        assert_eq!(q.params, vec![json!("a"), json!(1.5)]);
    }

    #[test]
    fn update_sets_present_columns_only() {
        let model = Model::build::<Ticket>().unwrap();
        let mut row = Row::new();
        row.insert("title".into(), json!("b"));
        row.insert("id".into(), json!(9));
        let q = update(&model, &json!(7), &row, None);
        assert!(q.sql.starts_with("UPDATE \"tickets\" SET \"title\" = $1::text WHERE \"id\" = $2::bigint"));
        assert_eq!(q.params, vec![json!("b"), json!(7)]);
    }

    #[test]
    fn empty_update_selects_row() {
        let model = Model::build::<Ticket>().unwrap();
        let q = update(&model, &json!(7), &Row::new(), None);
        assert!(q.sql.starts_with("SELECT "));
        assert_eq!(q.params, vec![json!(7)]);
    }
}

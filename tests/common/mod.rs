#![allow(dead_code)]

use architect_admin::{Admin, AdminSettings, ColumnType, FieldSchema, MemoryStorage, ModelViewConfig, Record, Row};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub views: i64,
    pub draft: bool,
    pub tags: Vec<String>,
}

impl Record for Post {
    fn table_name() -> &'static str {
        "posts"
    }

    fn describe_columns() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("id", ColumnType::Integer).primary_key(),
            FieldSchema::new("title", ColumnType::Text),
            FieldSchema::new("views", ColumnType::Integer),
            FieldSchema::new("draft", ColumnType::Bool),
            FieldSchema::new("tags", ColumnType::Json).relationship(),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZenOfScreaming {
    pub user_id: String,
    pub display_name: Option<String>,
}

impl Record for ZenOfScreaming {
    fn table_name() -> &'static str {
        "zen"
    }

    fn describe_columns() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("userId", ColumnType::Uuid).primary_key(),
            FieldSchema::new("displayName", ColumnType::Text).nullable(),
        ]
    }
}

pub fn post(id: i64, title: &str, views: i64) -> Post {
    Post {
        id,
        title: title.to_string(),
        views,
        draft: false,
        tags: Vec::new(),
    }
}

/// Admin at /admin with one post view over seeded memory storage.
pub fn posts_admin(config: ModelViewConfig, posts: Vec<Post>) -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let mut admin = Admin::new(AdminSettings::default());
    let model = admin.registry().get_or_build::<Post>().unwrap();
    let rows: Vec<Row> = posts.iter().map(|p| model.to_row(p).unwrap()).collect();
    storage.seed(&model, rows);
    admin.add_model::<Post>(storage.clone(), config).unwrap();
    (admin.into_router().unwrap(), storage)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub disposition: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(router: &Router, method: Method, uri: &str, form: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };
    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let header_str = |name| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let status = response.status();
    let location = header_str(header::LOCATION);
    let content_type = header_str(header::CONTENT_TYPE);
    let disposition = header_str(header::CONTENT_DISPOSITION);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        location,
        content_type,
        disposition,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri, None).await
}

pub async fn post_form(router: &Router, uri: &str, form: &str) -> TestResponse {
    send(router, Method::POST, uri, Some(form)).await
}

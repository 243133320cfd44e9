//! Demo admin: posts and users under /admin.
//!
//! Run from repo root: `cargo run -p admin-demo`
//! With `DATABASE_URL` set the models are stored in PostgreSQL (tables `posts` and `users`
//! must exist); otherwise an in-memory store seeded with a few rows is used.

use architect_admin::{
    describe_from_sample, init_tracing, Admin, AdminSettings, Choice, ColumnType, FieldSchema, MemoryStorage,
    MenuItem, ModelViewConfig, PgStorage, Record, Storage, ValidationRule,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Post {
    id: i64,
    title: String,
    body: String,
    status: String,
    views: i64,
    published_at: Option<String>,
}

impl Record for Post {
    fn table_name() -> &'static str {
        "posts"
    }

    fn describe_columns() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("id", ColumnType::Integer).primary_key(),
            FieldSchema::new("title", ColumnType::Text),
            FieldSchema::new("body", ColumnType::Text),
            FieldSchema::new("status", ColumnType::Text).choices(vec![
                Choice::new("draft", "Draft"),
                Choice::new("published", "Published"),
            ]),
            FieldSchema::new("views", ColumnType::Integer),
            FieldSchema::new("published_at", ColumnType::DateTime).nullable(),
        ]
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    user_id: String,
    display_name: String,
    email: String,
    is_admin: bool,
}

impl Record for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn describe_columns() -> Vec<FieldSchema> {
        describe_from_sample(&User::default(), "userId")
    }
}

fn seed(storage: &MemoryStorage, admin: &Admin) -> Result<(), Box<dyn std::error::Error>> {
    let posts = admin.registry().get_or_build::<Post>()?;
    let rows = (1..=45)
        .map(|i| {
            posts.to_row(Post {
                id: i,
                title: format!("Post number {}", i),
                body: "Lorem ipsum".into(),
                status: if i % 3 == 0 { "draft" } else { "published" }.into(),
                views: i * 7 % 100,
                published_at: None,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    storage.seed(&posts, rows);

    let users = admin.registry().get_or_build::<User>()?;
    let alice = users.to_row(User {
        user_id: "7d5e8a8e-3f1c-4a57-9d7e-1d2f3a4b5c6d".into(),
        display_name: "Alice".into(),
        email: "alice@example.com".into(),
        is_admin: true,
    })?;
    storage.seed(&users, [alice]);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("architect_admin=info,admin_demo=info");

    let settings = AdminSettings::from_env()?;
    let mut admin = Admin::new(settings);

    let storage: Arc<dyn Storage> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            tracing::info!("using PostgreSQL storage");
            let storage = PgStorage::new(pool);
            match std::env::var("DATABASE_SCHEMA") {
                Ok(schema) => Arc::new(storage.with_schema(schema)),
                Err(_) => Arc::new(storage),
            }
        }
        Err(_) => {
            let memory = MemoryStorage::new();
            seed(&memory, &admin)?;
            tracing::info!("using in-memory storage");
            Arc::new(memory)
        }
    };

    admin.add_model::<Post>(
        Arc::clone(&storage),
        ModelViewConfig::new()
            .column_list(["id", "title", "status", "views"])
            .column_editable_list(["title", "status"])
            .column_searchable_list(["title", "body"])
            .can_export(true)
            .can_set_page_size(true)
            .validation(
                "title",
                ValidationRule {
                    required: Some(true),
                    max_length: Some(120),
                    ..ValidationRule::default()
                },
            ),
    )?;
    admin.add_model::<User>(
        Arc::clone(&storage),
        ModelViewConfig::new()
            .category("Accounts")
            .column_label("is_admin", "Administrator")
            .column_searchable_list(["display_name", "email"])
            .validation(
                "email",
                ValidationRule {
                    format: Some("email".into()),
                    ..ValidationRule::default()
                },
            ),
    )?;
    admin.add_menu_item(MenuItem::link("Docs", "https://docs.rs/axum"));

    let app = admin.into_router()?;
    let bind = std::env::var("ADMIN_BIND").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("admin demo listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

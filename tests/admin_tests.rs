mod common;

use architect_admin::{
    Admin, AdminSettings, AdminState, Blueprint, ConfigError, MemoryStorage, MenuItem, ModelViewConfig,
};
use axum::http::StatusCode;
use axum::routing::get;
use common::{get as get_uri, post_form, Post, ZenOfScreaming};
use serde_json::json;
use std::sync::Arc;

const NO_ARGS: [&str; 0] = [];

fn admin_with_posts(settings: AdminSettings) -> Admin {
    let mut admin = Admin::new(settings);
    admin
        .add_model::<Post>(Arc::new(MemoryStorage::new()), ModelViewConfig::new())
        .unwrap();
    admin
}

#[test]
fn settings_defaults() {
    let settings = AdminSettings::default();
    assert_eq!(settings.name, "Admin");
    assert_eq!(settings.endpoint, "admin");
    assert_eq!(settings.url_prefix, "/admin");
    assert!(settings.static_dir.is_none());
    assert_eq!(settings.max_body_bytes, 2 * 1024 * 1024);
}

#[test]
fn url_for_resolves_from_root() {
    let admin = admin_with_posts(AdminSettings::default());
    assert_eq!(admin.url_for("post.index", &NO_ARGS).unwrap(), "/admin/post/");
    assert_eq!(admin.url_for("admin.post.index_view", &NO_ARGS).unwrap(), "/admin/post/");
    assert_eq!(admin.url_for("post.edit_view", &["id", "3"]).unwrap(), "/admin/post/edit?id=3");
    assert!(matches!(
        admin.url_for("comment.index", &NO_ARGS),
        Err(ConfigError::EndpointNotFound { .. })
    ));
}

#[test]
fn custom_endpoint_and_url_are_honoured() {
    let mut admin = Admin::new(AdminSettings::default().url_prefix("/backoffice"));
    admin
        .add_model::<Post>(
            Arc::new(MemoryStorage::new()),
            ModelViewConfig::new().endpoint("articles").url("/content/articles"),
        )
        .unwrap();
    assert_eq!(
        admin.url_for("articles.create_view", &NO_ARGS).unwrap(),
        "/backoffice/content/articles/new"
    );
    assert_eq!(admin.menu()[0].endpoint.as_deref(), Some("articles.index_view"));
}

#[test]
fn invalid_view_config_is_rejected() {
    let mut admin = Admin::new(AdminSettings::default());
    let storage = Arc::new(MemoryStorage::new());
    match admin.add_model::<Post>(storage.clone(), ModelViewConfig::new().column_list(["nope"])) {
        Err(ConfigError::MissingReference { kind, id }) => {
            assert_eq!(kind, "column");
            assert_eq!(id, "Post.nope");
        }
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("config with unknown column accepted"),
    }
    assert!(matches!(
        admin.add_model::<Post>(storage.clone(), ModelViewConfig::new().column_editable_list(["id"])),
        Err(ConfigError::Validation(_))
    ));
    assert!(matches!(
        admin.add_model::<Post>(storage, ModelViewConfig::new().endpoint("a.b")),
        Err(ConfigError::InvalidEndpoint { .. })
    ));
    assert!(admin.menu().is_empty());
}

#[test]
fn adding_a_view_twice_replaces_it() {
    let mut admin = admin_with_posts(AdminSettings::default());
    admin
        .add_model::<Post>(Arc::new(MemoryStorage::new()), ModelViewConfig::new().name("Articles"))
        .unwrap();
    assert_eq!(admin.blueprint().children().count(), 1);
    assert_eq!(admin.menu().len(), 1);
    assert_eq!(admin.registry().len(), 1);
}

#[test]
fn categories_group_menu_entries() {
    let mut admin = admin_with_posts(AdminSettings::default());
    admin
        .add_model::<ZenOfScreaming>(Arc::new(MemoryStorage::new()), ModelViewConfig::new().category("People"))
        .unwrap();
    admin.add_menu_item(MenuItem::link("Docs", "https://example.org/docs"));

    let menu = admin.menu();
    assert_eq!(menu.len(), 3);
    assert_eq!(menu[0], MenuItem::endpoint("Post", "post.index_view"));
    assert_eq!(menu[1].name, "People");
    assert_eq!(menu[1].children, vec![MenuItem::endpoint("ZenOfScreaming", "zenofscreaming.index_view")]);
    assert_eq!(menu[2].url.as_deref(), Some("https://example.org/docs"));
}

#[test]
fn unresolvable_menu_entry_fails_validation() {
    let mut admin = admin_with_posts(AdminSettings::default());
    assert!(admin.validate().is_ok());
    admin.add_menu_item(MenuItem::category("Reports", vec![MenuItem::endpoint("Daily", "reports.daily")]));
    assert!(matches!(admin.validate(), Err(ConfigError::EndpointNotFound { .. })));
    assert!(admin.into_router().is_err());
}

#[tokio::test]
async fn dashboard_serves_resolved_menu() {
    let mut admin = admin_with_posts(AdminSettings::default().name("Back Office"));
    admin.add_menu_item(MenuItem::category(
        "Links",
        vec![MenuItem::link("Docs", "/docs"), MenuItem::endpoint("New post", "post.create_view")],
    ));
    let router = admin.into_router().unwrap();

    let res = get_uri(&router, "/admin").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.json(),
        json!({
            "name": "Back Office",
            "menu": [
                {"name": "Post", "url": "/admin/post/"},
                {"name": "Links", "children": [
                    {"name": "Docs", "url": "/docs"},
                    {"name": "New post", "url": "/admin/post/new"}
                ]}
            ]
        })
    );
}

#[tokio::test]
async fn mount_prefix_applies_to_routes_and_links() {
    let router = admin_with_posts(AdminSettings::default())
        .into_router_with_prefix("/ops")
        .unwrap();

    assert_eq!(get_uri(&router, "/admin/post/").await.status, StatusCode::NOT_FOUND);
    let res = get_uri(&router, "/ops/admin/post/").await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["actions"]["create_url"], "/ops/admin/post/new");
    assert_eq!(body["actions"]["export_url"], serde_json::Value::Null);

    let dashboard = get_uri(&router, "/ops/admin").await.json();
    assert_eq!(dashboard["menu"][0]["url"], "/ops/admin/post/");
}

#[tokio::test]
async fn custom_views_mount_under_root() {
    let mut admin = Admin::new(AdminSettings::default());
    admin
        .add_view(Blueprint::<AdminState>::new("reports", "/reports").with_handler(get(|| async { "reports" })))
        .add_menu_item(MenuItem::endpoint("Reports", "reports"));
    assert_eq!(admin.url_for("reports", &NO_ARGS).unwrap(), "/admin/reports");
    let router = admin.into_router().unwrap();

    let res = get_uri(&router, "/admin/reports").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "reports");
}

#[tokio::test]
async fn static_files_are_served_only_when_configured() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests");
    let router = admin_with_posts(AdminSettings::default().static_dir(dir)).into_router().unwrap();
    let res = get_uri(&router, "/admin/static/common/mod.rs").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("pub struct Post"));

    let plain = admin_with_posts(AdminSettings::default()).into_router().unwrap();
    assert_eq!(get_uri(&plain, "/admin/static/common/mod.rs").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let settings = AdminSettings {
        max_body_bytes: 16,
        ..AdminSettings::default()
    };
    let router = admin_with_posts(settings).into_router().unwrap();
    let form = format!("title={}&views=1", "x".repeat(64));
    let res = post_form(&router, "/admin/post/new", &form).await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
}

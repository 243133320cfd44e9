use architect_admin::blueprint::{encode_pairs, encode_query, parse_pairs};
use architect_admin::{Blueprint, ConfigError};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use rstest::rstest;
use tower::ServiceExt;

const NO_ARGS: [&str; 0] = [];

fn node(endpoint: &str, path: &str) -> Blueprint {
    Blueprint::new(endpoint, path)
}

/// admin(/admin) -> foo(/foo) -> {index(/), edit_view(/edit), bar(/bar) -> baz(/baz)}
fn tree() -> Blueprint {
    node("admin", "/admin").with_child(
        node("foo", "/foo")
            .with_child(node("index", "/"))
            .with_child(node("edit_view", "/edit"))
            .with_child(node("bar", "/bar").with_child(node("baz", "/baz"))),
    )
}

#[rstest]
#[case("foo.index", "/admin/foo/")]
#[case("foo.edit_view", "/admin/foo/edit")]
#[case("admin.foo.edit_view", "/admin/foo/edit")]
#[case("foo.bar.baz", "/admin/foo/bar/baz")]
#[case("foo", "/admin/foo")]
#[case("admin", "/admin")]
#[case(".foo.index", "/admin/foo/")]
fn resolves_absolute_and_relative(#[case] reference: &str, #[case] expected: &str) {
    assert_eq!(tree().resolve(reference, &NO_ARGS).unwrap(), expected);
}

#[test]
fn relative_from_owner_matches_absolute() {
    let root = tree();
    let relative = root.resolve_from("foo.bar", ".baz", &NO_ARGS).unwrap();
    let absolute = root.resolve("foo.bar.baz", &NO_ARGS).unwrap();
    assert_eq!(relative, absolute);
    assert_eq!(root.resolve_from("foo", ".edit_view", &NO_ARGS).unwrap(), "/admin/foo/edit");
    // non-relative references ignore the owner
    assert_eq!(root.resolve_from("foo.bar", "foo.index", &NO_ARGS).unwrap(), "/admin/foo/");
}

#[test]
fn subtree_resolves_relative_to_itself() {
    let root = tree();
    let foo = root.child("foo").unwrap();
    assert_eq!(foo.resolve(".edit_view", &NO_ARGS).unwrap(), "/foo/edit");
    assert_eq!(foo.resolve("bar.baz", &NO_ARGS).unwrap(), "/foo/bar/baz");
}

#[test]
fn unknown_child_is_endpoint_not_found() {
    let err = tree().resolve("foo.missing", &NO_ARGS).unwrap_err();
    match err {
        ConfigError::EndpointNotFound { segment, parent } => {
            assert_eq!(segment, "missing");
            assert_eq!(parent, "foo");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(
        tree().resolve("nope.index", &NO_ARGS),
        Err(ConfigError::EndpointNotFound { .. })
    ));
}

#[test]
fn args_become_query_string() {
    let url = tree().resolve("foo.edit_view", &["id", "7", "url", "/admin/foo/?page=2"]).unwrap();
    assert_eq!(url, "/admin/foo/edit?id=7&url=%2Fadmin%2Ffoo%2F%3Fpage%3D2");
}

#[rstest]
#[case(&["a", "1", "c", "d"], "a=1&c=d")]
#[case(&["a", "1", "c"], "a=1")]
#[case(&["a", "1", "a", "2"], "a=1&a=2")]
#[case(&["q", "two words"], "q=two+words")]
#[case(&[], "")]
fn pair_encoding(#[case] args: &[&str], #[case] expected: &str) {
    assert_eq!(encode_pairs(args), expected);
}

#[test]
fn query_pairs_round_trip_order() {
    let pairs = parse_pairs(b"b=2&a=1&b=3");
    assert_eq!(encode_query(&pairs), "b=2&a=1&b=3");
}

#[test]
fn duplicate_register_keeps_later_child() {
    let mut root = node("admin", "/admin");
    assert!(root.register(node("foo", "/first")).is_none());
    let replaced = root.register(node("foo", "/second")).unwrap();
    assert_eq!(replaced.path(), "/first");
    assert_eq!(root.children().count(), 1);
    assert_eq!(root.resolve("foo", &NO_ARGS).unwrap(), "/admin/second");
}

#[rstest]
#[case(node("", "/x"))]
#[case(node("a.b", "/x"))]
#[case(node("ok", "no-slash"))]
fn validate_rejects_bad_nodes(#[case] bad: Blueprint) {
    let root = node("admin", "/admin").with_child(bad);
    assert!(matches!(root.validate(), Err(ConfigError::InvalidEndpoint { .. })));
}

#[test]
fn validate_accepts_empty_paths() {
    let root = node("admin", "").with_child(node("foo", "").with_child(node("index", "/")));
    assert!(root.validate().is_ok());
    assert_eq!(root.resolve("foo.index", &NO_ARGS).unwrap(), "/");
}

#[test]
fn find_and_routes_walk_the_tree() {
    let root = tree();
    assert_eq!(root.find("foo.bar.baz").unwrap().endpoint(), "baz");
    assert_eq!(root.find("admin.foo").unwrap().path(), "/foo");
    assert!(root.find("foo.nope").is_none());
    let routes = root.routes("");
    assert!(routes.contains(&("admin.foo.bar.baz".to_string(), "/admin/foo/bar/baz".to_string())));
    assert!(routes.contains(&("admin.foo.index".to_string(), "/admin/foo/".to_string())));
}

async fn body_of(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn register_to_binds_handlers_and_skips_duplicate_paths() {
    let root = node("admin", "/admin")
        .with_child(
            node("foo", "/foo")
                .with_child(node("index", "/").with_handler(get(|| async { "index" })))
                .with_child(node("index_view", "/").with_handler(get(|| async { "alias" })))
                .with_child(node("edit_view", "/edit").with_handler(get(|| async { "edit" }))),
        )
        .with_child(node("plain", "/plain"));
    let router = root.register_to(Router::new(), "");

    assert_eq!(body_of(router.clone(), "/admin/foo/").await, (StatusCode::OK, "index".to_string()));
    assert_eq!(body_of(router.clone(), "/admin/foo/edit").await, (StatusCode::OK, "edit".to_string()));
    assert_eq!(body_of(router, "/admin/plain").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_to_applies_path_prefix() {
    let root = node("admin", "/admin").with_child(node("ping", "/ping").with_handler(get(|| async { "pong" })));
    let router = root.register_to(Router::new(), "/ops");
    assert_eq!(body_of(router.clone(), "/ops/admin/ping").await.1, "pong");
    assert_eq!(body_of(router, "/admin/ping").await.0, StatusCode::NOT_FOUND);
}

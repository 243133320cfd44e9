//! Endpoint tree: naming, resolution and registration of admin routes.

mod query_string;
mod tree;

pub use query_string::{encode_pairs, encode_query, flatten_pairs, parse_pairs};
pub(crate) use query_string::with_query;
pub use tree::{Blueprint, Registrar};

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Node serving files from `dir` under its mount path (e.g. `admin.static` -> `/admin/static`).
pub fn static_files<S>(endpoint: impl Into<String>, path: impl Into<String>, dir: impl Into<PathBuf>) -> Blueprint<S>
where
    S: Clone + Send + Sync + 'static,
{
    let dir = dir.into();
    let registrar: Registrar<S> = Arc::new(move |router: Router<S>, mount: &str| {
        router.nest_service(mount, ServeDir::new(&dir))
    });
    Blueprint::new(endpoint, path).with_registrar(registrar)
}

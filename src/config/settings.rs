//! Admin settings from the environment (`.env` honoured), plus tracing setup.

use crate::error::ConfigError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
pub struct AdminSettings {
    /// Display name of the admin site.
    pub name: String,
    /// Endpoint name of the root node; absolute endpoint references may start with it.
    pub endpoint: String,
    /// Path of the root node, e.g. "/admin".
    pub url_prefix: String,
    /// Directory served under `{url_prefix}/static` when set.
    pub static_dir: Option<PathBuf>,
    /// Request body limit for every admin route.
    pub max_body_bytes: usize,
}

impl Default for AdminSettings {
    fn default() -> Self {
        AdminSettings {
            name: "Admin".into(),
            endpoint: "admin".into(),
            url_prefix: "/admin".into(),
            static_dir: None,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl AdminSettings {
    /// Read `ADMIN_NAME`, `ADMIN_ENDPOINT`, `ADMIN_URL_PREFIX`, `ADMIN_STATIC_DIR` and
    /// `ADMIN_MAX_BODY_BYTES`, falling back to defaults. A `.env` file is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = AdminSettings::default();
        let max_body_bytes = match std::env::var("ADMIN_MAX_BODY_BYTES") {
            Ok(v) => v.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("ADMIN_MAX_BODY_BYTES must be a byte count, got '{}'", v))
            })?,
            Err(_) => defaults.max_body_bytes,
        };
        let settings = AdminSettings {
            name: std::env::var("ADMIN_NAME").unwrap_or(defaults.name),
            endpoint: std::env::var("ADMIN_ENDPOINT").unwrap_or(defaults.endpoint),
            url_prefix: std::env::var("ADMIN_URL_PREFIX").unwrap_or(defaults.url_prefix),
            static_dir: std::env::var("ADMIN_STATIC_DIR").ok().map(PathBuf::from),
            max_body_bytes,
        };
        tracing::debug!(
            name = %settings.name,
            url_prefix = %settings.url_prefix,
            "admin settings loaded"
        );
        Ok(settings)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn url_prefix(mut self, url_prefix: impl Into<String>) -> Self {
        self.url_prefix = url_prefix.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}

/// Install a fmt subscriber filtered by `RUST_LOG`, or `default_directive` when unset.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

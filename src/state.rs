//! Shared, read-only admin state for all routes. Built once when the router is assembled.

use crate::blueprint::Blueprint;
use crate::error::ConfigError;
use serde::Serialize;
use std::sync::Arc;

/// Navigation entry with its URL resolved.
#[derive(Clone, Debug, Serialize)]
pub struct MenuEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

#[derive(Clone)]
pub struct AdminState {
    inner: Arc<AdminShared>,
}

struct AdminShared {
    name: String,
    mount_prefix: String,
    root: Blueprint<AdminState>,
    menu: Vec<MenuEntry>,
}

impl AdminState {
    pub(crate) fn new(
        name: String,
        mount_prefix: String,
        root: Blueprint<AdminState>,
        menu: Vec<MenuEntry>,
    ) -> Self {
        AdminState {
            inner: Arc::new(AdminShared {
                name,
                mount_prefix,
                root,
                menu,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Prefix the whole admin router is nested under (empty when mounted at the top level).
    pub fn mount_prefix(&self) -> &str {
        &self.inner.mount_prefix
    }

    pub fn root(&self) -> &Blueprint<AdminState> {
        &self.inner.root
    }

    pub fn menu(&self) -> &[MenuEntry] {
        &self.inner.menu
    }

    /// Absolute URL for an endpoint reference resolved from the admin root.
    pub fn url_for<A: AsRef<str>>(&self, endpoint: &str, args: &[A]) -> Result<String, ConfigError> {
        let path = self.inner.root.resolve(endpoint, args)?;
        Ok(format!("{}{}", self.inner.mount_prefix, path))
    }

    /// Absolute URL for a reference issued by the node at dotted path `owner`;
    /// ".edit_view" names `owner`'s own child.
    pub fn view_url<A: AsRef<str>>(&self, owner: &str, endpoint: &str, args: &[A]) -> Result<String, ConfigError> {
        let path = self.inner.root.resolve_from(owner, endpoint, args)?;
        Ok(format!("{}{}", self.inner.mount_prefix, path))
    }
}

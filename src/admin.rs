//! Admin: the root of the endpoint tree, its model views and navigation menu.

use crate::blueprint::{static_files, Blueprint};
use crate::config::{AdminSettings, ModelViewConfig};
use crate::error::ConfigError;
use crate::handlers::dashboard;
use crate::model::{ModelRegistry, Record};
use crate::state::{AdminState, MenuEntry};
use crate::storage::Storage;
use crate::view::ModelView;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Navigation entry: an endpoint reference, an external URL, or a category of children.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuItem {
    pub name: String,
    pub endpoint: Option<String>,
    pub url: Option<String>,
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    /// Entry pointing at an endpoint reference resolved from the admin root ("post.index_view").
    pub fn endpoint(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        MenuItem {
            name: name.into(),
            endpoint: Some(endpoint.into()),
            url: None,
            children: Vec::new(),
        }
    }

    pub fn link(name: impl Into<String>, url: impl Into<String>) -> Self {
        MenuItem {
            name: name.into(),
            endpoint: None,
            url: Some(url.into()),
            children: Vec::new(),
        }
    }

    pub fn category(name: impl Into<String>, children: Vec<MenuItem>) -> Self {
        MenuItem {
            name: name.into(),
            endpoint: None,
            url: None,
            children,
        }
    }

    fn is_category(&self) -> bool {
        self.endpoint.is_none() && self.url.is_none()
    }

    fn resolve(&self, root: &Blueprint<AdminState>, mount_prefix: &str) -> Result<MenuEntry, ConfigError> {
        let no_args: [&str; 0] = [];
        let url = match (&self.endpoint, &self.url) {
            (Some(endpoint), _) => Some(format!("{}{}", mount_prefix, root.resolve(endpoint, &no_args)?)),
            (None, Some(url)) => Some(url.clone()),
            (None, None) => None,
        };
        let children = self
            .children
            .iter()
            .map(|c| c.resolve(root, mount_prefix))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MenuEntry {
            name: self.name.clone(),
            url,
            children,
        })
    }
}

pub struct Admin {
    settings: AdminSettings,
    root: Blueprint<AdminState>,
    registry: ModelRegistry,
    menu: Vec<MenuItem>,
}

impl Admin {
    pub fn new(settings: AdminSettings) -> Self {
        let mut root = Blueprint::new(settings.endpoint.clone(), settings.url_prefix.clone())
            .with_name(settings.name.clone())
            .with_handler(get(dashboard::index));
        if let Some(dir) = &settings.static_dir {
            root.register(static_files("static", "/static", dir.clone()));
        }
        Admin {
            settings,
            root,
            registry: ModelRegistry::new(),
            menu: Vec::new(),
        }
    }

    pub fn settings(&self) -> &AdminSettings {
        &self.settings
    }

    /// Models built so far, memoized per record type.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn blueprint(&self) -> &Blueprint<AdminState> {
        &self.root
    }

    /// Build a model view for `T` over `storage` and attach it.
    pub fn add_model<T: Record>(
        &mut self,
        storage: Arc<dyn Storage>,
        config: ModelViewConfig,
    ) -> Result<&mut Self, ConfigError> {
        let view = ModelView::new::<T>(&self.registry, storage, config)?;
        Ok(self.add_model_view(view))
    }

    /// Attach a model view under the root and list it in the menu (under its category, if any).
    pub fn add_model_view(&mut self, view: ModelView) -> &mut Self {
        let item = MenuItem::endpoint(view.name(), format!("{}.index_view", view.endpoint()));
        let category = view.state().category.clone();
        self.root.register(view.into_blueprint());

        let already_listed = |items: &[MenuItem]| items.iter().any(|m| m.endpoint == item.endpoint);
        match category {
            Some(category) => {
                let existing = self.menu.iter_mut().find(|m| m.is_category() && m.name == category);
                match existing {
                    Some(group) => {
                        if !already_listed(&group.children) {
                            group.children.push(item);
                        }
                    }
                    None => self.menu.push(MenuItem::category(category, vec![item])),
                }
            }
            None => {
                if !already_listed(&self.menu) {
                    self.menu.push(item);
                }
            }
        }
        self
    }

    /// Attach a custom subtree under the root. Menu entries for it are added separately.
    pub fn add_view(&mut self, blueprint: Blueprint<AdminState>) -> &mut Self {
        self.root.register(blueprint);
        self
    }

    pub fn add_menu_item(&mut self, item: MenuItem) -> &mut Self {
        self.menu.push(item);
        self
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    /// Path of an endpoint reference resolved from the root ("post.index" -> "/admin/post/").
    pub fn url_for<A: AsRef<str>>(&self, endpoint: &str, args: &[A]) -> Result<String, ConfigError> {
        self.root.resolve(endpoint, args)
    }

    /// Check endpoint names and paths, and that every menu entry resolves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.root.validate()?;
        self.resolve_menu("").map(|_| ())
    }

    fn resolve_menu(&self, mount_prefix: &str) -> Result<Vec<MenuEntry>, ConfigError> {
        self.menu.iter().map(|m| m.resolve(&self.root, mount_prefix)).collect()
    }

    /// Router with every admin route at its resolved path.
    pub fn into_router(self) -> Result<Router, ConfigError> {
        self.into_router_with_prefix("")
    }

    /// Like [`Admin::into_router`], with every route and generated URL under `mount_prefix`.
    pub fn into_router_with_prefix(self, mount_prefix: &str) -> Result<Router, ConfigError> {
        self.root.validate()?;
        let menu = self.resolve_menu(mount_prefix)?;
        let router = self.root.register_to(Router::new(), mount_prefix);
        let state = AdminState::new(self.settings.name.clone(), mount_prefix.to_string(), self.root, menu);
        tracing::info!(
            name = %state.name(),
            url_prefix = %self.settings.url_prefix,
            views = state.root().children().count(),
            "admin router built"
        );
        Ok(router
            .layer(RequestBodyLimitLayer::new(self.settings.max_body_bytes))
            .with_state(state))
    }
}

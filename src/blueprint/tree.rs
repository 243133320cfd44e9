//! Blueprint: a named tree of routable nodes. Resolves dot-qualified endpoint
//! names ("admin.post.edit_view", ".edit_view") to URL paths and registers
//! handlers onto one axum router.

use super::query_string::{encode_pairs, with_query};
use crate::error::ConfigError;
use axum::routing::MethodRouter;
use axum::Router;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Custom registration for a node: receives the router and the node's full mount path.
/// Used instead of binding `handler` (e.g. to nest a static file service).
pub type Registrar<S> = Arc<dyn Fn(Router<S>, &str) -> Router<S> + Send + Sync>;

pub struct Blueprint<S = ()> {
    endpoint: String,
    path: String,
    name: String,
    handler: Option<MethodRouter<S>>,
    registrar: Option<Registrar<S>>,
    children: BTreeMap<String, Blueprint<S>>,
}

impl<S> Clone for Blueprint<S> {
    fn clone(&self) -> Self {
        Blueprint {
            endpoint: self.endpoint.clone(),
            path: self.path.clone(),
            name: self.name.clone(),
            handler: self.handler.clone(),
            registrar: self.registrar.clone(),
            children: self.children.clone(),
        }
    }
}

impl<S> fmt::Debug for Blueprint<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("endpoint", &self.endpoint)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl<S> Blueprint<S> {
    /// New node. `path` is relative to the parent it will be registered under.
    pub fn new(endpoint: impl Into<String>, path: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Blueprint {
            name: endpoint.clone(),
            endpoint,
            path: path.into(),
            handler: None,
            registrar: None,
            children: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_handler(mut self, handler: MethodRouter<S>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_registrar(mut self, registrar: Registrar<S>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Builder form of [`Blueprint::register`].
    pub fn with_child(mut self, child: Blueprint<S>) -> Self {
        self.register(child);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn child(&self, endpoint: &str) -> Option<&Blueprint<S>> {
        self.children.get(endpoint)
    }

    pub fn children(&self) -> impl Iterator<Item = &Blueprint<S>> {
        self.children.values()
    }

    /// Attach `child` under its own endpoint name. An existing child with the same
    /// endpoint is replaced (last registration wins) and returned.
    pub fn register(&mut self, child: Blueprint<S>) -> Option<Blueprint<S>> {
        let replaced = self.children.insert(child.endpoint.clone(), child);
        if let Some(old) = &replaced {
            tracing::warn!(
                parent = %self.endpoint,
                endpoint = %old.endpoint,
                old_path = %old.path,
                "endpoint already registered, replacing"
            );
        }
        replaced
    }

    /// Look up a descendant by dotted path relative to this node ("post.edit_view").
    /// A leading segment equal to this node's endpoint is accepted and skipped.
    pub fn find(&self, dotted: &str) -> Option<&Blueprint<S>> {
        let mut node = self;
        let mut segments = dotted.split('.').filter(|s| !s.is_empty()).peekable();
        if segments.peek() == Some(&self.endpoint.as_str()) {
            segments.next();
        }
        for segment in segments {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// Resolve a dot-qualified endpoint reference to a path, appending `args`
    /// (flat key/value list) as the query string.
    ///
    /// Absolute references name children from this node ("post.index"; a leading
    /// segment equal to this node's endpoint is also accepted). A leading dot
    /// (".index") is read as relative to this node.
    pub fn resolve<A: AsRef<str>>(&self, endpoint_ref: &str, args: &[A]) -> Result<String, ConfigError> {
        let normalized = match endpoint_ref.strip_prefix('.') {
            Some(rest) => format!("{}.{}", self.endpoint, rest),
            None => endpoint_ref.to_string(),
        };
        let path = self.resolve_path(&normalized)?;
        Ok(with_query(path, &encode_pairs(args)))
    }

    /// Resolve on behalf of the descendant at dotted path `owner` ("post", "a.b").
    /// A leading dot is relative to `owner`; anything else is resolved from this node.
    pub fn resolve_from<A: AsRef<str>>(
        &self,
        owner: &str,
        endpoint_ref: &str,
        args: &[A],
    ) -> Result<String, ConfigError> {
        match endpoint_ref.strip_prefix('.') {
            Some(rest) if !owner.is_empty() => {
                let qualified = format!("{}.{}", owner, rest);
                let path = self.resolve_path(&qualified)?;
                Ok(with_query(path, &encode_pairs(args)))
            }
            _ => self.resolve(endpoint_ref, args),
        }
    }

    fn resolve_path(&self, endpoint_ref: &str) -> Result<String, ConfigError> {
        let (head, rest) = match endpoint_ref.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (endpoint_ref, None),
        };
        if head.is_empty() || head == self.endpoint {
            let mut path = self.path.clone();
            if let Some(rest) = rest.filter(|r| !r.is_empty()) {
                path.push_str(&self.resolve_child(rest)?);
            }
            return Ok(path);
        }
        let child = self.lookup(head)?;
        let mut path = self.path.clone();
        path.push_str(&child.resolve_path(endpoint_ref)?);
        Ok(path)
    }

    /// `rest` is resolved against children only: its head must name a child.
    fn resolve_child(&self, rest: &str) -> Result<String, ConfigError> {
        let head = rest.split_once('.').map(|(h, _)| h).unwrap_or(rest);
        self.lookup(head)?.resolve_path(rest)
    }

    fn lookup(&self, segment: &str) -> Result<&Blueprint<S>, ConfigError> {
        self.children
            .get(segment)
            .ok_or_else(|| ConfigError::EndpointNotFound {
                segment: segment.to_string(),
                parent: self.endpoint.clone(),
            })
    }

    /// Check names and paths of the whole subtree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: "endpoint name is empty",
            });
        }
        if self.endpoint.contains('.') {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: "endpoint name must not contain '.'",
            });
        }
        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: "path must be empty or start with '/'",
            });
        }
        for child in self.children.values() {
            child.validate()?;
        }
        Ok(())
    }

    /// Every (qualified endpoint, full path) pair in the subtree, depth-first.
    pub fn routes(&self, path_prefix: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.collect_routes("", path_prefix, &mut out);
        out
    }

    fn collect_routes(&self, qualifier: &str, path_prefix: &str, out: &mut Vec<(String, String)>) {
        let qualified = if qualifier.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}.{}", qualifier, self.endpoint)
        };
        let full = format!("{}{}", path_prefix, self.path);
        out.push((qualified.clone(), mount_path(&full)));
        for child in self.children.values() {
            child.collect_routes(&qualified, &full, out);
        }
    }
}

impl<S> Blueprint<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Bind every node of the subtree that carries a handler (or a registrar) onto `router`,
    /// mounted at `path_prefix` + accumulated node paths. Duplicate full paths are skipped,
    /// first registration wins.
    pub fn register_to(&self, router: Router<S>, path_prefix: &str) -> Router<S> {
        let mut seen = HashSet::new();
        self.register_into(router, path_prefix, &mut seen)
    }

    /// Like [`Blueprint::register_to`] but shares the duplicate set with earlier calls,
    /// so several trees can be mounted onto one router.
    pub fn register_into(&self, mut router: Router<S>, path_prefix: &str, seen: &mut HashSet<String>) -> Router<S> {
        let full = format!("{}{}", path_prefix, self.path);
        let mount = mount_path(&full);
        if self.registrar.is_some() || self.handler.is_some() {
            if seen.insert(mount.clone()) {
                router = match (&self.registrar, &self.handler) {
                    (Some(registrar), _) => registrar(router, &mount),
                    (None, Some(handler)) => router.route(&mount, handler.clone()),
                    (None, None) => router,
                };
                tracing::debug!(endpoint = %self.endpoint, path = %mount, "route registered");
            } else {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    path = %mount,
                    "duplicate route path, keeping first registration"
                );
            }
        }
        for child in self.children.values() {
            router = child.register_into(router, &full, seen);
        }
        router
    }
}

fn mount_path(full: &str) -> String {
    if full.is_empty() {
        "/".to_string()
    } else if full.starts_with('/') {
        full.to_string()
    } else {
        format!("/{}", full)
    }
}

//! Per-type memoization of built models. Owned by the admin instance, not global.

use super::record::Record;
use super::schema::Model;
use crate::error::ConfigError;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<TypeId, Arc<Model>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model for `T`, built on first use. Concurrent first uses may both build, but only the
    /// first inserted model is ever returned.
    pub fn get_or_build<T: Record>(&self) -> Result<Arc<Model>, ConfigError> {
        if let Some(model) = self.get::<T>() {
            return Ok(model);
        }
        let built = Arc::new(Model::build::<T>()?);
        let mut guard = self.models.write().unwrap_or_else(PoisonError::into_inner);
        let model = guard.entry(TypeId::of::<T>()).or_insert(built);
        Ok(Arc::clone(model))
    }

    pub fn get<T: Record>(&self) -> Option<Arc<Model>> {
        let guard = self.models.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(&TypeId::of::<T>()).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

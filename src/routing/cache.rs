//! Per-client cache of compiled routes.
//!
//! # Design Decisions
//! - Keyed by method name (the method identity within one interface)
//! - Compilation runs outside the map lock; concurrent first calls may both
//!   compile, but `entry().or_insert` keeps exactly one result and every
//!   caller gets that same `Arc`

use std::sync::Arc;

use dashmap::DashMap;

use crate::routing::template::CompiledRoute;

#[derive(Debug, Default)]
pub struct TemplateCache {
    routes: DashMap<String, Arc<CompiledRoute>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, method: &str) -> Option<Arc<CompiledRoute>> {
        self.routes.get(method).map(|r| Arc::clone(r.value()))
    }

    /// Returns the cached route, compiling and inserting it if absent.
    pub fn get_or_compile<F>(&self, method: &str, compile: F) -> Arc<CompiledRoute>
    where
        F: FnOnce() -> CompiledRoute,
    {
        if let Some(hit) = self.get(method) {
            return hit;
        }
        let compiled = Arc::new(compile());
        let entry = self.routes.entry(method.to_string()).or_insert(compiled);
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All cached routes, sorted by method name.
    pub fn snapshot(&self) -> Vec<(String, Arc<CompiledRoute>)> {
        let mut routes: Vec<_> = self
            .routes
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        routes.sort_by(|a, b| a.0.cmp(&b.0));
        routes
    }
}

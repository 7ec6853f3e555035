//! Navigation service - builds and memoizes module navigation trees

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheStats, NavigationCache};
use crate::error::EngineError;
use crate::events::{EngineEvent, EventBus};
use crate::graph::{ModuleKind, ResourceGraph};
use crate::navigation::{
    build_navigation, flatten_leaves, resolve_adjacent, Adjacency, ModuleNavigation,
};

/// Navigation service
pub struct NavigationService {
    graph: Arc<dyn ResourceGraph>,
    events: Arc<EventBus>,
    cache: NavigationCache,
}

impl NavigationService {
    /// Create a new navigation service with the default cache TTL
    pub fn new(graph: Arc<dyn ResourceGraph>, events: Arc<EventBus>) -> Self {
        Self {
            graph,
            events,
            cache: NavigationCache::with_defaults(),
        }
    }

    /// Create with a specific cache TTL
    pub fn with_cache_ttl(
        graph: Arc<dyn ResourceGraph>,
        events: Arc<EventBus>,
        ttl: Duration,
    ) -> Self {
        Self {
            graph,
            events,
            cache: NavigationCache::new(ttl),
        }
    }

    /// Build the navigation tree for a module (by id or slug)
    ///
    /// `Ok(None)` when the module is absent: an empty-state UI case, not
    /// an error. Absent modules are not cached, so newly published
    /// content appears as soon as it exists.
    pub fn build(
        &self,
        module: &str,
        kind: ModuleKind,
    ) -> Result<Option<ModuleNavigation>, EngineError> {
        if let Some(cached) = self.cache.get(module, kind) {
            return Ok(Some(cached));
        }

        let rows = self.graph.fetch_module_subtree(module, kind)?;
        let Some(navigation) = build_navigation(&rows) else {
            debug!(module = %module, kind = ?kind, "Module not found");
            return Ok(None);
        };

        self.events.emit(EngineEvent::NavigationBuilt {
            module_id: navigation.id.clone(),
            leaf_count: flatten_leaves(&navigation).len(),
        });

        self.cache.insert(module, kind, navigation.clone());
        Ok(Some(navigation))
    }

    /// Resolve the stops adjacent to a resource within a module
    ///
    /// `Ok(None)` when the module itself is absent; an unknown
    /// `current_id` inside a present module yields an adjacency with
    /// both sides `None`.
    pub fn adjacent(
        &self,
        module: &str,
        kind: ModuleKind,
        current_id: &str,
    ) -> Result<Option<Adjacency>, EngineError> {
        let Some(navigation) = self.build(module, kind)? else {
            return Ok(None);
        };
        Ok(Some(resolve_adjacent(&navigation, current_id)))
    }

    /// Drop all cached navigations
    pub fn invalidate_cache(&self) {
        self.cache.clear();
    }

    /// Cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

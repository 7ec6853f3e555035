//! Navigation memoization
//!
//! In-memory cache with TTL for built navigation trees, keyed by
//! `(module, kind)`. The graph changes infrequently relative to page
//! views, so a short TTL keeps rebuilds rare without a dedicated
//! invalidation path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::graph::ModuleKind;
use crate::navigation::ModuleNavigation;

/// A cached navigation with its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
    navigation: ModuleNavigation,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// In-memory navigation cache
pub struct NavigationCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Default TTL, short enough that editor changes surface quickly
const DEFAULT_TTL: Duration = Duration::from_secs(60);

impl NavigationCache {
    /// Create a cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Create with the default TTL
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TTL)
    }

    fn storage_key(module: &str, kind: ModuleKind) -> String {
        format!("{}:{}", kind.root_type(), module)
    }

    /// Get a cached navigation, evicting it if expired
    pub fn get(&self, module: &str, kind: ModuleKind) -> Option<ModuleNavigation> {
        let key = Self::storage_key(module, kind);

        if let Some(entry) = self.entries.get(&key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Navigation cache hit");
                return Some(entry.navigation.clone());
            }
        }

        // Expired entries are dropped on the miss path.
        if self.entries.remove(&key).is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Navigation cache miss");
        None
    }

    /// Insert a freshly built navigation
    pub fn insert(&self, module: &str, kind: ModuleKind, navigation: ModuleNavigation) {
        let key = Self::storage_key(module, kind);
        self.entries.insert(
            key,
            CacheEntry {
                navigation,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop every cached entry (e.g. after a bulk content import)
    pub fn clear(&self) {
        let evicted = self.entries.len();
        self.entries.clear();
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

//! Service layer for the curricula engine
//!
//! Services encapsulate the engine's outward operations over the graph:
//! - Navigation builds with memoization
//! - Authoritative progress reads and the optimistic write-through
//! - Certificate eligibility checks
//! - Event emission for audit/desync detection
//!
//! ## Architecture
//!
//! ```text
//! Embedding application (UI, API)
//!     ↓
//! Service Layer (this module)
//!     ↓
//! Pure engine (navigation/, progress/, certificate)
//!     ↓
//! ResourceGraph trait (graph/), SQLite adapter in db/
//! ```

pub mod certificate_service;
pub mod navigation_service;
pub mod progress_service;

// Re-exports
pub use certificate_service::CertificateService;
pub use navigation_service::NavigationService;
pub use progress_service::ProgressService;

use std::sync::Arc;
use std::time::Duration;

use crate::events::EventBus;
use crate::graph::ResourceGraph;

/// Service container for dependency injection
///
/// Holds all services with a shared graph and event bus.
pub struct Services {
    pub navigation: Arc<NavigationService>,
    pub progress: Arc<ProgressService>,
    pub certificate: Arc<CertificateService>,
    pub events: Arc<EventBus>,
}

impl Services {
    /// Create all services with a shared graph
    pub fn new(graph: Arc<dyn ResourceGraph>) -> Self {
        let events = Arc::new(EventBus::new());

        Self {
            navigation: Arc::new(NavigationService::new(graph.clone(), events.clone())),
            progress: Arc::new(ProgressService::new(graph.clone(), events.clone())),
            certificate: Arc::new(CertificateService::new(graph)),
            events,
        }
    }

    /// Create all services with a specific navigation cache TTL
    pub fn with_cache_ttl(graph: Arc<dyn ResourceGraph>, ttl: Duration) -> Self {
        let events = Arc::new(EventBus::new());

        Self {
            navigation: Arc::new(NavigationService::with_cache_ttl(
                graph.clone(),
                events.clone(),
                ttl,
            )),
            progress: Arc::new(ProgressService::new(graph.clone(), events.clone())),
            certificate: Arc::new(CertificateService::new(graph)),
            events,
        }
    }
}

//! Curricula - content navigation and progress tracking engine
//!
//! Turns flat parent/child resource edges into ordered navigation trees
//! for workshops and tutorials, tracks per-user lesson completion with an
//! optimistic client-side reducer and a fire-and-forget write-through, and
//! evaluates certificate eligibility over completion logs.
//!
//! ## Architecture
//!
//! - **graph**: the `ResourceGraph` trait, the engine's only data seam
//! - **db**: SQLite implementation of the graph (resources, edges, completions)
//! - **navigation**: subtree rows -> ordered tree, plus linear adjacency
//! - **progress**: authoritative aggregate computation + optimistic reducer
//! - **certificate**: standalone and cohort eligibility
//! - **services**: cache-fronted operations over the graph, with events
//!
//! ## Data Flow
//!
//! ```text
//! SQLite edges            completion log
//!      │                        │
//!      ▼                        ▼
//! build_navigation ──► compute_progress ──► ModuleProgress
//!      │                        ▲
//!      ▼                        │ (optimistic shadow)
//! flatten_leaves          ProgressAction reducer
//!      │
//!      ▼
//! resolve_adjacent ──► previous / next stops
//! ```

// Core modules
pub mod cache;
pub mod certificate;
pub mod db;
pub mod error;
pub mod events;
pub mod graph;
pub mod navigation;
pub mod progress;
pub mod services;

// Re-exports
pub use cache::{CacheStats, NavigationCache};
pub use certificate::CertificateEligibility;
pub use db::{DbStats, GraphDb};
pub use error::EngineError;
pub use events::{EngineEvent, EventBus, EventListener, LoggingEventListener};
pub use graph::{
    ChildModule, CompletionCounts, CompletionRecord, ModuleKind, ResourceGraph, RowKind,
    SubtreeRow,
};
pub use navigation::{
    build_navigation, flatten_leaves, resolve_adjacent, Adjacency, LeafKind, LeafRef,
    LessonNode, ModuleNavigation, NavigationNode, PostNode, SectionNode, SolutionRef,
};
pub use progress::{compute_progress, ModuleProgress, ProgressAction};
pub use services::{CertificateService, NavigationService, ProgressService, Services};

//! Resource graph query surface
//!
//! The engine consumes the relational resource store through this trait:
//! one batched subtree read, two completion-log reads, and one idempotent
//! completion write. The store itself (SQLite here, see [`crate::db`]) is
//! an external collaborator; everything above this seam is pure
//! computation over the returned rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Module kind, selecting which edge set is treated as the module root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Workshop,
    Tutorial,
}

impl ModuleKind {
    /// Resource type string for root rows of this kind
    pub fn root_type(&self) -> &'static str {
        match self {
            ModuleKind::Workshop => "workshop",
            ModuleKind::Tutorial => "tutorial",
        }
    }
}

/// Tag on a batched subtree row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// The module's own metadata row
    Module,
    /// A section directly under the module
    Section,
    /// A lesson/exercise/post, under the module or one of its sections
    Leaf,
    /// A solution attached to a lesson
    Solution,
}

/// One row of the batched subtree read
///
/// Field presence depends on `kind`: sections and leaves carry `position`,
/// leaves carry `parent_section_id` when grouped, solutions carry
/// `owner_lesson_id` and no position (solutions are unordered per lesson).
/// Rows that fail these expectations are dropped by the builder with a
/// logged warning, not escalated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtreeRow {
    pub kind: RowKind,
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Leaf resource type: "lesson", "exercise", "post", ...
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub parent_section_id: Option<String>,
    #[serde(default)]
    pub owner_lesson_id: Option<String>,
    /// Excluded from required-leaf counts when set
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl SubtreeRow {
    /// True for lesson-like leaves (the completable, required kind)
    pub fn is_lesson(&self) -> bool {
        matches!(self.resource_type.as_deref(), Some("lesson") | Some("exercise"))
    }
}

/// One completion log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub resource_id: String,
    pub user_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Completion aggregate for certificate evaluation
///
/// Both numbers range over the *required* leaf set (optional-flagged
/// leaves excluded). `last_completed_at` is `None` when the user has no
/// records in that set, including the vacuous zero-leaf case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionCounts {
    pub incomplete_count: u64,
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// A module directly under a cohort-shaped root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildModule {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub position: i64,
}

/// Query surface over the resource graph
///
/// Implementations must treat `write_completion` as an idempotent
/// upsert/delete keyed on `(resource_id, user_id)`.
pub trait ResourceGraph: Send + Sync {
    /// Batched read of the subtree rooted at a module (by id or slug)
    fn fetch_module_subtree(
        &self,
        module: &str,
        kind: ModuleKind,
    ) -> Result<Vec<SubtreeRow>, EngineError>;

    /// Modules directly under a cohort-shaped root, in position order
    fn fetch_child_modules(&self, root_id: &str) -> Result<Vec<ChildModule>, EngineError>;

    /// Required-leaf completion aggregate under a root (two levels deep)
    fn fetch_completion_counts(
        &self,
        root_id: &str,
        user_id: &str,
    ) -> Result<CompletionCounts, EngineError>;

    /// All completion records for a user within a module's subtree
    fn fetch_completion_records(
        &self,
        module_id: &str,
        user_id: &str,
    ) -> Result<Vec<CompletionRecord>, EngineError>;

    /// Idempotent upsert (completed = true) or delete (completed = false)
    fn write_completion(
        &self,
        resource_id: &str,
        user_id: &str,
        completed: bool,
    ) -> Result<(), EngineError>;
}

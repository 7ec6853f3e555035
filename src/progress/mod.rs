//! Per-user progress aggregates
//!
//! Two halves: the server-side tracker ([`tracker::compute_progress`])
//! producing the authoritative aggregate, and the pure client reducer
//! ([`reducer::apply`]) that advances an optimistic shadow copy ahead of
//! server confirmation. The optimistic copy is never merged back; the next
//! authoritative fetch replaces it wholesale.

pub mod reducer;
pub mod tracker;

use serde::{Deserialize, Serialize};

use crate::graph::CompletionRecord;
use crate::navigation::LeafRef;

pub use reducer::{apply, ProgressAction};
pub use tracker::compute_progress;

/// Completion aggregate for one module and user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    /// The user's completion records within the module
    #[serde(default)]
    pub completed_lessons: Vec<CompletionRecord>,
    /// Required lessons completed
    pub completed_lessons_count: u32,
    /// Required lessons in the module (solutions and posts never count)
    pub total_lessons_count: u32,
    /// `round(100 * completed / total)`, 0 when total is 0
    pub percent_completed: u32,
    /// First leaf in the flattened sequence not yet covered by a record
    #[serde(default)]
    pub next_resource: Option<LeafRef>,
}

impl ModuleProgress {
    /// Empty aggregate, synthesized by the reducer when no state exists yet
    pub fn empty() -> Self {
        Self {
            completed_lessons: Vec::new(),
            completed_lessons_count: 0,
            total_lessons_count: 0,
            percent_completed: 0,
            next_resource: None,
        }
    }
}

/// `round(100 * completed / total)`, guarding `total = 0 -> 0`
pub(crate) fn percent_completed(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(completed) / f64::from(total)).round() as u32
}

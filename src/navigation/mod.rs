//! Navigation tree types and construction
//!
//! A module's navigation is a read-only projection built fresh from the
//! resource graph on every (uncached) request: module root, then sections
//! and top-level leaves interleaved by position, then lessons with their
//! attached solutions. It is never mutated in place; refetch replaces it
//! wholesale.

pub mod adjacency;
pub mod builder;

use serde::{Deserialize, Serialize};

pub use adjacency::{flatten_leaves, resolve_adjacent, Adjacency, LeafKind, LeafRef};
pub use builder::build_navigation;

/// Reference to a solution attached to a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRef {
    pub id: String,
    pub slug: String,
    pub title: String,
}

/// A section grouping lessons/posts within a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionNode {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub position: i64,
    pub resources: Vec<NavigationNode>,
}

/// A lesson (or exercise) with its attached solutions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonNode {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub position: i64,
    /// Excluded from required-leaf progress counts when set
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub solutions: Vec<SolutionRef>,
}

/// A standalone post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostNode {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub position: i64,
}

/// Tagged union over the node kinds a module can contain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavigationNode {
    Section(SectionNode),
    Lesson(LessonNode),
    Post(PostNode),
}

impl NavigationNode {
    pub fn id(&self) -> &str {
        match self {
            NavigationNode::Section(s) => &s.id,
            NavigationNode::Lesson(l) => &l.id,
            NavigationNode::Post(p) => &p.id,
        }
    }

    pub fn position(&self) -> i64 {
        match self {
            NavigationNode::Section(s) => s.position,
            NavigationNode::Lesson(l) => l.position,
            NavigationNode::Post(p) => p.position,
        }
    }
}

/// Root of a module's navigation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleNavigation {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub resources: Vec<NavigationNode>,
}

//! Linear adjacency resolver
//!
//! Flattens a navigation tree into the ordered sequence of viewable
//! leaves: depth-first, sections transparent (not addressable stops),
//! each lesson immediately followed by its solutions, posts in position
//! order. Next/previous are answered by slot in that sequence.

use serde::{Deserialize, Serialize};

use super::{ModuleNavigation, NavigationNode};

/// Kind of a flattened leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LeafKind {
    Lesson,
    /// Solutions are pseudo-leaves; completion accrues to the owning lesson
    Solution { lesson_id: String },
    Post,
}

/// One addressable stop in the flattened sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafRef {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub kind: LeafKind,
}

impl LeafRef {
    /// The resource whose completion record covers this leaf
    ///
    /// A solution's slot is its own, but marking it complete marks the
    /// owning lesson.
    pub fn completion_target(&self) -> &str {
        match &self.kind {
            LeafKind::Solution { lesson_id } => lesson_id,
            _ => &self.id,
        }
    }
}

/// Next/previous stops around a current resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjacency {
    pub next: Option<LeafRef>,
    pub previous: Option<LeafRef>,
}

/// Flatten a navigation tree into its ordered leaf sequence
pub fn flatten_leaves(nav: &ModuleNavigation) -> Vec<LeafRef> {
    let mut leaves = Vec::new();
    flatten_into(&nav.resources, &mut leaves);
    leaves
}

fn flatten_into(nodes: &[NavigationNode], out: &mut Vec<LeafRef>) {
    for node in nodes {
        match node {
            NavigationNode::Section(section) => {
                // Sections are expanded in place, never emitted.
                flatten_into(&section.resources, out);
            }
            NavigationNode::Lesson(lesson) => {
                out.push(LeafRef {
                    id: lesson.id.clone(),
                    slug: lesson.slug.clone(),
                    title: lesson.title.clone(),
                    kind: LeafKind::Lesson,
                });
                for solution in &lesson.solutions {
                    out.push(LeafRef {
                        id: solution.id.clone(),
                        slug: solution.slug.clone(),
                        title: solution.title.clone(),
                        kind: LeafKind::Solution {
                            lesson_id: lesson.id.clone(),
                        },
                    });
                }
            }
            NavigationNode::Post(post) => {
                out.push(LeafRef {
                    id: post.id.clone(),
                    slug: post.slug.clone(),
                    title: post.title.clone(),
                    kind: LeafKind::Post,
                });
            }
        }
    }
}

/// Resolve the leaves adjacent to `current_id` in the flattened sequence
///
/// An id not present in the sequence is an unknown position, not an
/// error: both sides come back `None` and the caller falls back to a
/// generic recommendations experience.
pub fn resolve_adjacent(nav: &ModuleNavigation, current_id: &str) -> Adjacency {
    let leaves = flatten_leaves(nav);

    let Some(index) = leaves.iter().position(|leaf| leaf.id == current_id) else {
        return Adjacency {
            next: None,
            previous: None,
        };
    };

    Adjacency {
        next: leaves.get(index + 1).cloned(),
        previous: index.checked_sub(1).and_then(|i| leaves.get(i)).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{LessonNode, PostNode, SectionNode, SolutionRef};

    fn lesson(id: &str, position: i64, solutions: Vec<SolutionRef>) -> NavigationNode {
        NavigationNode::Lesson(LessonNode {
            id: id.into(),
            slug: format!("{}-slug", id),
            title: format!("Lesson {}", id),
            position,
            optional: false,
            solutions,
        })
    }

    fn solution(id: &str) -> SolutionRef {
        SolutionRef {
            id: id.into(),
            slug: format!("{}-slug", id),
            title: format!("Solution {}", id),
        }
    }

    fn sample_nav() -> ModuleNavigation {
        ModuleNavigation {
            id: "mod-1".into(),
            slug: "mod-1-slug".into(),
            title: "Module".into(),
            cover_image: None,
            resources: vec![
                NavigationNode::Section(SectionNode {
                    id: "sec-a".into(),
                    slug: "sec-a-slug".into(),
                    title: "Section A".into(),
                    position: 0,
                    resources: vec![lesson("l1", 0, vec![solution("s1")])],
                }),
                lesson("l2", 1, vec![]),
                NavigationNode::Post(PostNode {
                    id: "p1".into(),
                    slug: "p1-slug".into(),
                    title: "Post".into(),
                    position: 2,
                }),
            ],
        }
    }

    #[test]
    fn flatten_is_depth_first_with_solutions_after_their_lesson() {
        let ids: Vec<_> = flatten_leaves(&sample_nav())
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["l1", "s1", "l2", "p1"]);
    }

    #[test]
    fn flatten_contains_each_leaf_exactly_once() {
        let leaves = flatten_leaves(&sample_nav());
        let mut ids: Vec<_> = leaves.iter().map(|l| l.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), leaves.len());
        // Sections are not stops.
        assert!(!leaves.iter().any(|l| l.id == "sec-a"));
    }

    #[test]
    fn solution_is_the_lessons_next_and_vice_versa() {
        let nav = sample_nav();

        let from_lesson = resolve_adjacent(&nav, "l1");
        assert_eq!(from_lesson.next.unwrap().id, "s1");
        assert!(from_lesson.previous.is_none());

        let from_solution = resolve_adjacent(&nav, "s1");
        assert_eq!(from_solution.previous.unwrap().id, "l1");
        // Next after the solution is whatever followed its slot, not a
        // second visit to the lesson.
        assert_eq!(from_solution.next.unwrap().id, "l2");
    }

    #[test]
    fn solution_completion_target_is_owning_lesson() {
        let leaves = flatten_leaves(&sample_nav());
        let s1 = leaves.iter().find(|l| l.id == "s1").unwrap();
        assert_eq!(s1.completion_target(), "l1");
        let l2 = leaves.iter().find(|l| l.id == "l2").unwrap();
        assert_eq!(l2.completion_target(), "l2");
    }

    #[test]
    fn unknown_id_yields_both_none() {
        let adjacency = resolve_adjacent(&sample_nav(), "nowhere");
        assert!(adjacency.next.is_none());
        assert!(adjacency.previous.is_none());
    }

    #[test]
    fn last_leaf_has_no_next() {
        let adjacency = resolve_adjacent(&sample_nav(), "p1");
        assert!(adjacency.next.is_none());
        assert_eq!(adjacency.previous.unwrap().id, "l2");
    }
}

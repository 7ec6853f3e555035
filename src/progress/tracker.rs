//! Server-side progress computation

use std::collections::HashSet;

use crate::graph::CompletionRecord;
use crate::navigation::{flatten_leaves, ModuleNavigation, NavigationNode};

use super::{percent_completed, ModuleProgress};

/// Compute the authoritative progress aggregate for a module and user
///
/// `records` is the user's completion log within the module's subtree.
/// Required leaves are non-optional lessons; solutions are covered by
/// their owning lesson's record, posts by their own.
pub fn compute_progress(nav: &ModuleNavigation, records: Vec<CompletionRecord>) -> ModuleProgress {
    let completed_ids: HashSet<&str> = records.iter().map(|r| r.resource_id.as_str()).collect();

    let mut total = 0u32;
    let mut completed = 0u32;
    count_required(&nav.resources, &completed_ids, &mut total, &mut completed);

    let next_resource = flatten_leaves(nav)
        .into_iter()
        .find(|leaf| !completed_ids.contains(leaf.completion_target()));

    ModuleProgress {
        percent_completed: percent_completed(completed, total),
        completed_lessons: records,
        completed_lessons_count: completed,
        total_lessons_count: total,
        next_resource,
    }
}

fn count_required(
    nodes: &[NavigationNode],
    completed_ids: &HashSet<&str>,
    total: &mut u32,
    completed: &mut u32,
) {
    for node in nodes {
        match node {
            NavigationNode::Section(section) => {
                count_required(&section.resources, completed_ids, total, completed);
            }
            NavigationNode::Lesson(lesson) if !lesson.optional => {
                *total += 1;
                if completed_ids.contains(lesson.id.as_str()) {
                    *completed += 1;
                }
            }
            // Optional lessons and posts are viewable but never required.
            NavigationNode::Lesson(_) | NavigationNode::Post(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{LessonNode, SectionNode, SolutionRef};
    use chrono::Utc;

    fn record(resource_id: &str) -> CompletionRecord {
        CompletionRecord {
            resource_id: resource_id.into(),
            user_id: "user-1".into(),
            completed_at: Utc::now(),
        }
    }

    fn lesson(id: &str, position: i64, optional: bool, solutions: Vec<SolutionRef>) -> NavigationNode {
        NavigationNode::Lesson(LessonNode {
            id: id.into(),
            slug: format!("{}-slug", id),
            title: format!("Lesson {}", id),
            position,
            optional,
            solutions,
        })
    }

    /// Module M: section A (position 0) holding lesson L1 with solution S1,
    /// plus top-level lesson L2 (position 1).
    fn scenario_nav() -> ModuleNavigation {
        ModuleNavigation {
            id: "M".into(),
            slug: "m-slug".into(),
            title: "Module M".into(),
            cover_image: None,
            resources: vec![
                NavigationNode::Section(SectionNode {
                    id: "A".into(),
                    slug: "a-slug".into(),
                    title: "Section A".into(),
                    position: 0,
                    resources: vec![lesson(
                        "L1",
                        0,
                        false,
                        vec![SolutionRef {
                            id: "S1".into(),
                            slug: "s1-slug".into(),
                            title: "Solution S1".into(),
                        }],
                    )],
                }),
                lesson("L2", 1, false, vec![]),
            ],
        }
    }

    #[test]
    fn scenario_one_of_two_lessons_complete() {
        let nav = scenario_nav();
        let flat: Vec<_> = flatten_leaves(&nav).into_iter().map(|l| l.id).collect();
        assert_eq!(flat, vec!["L1", "S1", "L2"]);

        let progress = compute_progress(&nav, vec![record("L1")]);
        assert_eq!(progress.completed_lessons_count, 1);
        assert_eq!(progress.total_lessons_count, 2);
        assert_eq!(progress.percent_completed, 50);
        // S1 is covered by L1's record; the next stop is L2.
        assert_eq!(progress.next_resource.unwrap().id, "L2");
    }

    #[test]
    fn no_records_points_at_first_leaf() {
        let progress = compute_progress(&scenario_nav(), vec![]);
        assert_eq!(progress.completed_lessons_count, 0);
        assert_eq!(progress.percent_completed, 0);
        assert_eq!(progress.next_resource.unwrap().id, "L1");
    }

    #[test]
    fn all_complete_has_no_next_resource() {
        let progress = compute_progress(&scenario_nav(), vec![record("L1"), record("L2")]);
        assert_eq!(progress.completed_lessons_count, 2);
        assert_eq!(progress.percent_completed, 100);
        assert!(progress.next_resource.is_none());
    }

    #[test]
    fn optional_lessons_are_not_required() {
        let nav = ModuleNavigation {
            id: "M".into(),
            slug: "m-slug".into(),
            title: "Module M".into(),
            cover_image: None,
            resources: vec![
                lesson("L1", 0, false, vec![]),
                lesson("L-extra", 1, true, vec![]),
            ],
        };

        let progress = compute_progress(&nav, vec![record("L1")]);
        assert_eq!(progress.total_lessons_count, 1);
        assert_eq!(progress.completed_lessons_count, 1);
        assert_eq!(progress.percent_completed, 100);
        // Still viewable: the incomplete optional lesson is the next stop.
        assert_eq!(progress.next_resource.unwrap().id, "L-extra");
    }

    #[test]
    fn empty_module_reports_zero_percent() {
        let nav = ModuleNavigation {
            id: "M".into(),
            slug: "m-slug".into(),
            title: "Module M".into(),
            cover_image: None,
            resources: vec![],
        };

        let progress = compute_progress(&nav, vec![]);
        assert_eq!(progress.total_lessons_count, 0);
        assert_eq!(progress.percent_completed, 0);
        assert!(progress.next_resource.is_none());
    }
}

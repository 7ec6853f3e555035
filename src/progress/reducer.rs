//! Optimistic progress reducer
//!
//! Pure function, no I/O: the client applies it synchronously to a shadow
//! copy of the authoritative aggregate when the user toggles a lesson,
//! ahead of the write-through confirming. Percent is recomputed from
//! count/total on every transition; `next_resource` is left for the next
//! authoritative fetch to correct, since resynchronizing it needs the
//! navigation tree the reducer does not hold.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::graph::CompletionRecord;

use super::{percent_completed, ModuleProgress};

/// A local completion toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressAction {
    AddLessonProgress { lesson_id: String },
    RemoveLessonProgress { lesson_id: String },
}

/// Advance an optimistic aggregate by one action
///
/// Absent state is synthesized as an empty aggregate first. The optimistic
/// record carries an empty user id; the authoritative refetch replaces it.
pub fn apply(state: Option<&ModuleProgress>, action: &ProgressAction) -> ModuleProgress {
    let mut next = state.cloned().unwrap_or_else(ModuleProgress::empty);

    match action {
        ProgressAction::AddLessonProgress { lesson_id } => {
            next.completed_lessons.push(CompletionRecord {
                resource_id: lesson_id.clone(),
                user_id: String::new(),
                completed_at: Utc::now(),
            });
            next.completed_lessons_count += 1;
        }
        ProgressAction::RemoveLessonProgress { lesson_id } => {
            next.completed_lessons
                .retain(|record| record.resource_id != *lesson_id);
            next.completed_lessons_count = next.completed_lessons_count.saturating_sub(1);
        }
    }

    next.percent_completed =
        percent_completed(next.completed_lessons_count, next.total_lessons_count);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(lesson_id: &str) -> ProgressAction {
        ProgressAction::AddLessonProgress {
            lesson_id: lesson_id.into(),
        }
    }

    fn remove(lesson_id: &str) -> ProgressAction {
        ProgressAction::RemoveLessonProgress {
            lesson_id: lesson_id.into(),
        }
    }

    #[test]
    fn add_on_absent_state_synthesizes_empty_aggregate() {
        let progress = apply(None, &add("l1"));
        assert_eq!(progress.completed_lessons_count, 1);
        assert_eq!(progress.completed_lessons.len(), 1);
        assert_eq!(progress.completed_lessons[0].resource_id, "l1");
        assert_eq!(progress.completed_lessons[0].user_id, "");
        // No known total yet: percent stays at the zero-total guard.
        assert_eq!(progress.percent_completed, 0);
    }

    #[test]
    fn add_then_remove_restores_the_count() {
        let base = ModuleProgress {
            completed_lessons: vec![],
            completed_lessons_count: 3,
            total_lessons_count: 10,
            percent_completed: 30,
            next_resource: None,
        };

        let added = apply(Some(&base), &add("l9"));
        assert_eq!(added.completed_lessons_count, 4);

        let removed = apply(Some(&added), &remove("l9"));
        assert_eq!(removed.completed_lessons_count, base.completed_lessons_count);
        assert_eq!(removed.percent_completed, base.percent_completed);
    }

    #[test]
    fn percent_is_recomputed_on_every_transition() {
        let base = ModuleProgress {
            completed_lessons: vec![],
            completed_lessons_count: 0,
            total_lessons_count: 4,
            percent_completed: 0,
            next_resource: None,
        };

        let one = apply(Some(&base), &add("l1"));
        assert_eq!(one.percent_completed, 25);

        let two = apply(Some(&one), &add("l2"));
        assert_eq!(two.percent_completed, 50);

        let back = apply(Some(&two), &remove("l2"));
        assert_eq!(back.percent_completed, 25);
    }

    #[test]
    fn remove_never_underflows() {
        let progress = apply(None, &remove("l1"));
        assert_eq!(progress.completed_lessons_count, 0);
        assert_eq!(progress.percent_completed, 0);
    }

    #[test]
    fn remove_filters_the_record_out() {
        let one = apply(None, &add("l1"));
        let two = apply(Some(&one), &add("l2"));
        let removed = apply(Some(&two), &remove("l1"));

        assert_eq!(removed.completed_lessons.len(), 1);
        assert_eq!(removed.completed_lessons[0].resource_id, "l2");
    }

    #[test]
    fn next_resource_is_left_untouched() {
        use crate::navigation::{LeafKind, LeafRef};

        let base = ModuleProgress {
            completed_lessons: vec![],
            completed_lessons_count: 0,
            total_lessons_count: 2,
            percent_completed: 0,
            next_resource: Some(LeafRef {
                id: "l2".into(),
                slug: "l2-slug".into(),
                title: "Lesson 2".into(),
                kind: LeafKind::Lesson,
            }),
        };

        let progress = apply(Some(&base), &add("l1"));
        assert_eq!(progress.next_resource, base.next_resource);
    }
}

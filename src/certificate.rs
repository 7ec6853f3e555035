//! Certificate eligibility evaluation
//!
//! Walks at most two levels under a root: a cohort-shaped root (modules as
//! direct children) is eligible only if every child module is independently
//! eligible; a module-shaped root is evaluated straight from its required
//! leaf set. Derived on demand, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::graph::ResourceGraph;

/// Eligibility verdict for one root and user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEligibility {
    pub eligible: bool,
    /// Latest completion among the required leaf set, `None` if incomplete
    pub completed_at: Option<DateTime<Utc>>,
}

impl CertificateEligibility {
    fn ineligible() -> Self {
        Self {
            eligible: false,
            completed_at: None,
        }
    }
}

/// Evaluate certificate eligibility for a root resource and user
pub fn check_eligibility(
    graph: &dyn ResourceGraph,
    root_id: &str,
    user_id: &str,
) -> Result<CertificateEligibility, EngineError> {
    let child_modules = graph.fetch_child_modules(root_id)?;

    if child_modules.is_empty() {
        return module_eligibility(graph, root_id, user_id);
    }

    // Cohort shape: every child module must be eligible on its own; the
    // cohort's date is the latest of the per-module dates.
    let mut latest: Option<DateTime<Utc>> = None;
    for module in &child_modules {
        let result = module_eligibility(graph, &module.id, user_id)?;
        if !result.eligible {
            debug!(
                root_id = %root_id,
                module_id = %module.id,
                user_id = %user_id,
                "Cohort ineligible: child module incomplete"
            );
            return Ok(CertificateEligibility::ineligible());
        }
        latest = latest.max(result.completed_at);
    }

    Ok(CertificateEligibility {
        eligible: true,
        completed_at: latest,
    })
}

/// Eligibility for a single module-shaped root
///
/// A root with zero qualifying leaves is not eligible: the required set
/// being empty means `last_completed_at` is absent, and absence of content
/// must not be conflated with completion.
fn module_eligibility(
    graph: &dyn ResourceGraph,
    root_id: &str,
    user_id: &str,
) -> Result<CertificateEligibility, EngineError> {
    let counts = graph.fetch_completion_counts(root_id, user_id)?;

    let eligible = counts.incomplete_count == 0 && counts.last_completed_at.is_some();

    Ok(CertificateEligibility {
        eligible,
        completed_at: if eligible { counts.last_completed_at } else { None },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        ChildModule, CompletionCounts, CompletionRecord, ModuleKind, SubtreeRow,
    };
    use chrono::TimeZone;
    use std::collections::HashMap;

    /// Canned graph: per-root completion counts and cohort children
    #[derive(Default)]
    struct CannedGraph {
        counts: HashMap<String, CompletionCounts>,
        children: HashMap<String, Vec<ChildModule>>,
    }

    impl ResourceGraph for CannedGraph {
        fn fetch_module_subtree(
            &self,
            _module: &str,
            _kind: ModuleKind,
        ) -> Result<Vec<SubtreeRow>, EngineError> {
            Ok(vec![])
        }

        fn fetch_child_modules(&self, root_id: &str) -> Result<Vec<ChildModule>, EngineError> {
            Ok(self.children.get(root_id).cloned().unwrap_or_default())
        }

        fn fetch_completion_counts(
            &self,
            root_id: &str,
            _user_id: &str,
        ) -> Result<CompletionCounts, EngineError> {
            Ok(self.counts.get(root_id).cloned().unwrap_or(CompletionCounts {
                incomplete_count: 0,
                last_completed_at: None,
            }))
        }

        fn fetch_completion_records(
            &self,
            _module_id: &str,
            _user_id: &str,
        ) -> Result<Vec<CompletionRecord>, EngineError> {
            Ok(vec![])
        }

        fn write_completion(
            &self,
            _resource_id: &str,
            _user_id: &str,
            _completed: bool,
        ) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn child(id: &str, position: i64) -> ChildModule {
        ChildModule {
            id: id.into(),
            slug: format!("{}-slug", id),
            title: format!("Module {}", id),
            position,
        }
    }

    #[test]
    fn complete_module_is_eligible_with_latest_date() {
        let mut graph = CannedGraph::default();
        graph.counts.insert(
            "ws".into(),
            CompletionCounts {
                incomplete_count: 0,
                last_completed_at: Some(at(9)),
            },
        );

        let result = check_eligibility(&graph, "ws", "user-1").unwrap();
        assert!(result.eligible);
        assert_eq!(result.completed_at, Some(at(9)));
    }

    #[test]
    fn incomplete_module_is_not_eligible() {
        let mut graph = CannedGraph::default();
        graph.counts.insert(
            "ws".into(),
            CompletionCounts {
                incomplete_count: 2,
                last_completed_at: Some(at(3)),
            },
        );

        let result = check_eligibility(&graph, "ws", "user-1").unwrap();
        assert!(!result.eligible);
        assert!(result.completed_at.is_none());
    }

    #[test]
    fn zero_required_leaves_is_vacuously_ineligible() {
        let graph = CannedGraph::default();
        let result = check_eligibility(&graph, "empty-root", "user-1").unwrap();
        assert!(!result.eligible);
        assert!(result.completed_at.is_none());
    }

    #[test]
    fn cohort_needs_every_child_module_eligible() {
        let mut graph = CannedGraph::default();
        graph
            .children
            .insert("cohort".into(), vec![child("m1", 0), child("m2", 1)]);
        graph.counts.insert(
            "m1".into(),
            CompletionCounts {
                incomplete_count: 0,
                last_completed_at: Some(at(5)),
            },
        );
        graph.counts.insert(
            "m2".into(),
            CompletionCounts {
                incomplete_count: 1,
                last_completed_at: None,
            },
        );

        let result = check_eligibility(&graph, "cohort", "user-1").unwrap();
        assert!(!result.eligible);
    }

    #[test]
    fn eligible_cohort_takes_latest_per_module_date() {
        let mut graph = CannedGraph::default();
        graph
            .children
            .insert("cohort".into(), vec![child("m1", 0), child("m2", 1)]);
        graph.counts.insert(
            "m1".into(),
            CompletionCounts {
                incomplete_count: 0,
                last_completed_at: Some(at(5)),
            },
        );
        graph.counts.insert(
            "m2".into(),
            CompletionCounts {
                incomplete_count: 0,
                last_completed_at: Some(at(17)),
            },
        );

        let result = check_eligibility(&graph, "cohort", "user-1").unwrap();
        assert!(result.eligible);
        assert_eq!(result.completed_at, Some(at(17)));
    }
}

//! Progress service - authoritative progress reads and the optimistic
//! write-through
//!
//! The read side recomputes the authoritative aggregate from the graph.
//! The write side is fire-and-forget: the caller's optimistic state has
//! already advanced via the reducer, so the persistence write runs on a
//! detached task whose failure is logged and broadcast, never surfaced to
//! the UI action handler. No retry; a failed write leaves client and
//! server diverged until the next authoritative fetch.

use std::sync::Arc;

use tracing::warn;

use crate::error::EngineError;
use crate::events::{EngineEvent, EventBus};
use crate::graph::{ModuleKind, ResourceGraph};
use crate::navigation::build_navigation;
use crate::progress::{compute_progress, ModuleProgress};

/// Progress service
pub struct ProgressService {
    graph: Arc<dyn ResourceGraph>,
    events: Arc<EventBus>,
}

impl ProgressService {
    /// Create a new progress service
    pub fn new(graph: Arc<dyn ResourceGraph>, events: Arc<EventBus>) -> Self {
        Self { graph, events }
    }

    /// Compute the authoritative progress aggregate for a module and user
    ///
    /// `Ok(None)` when the module is absent. The result replaces any
    /// optimistic shadow the client holds; it is never merged.
    pub fn module_progress(
        &self,
        module: &str,
        kind: ModuleKind,
        user_id: &str,
    ) -> Result<Option<ModuleProgress>, EngineError> {
        let rows = self.graph.fetch_module_subtree(module, kind)?;
        let Some(navigation) = build_navigation(&rows) else {
            return Ok(None);
        };

        let records = self.graph.fetch_completion_records(&navigation.id, user_id)?;
        Ok(Some(compute_progress(&navigation, records)))
    }

    /// Persist a completion toggle without blocking the caller
    ///
    /// Returns the task handle so tests (and shutdown paths) can await
    /// the write; UI-facing callers drop it. There is no cancellation:
    /// once dispatched the write runs to completion or failure
    /// independently of subsequent navigation.
    pub fn write_completion(
        &self,
        resource_id: &str,
        user_id: &str,
        completed: bool,
    ) -> tokio::task::JoinHandle<()> {
        let graph = self.graph.clone();
        let events = self.events.clone();
        let resource_id = resource_id.to_string();
        let user_id = user_id.to_string();

        tokio::spawn(async move {
            match graph.write_completion(&resource_id, &user_id, completed) {
                Ok(()) => {
                    let event = if completed {
                        EngineEvent::CompletionRecorded {
                            resource_id,
                            user_id,
                        }
                    } else {
                        EngineEvent::CompletionRemoved {
                            resource_id,
                            user_id,
                        }
                    };
                    events.emit(event);
                }
                Err(e) => {
                    warn!(
                        resource = %resource_id,
                        user = %user_id,
                        error = %e,
                        "Completion write-through failed; state diverged until next refetch"
                    );
                    events.emit(EngineEvent::CompletionWriteFailed {
                        resource_id,
                        user_id,
                        reason: e.to_string(),
                    });
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ChildModule, CompletionCounts, CompletionRecord, SubtreeRow};
    use std::sync::Mutex;

    /// Graph whose writes either land in a log or fail on demand
    struct WriteProbeGraph {
        fail_writes: bool,
        written: Mutex<Vec<(String, String, bool)>>,
    }

    impl WriteProbeGraph {
        fn new(fail_writes: bool) -> Self {
            Self {
                fail_writes,
                written: Mutex::new(vec![]),
            }
        }
    }

    impl ResourceGraph for WriteProbeGraph {
        fn fetch_module_subtree(
            &self,
            _module: &str,
            _kind: ModuleKind,
        ) -> Result<Vec<SubtreeRow>, EngineError> {
            Ok(vec![])
        }

        fn fetch_child_modules(&self, _root_id: &str) -> Result<Vec<ChildModule>, EngineError> {
            Ok(vec![])
        }

        fn fetch_completion_counts(
            &self,
            _root_id: &str,
            _user_id: &str,
        ) -> Result<CompletionCounts, EngineError> {
            Ok(CompletionCounts {
                incomplete_count: 0,
                last_completed_at: None,
            })
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
            resource_id: &str,
            user_id: &str,
            completed: bool,
        ) -> Result<(), EngineError> {
            if self.fail_writes {
                return Err(EngineError::Internal("disk on fire".into()));
            }
            self.written.lock().unwrap().push((
                resource_id.to_string(),
                user_id.to_string(),
                completed,
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn write_through_persists_and_emits() {
        let graph = Arc::new(WriteProbeGraph::new(false));
        let events = Arc::new(EventBus::new());
        let mut receiver = events.subscribe();
        let service = ProgressService::new(graph.clone(), events);

        service
            .write_completion("l1", "user-1", true)
            .await
            .unwrap();

        assert_eq!(
            graph.written.lock().unwrap().as_slice(),
            &[("l1".to_string(), "user-1".to_string(), true)]
        );
        match receiver.try_recv().unwrap() {
            EngineEvent::CompletionRecorded { resource_id, .. } => assert_eq!(resource_id, "l1"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_write_is_observable_but_not_an_error() {
        let graph = Arc::new(WriteProbeGraph::new(true));
        let events = Arc::new(EventBus::new());
        let mut receiver = events.subscribe();
        let service = ProgressService::new(graph, events);

        // The task itself completes cleanly; failure shows up on the bus.
        service
            .write_completion("l1", "user-1", true)
            .await
            .unwrap();

        match receiver.try_recv().unwrap() {
            EngineEvent::CompletionWriteFailed { resource_id, reason, .. } => {
                assert_eq!(resource_id, "l1");
                assert!(reason.contains("disk on fire"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn removal_emits_completion_removed() {
        let graph = Arc::new(WriteProbeGraph::new(false));
        let events = Arc::new(EventBus::new());
        let mut receiver = events.subscribe();
        let service = ProgressService::new(graph, events);

        service
            .write_completion("l1", "user-1", false)
            .await
            .unwrap();

        match receiver.try_recv().unwrap() {
            EngineEvent::CompletionRemoved { resource_id, .. } => assert_eq!(resource_id, "l1"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn absent_module_progress_is_none() {
        let graph = Arc::new(WriteProbeGraph::new(false));
        let service = ProgressService::new(graph, Arc::new(EventBus::new()));

        let progress = service
            .module_progress("nope", ModuleKind::Workshop, "user-1")
            .unwrap();
        assert!(progress.is_none());
    }
}

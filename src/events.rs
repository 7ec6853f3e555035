//! Event system for engine operations
//!
//! Broadcast bus for notifying listeners about navigation builds and
//! completion-log writes. Useful for:
//! - Audit logging
//! - Cache invalidation
//! - Detecting client/server completion desync (failed write-throughs)

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Events emitted by the engine services
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A navigation tree was built from the graph (cache miss)
    NavigationBuilt {
        module_id: String,
        leaf_count: usize,
    },

    /// A completion record was persisted
    CompletionRecorded {
        resource_id: String,
        user_id: String,
    },

    /// A completion record was removed
    CompletionRemoved {
        resource_id: String,
        user_id: String,
    },

    /// A write-through failed; client and server state have diverged
    /// until the next authoritative fetch
    CompletionWriteFailed {
        resource_id: String,
        user_id: String,
        reason: String,
    },
}

/// Trait for event listeners
pub trait EventListener: Send + Sync {
    /// Handle an event
    fn on_event(&self, event: &EngineEvent);
}

/// Event bus for broadcasting engine events
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new event bus with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: EngineEvent) {
        trace!(event = ?event, "Emitting engine event");
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging event listener for audit trails
pub struct LoggingEventListener;

impl EventListener for LoggingEventListener {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::NavigationBuilt { module_id, leaf_count } => {
                debug!(module_id = %module_id, leaves = leaf_count, "Navigation built");
            }
            EngineEvent::CompletionRecorded { resource_id, user_id } => {
                debug!(resource = %resource_id, user = %user_id, "Completion recorded");
            }
            EngineEvent::CompletionRemoved { resource_id, user_id } => {
                debug!(resource = %resource_id, user = %user_id, "Completion removed");
            }
            EngineEvent::CompletionWriteFailed {
                resource_id,
                user_id,
                reason,
            } => {
                warn!(
                    resource = %resource_id,
                    user = %user_id,
                    reason = %reason,
                    "Completion write-through failed"
                );
            }
        }
    }
}

/// Spawn a background task that logs all events
pub fn spawn_logging_listener(event_bus: Arc<EventBus>) -> tokio::task::JoinHandle<()> {
    let mut receiver = event_bus.subscribe();
    let listener = LoggingEventListener;

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => listener.on_event(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(skipped = n, "Event listener lagged, skipped events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed, stopping listener");
                    break;
                }
            }
        }
    })
}

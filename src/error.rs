//! Error types for the curricula engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Completion write failed for resource {resource_id} (user {user_id}): {reason}")]
    WriteFailed {
        resource_id: String,
        user_id: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

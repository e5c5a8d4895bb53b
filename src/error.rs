//! Error types and handling
//!
//! Common error types used across the orchestrator.

use thiserror::Error;

/// Orchestrator-wide error type
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no {task_kind} capture mapping for {os}")]
    UnsupportedPlatform {
        os: &'static str,
        task_kind: &'static str,
    },

    #[error("failed to launch encoder for {label}: {source}")]
    Launch {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid capture task: {0}")]
    InvalidTask(String),

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording process could be started")]
    NothingStarted,
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;

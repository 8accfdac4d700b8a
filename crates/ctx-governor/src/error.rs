//! Typed error hierarchy for the governor.
//!
//! Configuration errors are fatal at setup time. [`GovernorError::RegressedUsage`]
//! is returned per call and leaves session state untouched. Nothing in this
//! crate terminates the caller's process.

use thiserror::Error;

/// Errors produced by the governor.
#[derive(Debug, Error)]
pub enum GovernorError {
    #[error("session capacity must be positive, got {capacity}")]
    InvalidCapacity { capacity: u64 },

    #[error("unknown task profile '{name}' (expected one of: {expected})")]
    UnknownProfile { name: String, expected: String },

    #[error("reported usage {reported} is below tracked usage {current}; reset the session first")]
    RegressedUsage { current: u64, reported: u64 },

    #[error("invalid governor configuration: {0}")]
    InvalidConfig(String),

    #[error("session '{0}' is not registered")]
    UnknownSession(String),

    #[error("session '{0}' is already registered")]
    DuplicateSession(String),

    #[error("acknowledgment for epoch {acknowledged} does not match pending checkpoint epoch {pending}")]
    EpochMismatch { pending: u64, acknowledged: u64 },

    #[error("checkpoint sink error: {0}")]
    Sink(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GovernorError>;

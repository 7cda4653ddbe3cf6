//! Error types for arplace-rs.

use thiserror::Error;

/// The main error type for arplace-rs operations.
///
/// Placement queries never produce errors; a missing surface is reported as an
/// absent value. Errors are reserved for configuration, I/O and session-level
/// failures.
#[derive(Error, Debug)]
pub enum ArPlaceError {
    /// An option value is out of range or inconsistent with another option.
    #[error("invalid option '{field}': {reason}")]
    InvalidOption {
        field: &'static str,
        reason: String,
    },

    /// The AR session reported a failure it cannot recover from by itself.
    #[error("AR session failed: {0}")]
    SessionFailed(String),

    /// The scene update queue worker is no longer running.
    #[error("scene update queue is closed")]
    QueueClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for arplace-rs operations.
pub type Result<T> = std::result::Result<T, ArPlaceError>;

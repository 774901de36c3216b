//! Error types for talking to the connection manager.
//!
//! Query failures propagate to the caller; command failures are logged by
//! whoever spawned the command and never reach the reconciliation path.

use thiserror::Error;

/// Failure reported by a [`ConnectionSource`](crate::core::ConnectionSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Malformed {what} line: {line:?}")]
    Malformed { what: &'static str, line: String },

    #[error("Event subscription failed: {message}")]
    Subscription { message: String },
}

//! Session error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned to `open_session` callers.
///
/// Everything that goes wrong inside a running session is reported through
/// the session result instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A session is already active")]
    AlreadyActive,
}

/// Payload persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No free file name for {0}")]
    NameExhausted(String),
}

/// External program launch errors.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("A session is already active")]
    AlreadyActive,

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited abnormally: {status}")]
    Exit { program: String, status: String },
}

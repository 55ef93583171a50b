//! Host window errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host window not found: {0}")]
    NotFound(String),

    #[error("Host window operation failed: {0}")]
    OperationFailed(String),

    #[error("Host window control not supported on this platform")]
    PlatformNotSupported,
}

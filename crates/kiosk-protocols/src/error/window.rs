//! Session window errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("Failed to open session window: {0}")]
    OpenFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Request interception failed: {0}")]
    Interception(String),

    #[error("Session window is closed")]
    Closed,

    #[error("Browser error: {0}")]
    Browser(String),
}

impl WindowError {
    /// Whether the error means the window is gone for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, WindowError::Closed)
    }
}

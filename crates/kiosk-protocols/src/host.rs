//! Host window protocol.
//!
//! The host window is the application's primary control surface. It is
//! hidden while a kiosk session is active and restored when it ends. Only the
//! session controller calls these methods.

use async_trait::async_trait;

use crate::error::HostError;

/// The application's primary window.
///
/// Implementations that shell out to platform tools must not block the
/// calling task.
#[async_trait]
pub trait HostWindow: Send + Sync {
    /// Hide the host window.
    async fn hide(&self) -> Result<(), HostError>;

    /// Make the host window visible again.
    async fn show(&self) -> Result<(), HostError>;

    /// Give the host window input focus.
    async fn focus(&self) -> Result<(), HostError> {
        Ok(())
    }
}

//! Host adapter for running without a host window.

use async_trait::async_trait;
use kiosk_protocols::{HostError, HostWindow};
use tracing::debug;

/// Host adapter with no window behind it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

#[async_trait]
impl HostWindow for NullHost {
    async fn hide(&self) -> Result<(), HostError> {
        debug!("No host window to hide");
        Ok(())
    }

    async fn show(&self) -> Result<(), HostError> {
        debug!("No host window to show");
        Ok(())
    }
}

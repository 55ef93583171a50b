//! Host visibility guard.

use std::sync::Arc;

use kiosk_protocols::HostWindow;
use tracing::{debug, warn};

/// Keeps the host window hidden while held.
///
/// Visibility is restored exactly once: by [`restore`](Self::restore) or, if
/// that never ran, by a task spawned on drop.
pub struct HostGuard {
    host: Arc<dyn HostWindow>,
    restored: bool,
}

impl HostGuard {
    /// Arm a guard for `host` without touching its visibility yet.
    pub fn new(host: Arc<dyn HostWindow>) -> Self {
        Self {
            host,
            restored: false,
        }
    }

    /// Hide the host window.
    pub async fn hide(&self) {
        match self.host.hide().await {
            Ok(()) => debug!("Host window hidden"),
            Err(e) => warn!("Failed to hide host window: {}", e),
        }
    }

    /// Show and focus the host window.
    pub async fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        restore_host(self.host.as_ref()).await;
    }
}

async fn restore_host(host: &dyn HostWindow) {
    if let Err(e) = host.show().await {
        warn!("Failed to show host window: {}", e);
    }
    if let Err(e) = host.focus().await {
        debug!("Failed to focus host window: {}", e);
    }
    debug!("Host window restored");
}

impl Drop for HostGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let host = self.host.clone();
                runtime.spawn(async move { restore_host(host.as_ref()).await });
            }
            Err(_) => warn!("No runtime left to restore the host window"),
        }
    }
}

//! Host window adapters for the kiosk launcher.
//!
//! - [`DesktopHost`] hides and restores an existing desktop window by title,
//!   using `wmctrl` on Linux and `osascript` on macOS.
//! - [`NullHost`] does nothing; used when the launcher runs without a host
//!   window (plain CLI use, tests).

mod desktop;
mod null;

use std::sync::Arc;

use kiosk_protocols::HostWindow;

pub use desktop::{DesktopHost, HostAction, HostCommand};
pub use null::NullHost;

/// Pick the host adapter for an optional window title.
pub fn host_for(window_title: Option<&str>) -> Arc<dyn HostWindow> {
    match window_title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => Arc::new(DesktopHost::new(title)),
        None => Arc::new(NullHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_host_for_without_title_is_noop() {
        let host = host_for(None);
        assert!(host.hide().await.is_ok());
        assert!(host.show().await.is_ok());

        let host = host_for(Some("   "));
        assert!(host.focus().await.is_ok());
    }
}

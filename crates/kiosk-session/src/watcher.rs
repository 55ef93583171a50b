//! Completion watcher: turns page signals into completion triggers.

use std::time::Duration;

use kiosk_config::CompletionConfig;
use kiosk_protocols::{SessionWindow, WindowError, WindowEvent};
use tracing::{debug, warn};

use crate::scripts::{self, EXIT_BINDING, EXIT_CONTROL_PAYLOAD, EXIT_KEY_PAYLOAD, WatcherPlan};

/// A cause for ending the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionTrigger {
    /// The page logged the completion marker.
    Marker,
    /// The exit key was pressed in the session window.
    Escape,
    /// A hooked exit control was actuated.
    ExitControl,
    /// The host asked for the session to close.
    CloseRequested,
}

impl CompletionTrigger {
    /// Stable result reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Marker => "completion-signal",
            Self::Escape => "user-escape",
            Self::ExitControl => "exit-control",
            Self::CloseRequested => "close-requested",
        }
    }

    /// Whether teardown waits for the grace delay.
    pub fn is_graceful(&self) -> bool {
        matches!(self, Self::Marker)
    }
}

impl std::fmt::Display for CompletionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Watches one session window for completion signals.
pub struct CompletionWatcher {
    marker: String,
    grace_delay: Duration,
    plan: WatcherPlan,
}

impl CompletionWatcher {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            marker: config.marker.clone(),
            grace_delay: Duration::from_millis(config.grace_delay_ms),
            plan: WatcherPlan::new(config),
        }
    }

    pub fn grace_delay(&self) -> Duration {
        self.grace_delay
    }

    /// Expose the exit binding and register the watcher script for every
    /// document the window loads.
    pub async fn install(&self, window: &dyn SessionWindow) -> Result<(), WindowError> {
        window.expose_binding(EXIT_BINDING).await?;
        let script = scripts::watcher_script(&self.plan)
            .map_err(|e| WindowError::Script(e.to_string()))?;
        window.add_init_script(&script).await?;
        debug!("Completion watcher installed on window {}", window.id());
        Ok(())
    }

    /// Disconnect the exit-control observer in the current document.
    pub async fn uninstall(&self, window: &dyn SessionWindow) {
        if let Err(e) = window.evaluate(scripts::WATCHER_TEARDOWN).await {
            debug!("Watcher teardown skipped: {}", e);
        }
    }

    /// Classify a window event.
    pub fn classify(&self, event: &WindowEvent) -> Option<CompletionTrigger> {
        match event {
            WindowEvent::Console(message) => {
                if !self.marker.is_empty() && message.text.contains(&self.marker) {
                    Some(CompletionTrigger::Marker)
                } else {
                    None
                }
            }
            WindowEvent::Binding(call) if call.name == EXIT_BINDING => {
                match call.payload.as_str() {
                    EXIT_KEY_PAYLOAD => Some(CompletionTrigger::Escape),
                    EXIT_CONTROL_PAYLOAD => Some(CompletionTrigger::ExitControl),
                    other => {
                        warn!("Unknown exit binding payload: {}", other);
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

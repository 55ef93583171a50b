//! Session window protocol definitions.
//!
//! A session window is the isolated, full-screen browser surface showing the
//! remote kiosk page. Each window is created fresh for one session and is
//! never reopened once closed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::WindowError;
use crate::request::InterceptedRequest;

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;

/// A message the page wrote to its console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// Console level ("log", "info", "warning", "error", ...).
    pub level: String,
    /// Arguments joined into one line of text.
    pub text: String,
}

impl ConsoleMessage {
    pub fn new(level: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            text: text.into(),
        }
    }
}

/// A call from page script into a host-exposed binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingCall {
    /// Binding name as exposed on `window`.
    pub name: String,
    /// The single string argument the page passed.
    pub payload: String,
}

impl BindingCall {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

/// Events observed on a session window.
#[derive(Debug, Clone)]
pub enum WindowEvent {
    /// The top-level document finished loading.
    Loaded,
    /// The page logged to its console.
    Console(ConsoleMessage),
    /// An outgoing request is paused and waiting to be continued.
    Request(InterceptedRequest),
    /// Page script invoked an exposed binding.
    Binding(BindingCall),
    /// The window was destroyed.
    Closed,
}

/// One live session window.
///
/// Implementations must be cheap to share behind an `Arc`; all methods take
/// `&self`.
#[async_trait]
pub trait SessionWindow: Send + Sync {
    /// Stable identifier of the underlying window/target.
    fn id(&self) -> &str;

    /// Begin navigating the window to `url` and wait for the load to settle.
    async fn navigate(&self, url: &str) -> Result<(), WindowError>;

    /// Evaluate a script in the page and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<Value, WindowError>;

    /// Register a script that runs in every new document before page scripts.
    async fn add_init_script(&self, source: &str) -> Result<(), WindowError>;

    /// Expose a function on `window` whose calls arrive as [`WindowEvent::Binding`].
    async fn expose_binding(&self, name: &str) -> Result<(), WindowError>;

    /// Start pausing outgoing requests so they arrive as [`WindowEvent::Request`].
    async fn intercept_requests(&self) -> Result<(), WindowError>;

    /// Let a paused request proceed unmodified.
    async fn continue_request(&self, request_id: &str) -> Result<(), WindowError>;

    /// Close the window. Closing an already-closed window is a no-op.
    async fn close(&self) -> Result<(), WindowError>;

    /// Take the event stream. Returns `None` after the first call.
    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<WindowEvent>>;
}

/// Creates session windows.
#[async_trait]
pub trait WindowLauncher: Send + Sync {
    /// Create a new, blank session window.
    async fn open_window(&self) -> Result<Arc<dyn SessionWindow>, WindowError>;
}

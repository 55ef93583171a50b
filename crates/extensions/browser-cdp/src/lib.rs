//! Session windows for the kiosk launcher, driven over the Chrome DevTools
//! Protocol (CDP).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │ kiosk launcher  │ ◄──────────────► │  Chrome / Edge   │
//! │  (this crate)   │       CDP        │  (kiosk window)  │
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! [`ChromeLauncher`] starts (or attaches to) Chrome with remote debugging
//! enabled and creates one fresh, full-screen target per session. Each target
//! is wrapped in a [`CdpWindow`], which implements
//! [`kiosk_protocols::SessionWindow`] and translates CDP events
//! (`Page.loadEventFired`, `Runtime.consoleAPICalled`, `Runtime.bindingCalled`,
//! `Fetch.requestPaused`, target detach) into [`kiosk_protocols::WindowEvent`]s.
//!
//! ## Manual setup
//!
//! To reuse an already running browser, start it with remote debugging:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222 --kiosk
//! ```

pub mod cdp;
pub mod launcher;
mod window;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use launcher::{BrowserError, ChromeLauncher, LauncherConfig};
pub use window::CdpWindow;

//! Browser process management and session window creation.
//!
//! [`ChromeLauncher`] attaches to a browser already listening on the debug
//! port, or launches one with a dedicated kiosk profile.

mod launcher_core;
mod launcher_types;

pub use launcher_core::ChromeLauncher;
pub use launcher_types::{BrowserError, LauncherConfig};

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;

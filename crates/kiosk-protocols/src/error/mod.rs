//! Error types for the kiosk protocol layer.

mod host;
mod window;

pub use host::*;
pub use window::*;

//! # Kiosk Protocols
//!
//! Core protocol definitions for the kiosk launcher.
//! Contains only interface definitions and shared data types - no implementations.
//!
//! ## Core Traits
//!
//! - [`SessionWindow`] - One live, isolated browser window showing the kiosk page
//! - [`WindowLauncher`] - Creates fresh session windows
//! - [`HostWindow`] - The application's primary surface, hidden during a session

pub mod error;
pub mod host;
pub mod request;
pub mod session;
pub mod window;

pub use error::{HostError, WindowError};
pub use host::HostWindow;
pub use request::InterceptedRequest;
pub use session::{CapturedPayload, SessionOutcome, SessionRequest, SessionResult};
pub use window::{BindingCall, ConsoleMessage, SessionWindow, WindowEvent, WindowLauncher};

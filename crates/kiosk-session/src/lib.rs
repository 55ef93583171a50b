//! # Kiosk Session
//!
//! Orchestration of one kiosk browser session.
//!
//! [`KioskController`] hides the host window, opens a fresh session window and
//! runs three observers against it until exactly one [`SessionResult`] can be
//! produced:
//!
//! - [`FieldInjector`] waits for the form fields and pre-fills them once.
//! - [`TrafficInterceptor`] continues every outgoing request and captures the
//!   result submission.
//! - [`CompletionWatcher`] turns console markers and exit gestures into
//!   [`CompletionTrigger`]s that race through a [`CompletionLatch`].
//!
//! Captured payloads are written by the [`PayloadStore`] before the session
//! resolves.
//!
//! [`SessionResult`]: kiosk_protocols::SessionResult

mod controller;
mod error;
mod host;
mod injector;
mod interceptor;
mod latch;
pub mod scripts;
mod store;
mod watcher;

#[cfg(test)]
mod testing;

pub use controller::{KioskController, SessionCloser, SessionSettings, SessionState};
pub use error::{LaunchError, SessionError, StoreError};
pub use host::HostGuard;
pub use injector::{FieldInjector, InjectionOutcome, InjectionReport, PollSchedule};
pub use interceptor::{RequestMatcher, TrafficInterceptor};
pub use latch::CompletionLatch;
pub use store::PayloadStore;
pub use watcher::{CompletionTrigger, CompletionWatcher};

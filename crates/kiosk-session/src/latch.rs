//! One-shot completion latch.
//!
//! Completion triggers race through the latch: the first trigger fixes the
//! session result, later ones only request teardown. Teardown itself is a
//! cancellation token so any number of waiters can observe it.

use std::sync::OnceLock;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::watcher::CompletionTrigger;

#[derive(Debug, Default)]
pub struct CompletionLatch {
    winner: OnceLock<CompletionTrigger>,
    teardown: CancellationToken,
}

impl CompletionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `trigger` if no trigger fired yet. Returns whether it won.
    pub fn fire(&self, trigger: CompletionTrigger) -> bool {
        self.winner.set(trigger).is_ok()
    }

    /// The trigger that won the race, if any.
    pub fn winner(&self) -> Option<CompletionTrigger> {
        self.winner.get().copied()
    }

    /// Ask the session to tear down. Idempotent.
    pub fn request_teardown(&self) {
        self.teardown.cancel();
    }

    pub fn is_tearing_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Resolves once teardown has been requested.
    pub fn teardown_requested(&self) -> WaitForCancellationFuture<'_> {
        self.teardown.cancelled()
    }
}

//! Field injector: waits for the form to render, then pre-fills it once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use kiosk_config::InjectionConfig;
use kiosk_protocols::{SessionRequest, SessionWindow};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::scripts::{self, InjectionPlan};

/// Bounded poll schedule.
///
/// Yields attempt numbers `1..=max_attempts`, then stays exhausted.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl PollSchedule {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            attempt: 0,
        }
    }

    pub fn from_config(config: &InjectionConfig) -> Self {
        Self::new(
            Duration::from_millis(config.poll_interval_ms),
            config.max_attempts,
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Attempts handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Whether the budget is used up.
    pub fn gave_up(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

impl Iterator for PollSchedule {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.gave_up() {
            return None;
        }
        self.attempt += 1;
        Some(self.attempt)
    }
}

/// What the fill script reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InjectionReport {
    /// Keys of the fields that were written.
    #[serde(default)]
    pub filled: Vec<String>,
    /// Synthetic events dispatched.
    #[serde(default)]
    pub events: u32,
    /// Whether the checkbox was clicked.
    #[serde(default)]
    pub checkbox: bool,
}

/// How an injection run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    Injected { attempt: u32, report: InjectionReport },
    /// All required fields never appeared together.
    GaveUp { attempts: u32 },
    /// The session tore down first.
    Cancelled,
    /// Injection already ran for this session.
    AlreadyInjected,
    /// The fill script failed. Not retried.
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    ready: bool,
    #[serde(default)]
    missing: Vec<String>,
}

/// Pre-fills one session window.
pub struct FieldInjector {
    window: Arc<dyn SessionWindow>,
    plan: InjectionPlan,
    schedule: PollSchedule,
    injected: AtomicBool,
}

impl FieldInjector {
    pub fn new(
        window: Arc<dyn SessionWindow>,
        config: &InjectionConfig,
        request: &SessionRequest,
    ) -> Self {
        Self {
            window,
            plan: InjectionPlan::new(config, request),
            schedule: PollSchedule::from_config(config),
            injected: AtomicBool::new(false),
        }
    }

    pub fn plan(&self) -> &InjectionPlan {
        &self.plan
    }

    /// Poll until every required field is present, then fill once.
    ///
    /// Each tick waits one interval before probing. Probe errors count as a
    /// "not ready" tick.
    pub async fn run(&self, cancel: CancellationToken) -> InjectionOutcome {
        if self.injected.load(Ordering::SeqCst) {
            return InjectionOutcome::AlreadyInjected;
        }

        let probe = match scripts::probe_script(&self.plan) {
            Ok(script) => script,
            Err(e) => return InjectionOutcome::Failed(e.to_string()),
        };

        let mut schedule = self.schedule.clone();
        let interval = schedule.interval();
        debug!(
            "Waiting for form fields; will write {:?}",
            self.plan.writable_keys()
        );

        while let Some(attempt) = schedule.next() {
            tokio::select! {
                _ = cancel.cancelled() => return InjectionOutcome::Cancelled,
                _ = tokio::time::sleep(interval) => {}
            }

            let ready = tokio::select! {
                _ = cancel.cancelled() => return InjectionOutcome::Cancelled,
                result = self.window.evaluate(&probe) => result,
            };

            match ready.map(serde_json::from_value::<ProbeReport>) {
                Ok(Ok(report)) if report.ready => {
                    debug!("Form ready after {} attempt(s)", attempt);
                    return self.fill(attempt).await;
                }
                Ok(Ok(report)) => {
                    debug!("Attempt {}: waiting for {:?}", attempt, report.missing);
                }
                Ok(Err(e)) => debug!("Attempt {}: unexpected probe result: {}", attempt, e),
                Err(e) => debug!("Attempt {}: probe failed: {}", attempt, e),
            }
        }

        warn!(
            "Form fields not found after {} attempts; skipping pre-fill",
            schedule.attempts()
        );
        InjectionOutcome::GaveUp {
            attempts: schedule.attempts(),
        }
    }

    async fn fill(&self, attempt: u32) -> InjectionOutcome {
        if self.injected.swap(true, Ordering::SeqCst) {
            return InjectionOutcome::AlreadyInjected;
        }

        let script = match scripts::fill_script(&self.plan) {
            Ok(script) => script,
            Err(e) => return InjectionOutcome::Failed(e.to_string()),
        };

        match self.window.evaluate(&script).await {
            Ok(value) => {
                let report: InjectionReport = serde_json::from_value(value).unwrap_or_default();
                info!(
                    "Pre-filled {:?} (checkbox ticked: {})",
                    report.filled, report.checkbox
                );
                InjectionOutcome::Injected { attempt, report }
            }
            Err(e) => {
                warn!("Pre-fill script failed: {}", e);
                InjectionOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "injector_tests.rs"]
mod tests;

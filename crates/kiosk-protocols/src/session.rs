//! Session request/result types shared between the controller and its callers.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

/// A request to run one kiosk session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Page to show in the session window.
    pub target_url: String,
    /// Values to pre-fill, keyed by logical field name (e.g. `firstName`).
    #[serde(default)]
    pub prefill_data: HashMap<String, String>,
}

impl SessionRequest {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            prefill_data: HashMap::new(),
        }
    }

    /// Add a prefill value.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.prefill_data.insert(key.into(), value.into());
        self
    }

    /// Replace the prefill map.
    pub fn with_prefill(mut self, data: HashMap<String, String>) -> Self {
        self.prefill_data = data;
        self
    }

    /// Non-empty prefill value for `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.prefill_data
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Finished,
    Failed,
}

/// The single result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub outcome: SessionOutcome,
    pub reason: String,
    /// Files written for payloads captured during the session.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saved_files: Vec<PathBuf>,
}

impl SessionResult {
    pub fn finished(reason: impl Into<String>) -> Self {
        Self {
            outcome: SessionOutcome::Finished,
            reason: reason.into(),
            saved_files: Vec::new(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            outcome: SessionOutcome::Failed,
            reason: reason.into(),
            saved_files: Vec::new(),
        }
    }

    pub fn with_saved_files(mut self, files: Vec<PathBuf>) -> Self {
        self.saved_files = files;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.outcome == SessionOutcome::Finished
    }
}

/// A structured payload decoded from an intercepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPayload {
    pub received_at: DateTime<Utc>,
    /// URL of the request the payload was taken from.
    pub url: String,
    pub body: Value,
}

impl CapturedPayload {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            received_at: Utc::now(),
            url: url.into(),
            body,
        }
    }
}

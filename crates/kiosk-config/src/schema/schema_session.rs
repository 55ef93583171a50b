//! Session behaviour configuration: injection, interception and completion.

use serde::{Deserialize, Serialize};

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Page opened when the caller does not supply a URL.
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// How long to keep draining events after teardown was requested.
    #[serde(default = "default_close_timeout_ms")]
    pub close_timeout_ms: u64,
}

fn default_target_url() -> String {
    "https://kiosk.oscilla.app/".to_string()
}

fn default_close_timeout_ms() -> u64 {
    5000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            close_timeout_ms: default_close_timeout_ms(),
        }
    }
}

/// One injectable form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Key into the session's prefill data (e.g. `firstName`).
    pub key: String,

    /// CSS selector locating the input.
    pub selector: String,

    /// Injection waits until every required field is present.
    #[serde(default)]
    pub required: bool,

    /// Strip the `readonly` attribute before writing.
    #[serde(default)]
    pub readonly: bool,
}

impl FieldConfig {
    pub fn new(key: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            selector: selector.into(),
            required: false,
            readonly: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// Field injection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionConfig {
    /// Delay between polls for the form fields.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Polls before injection gives up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Consent checkbox to tick; empty string disables it.
    #[serde(
        default = "default_checkbox_selector",
        skip_serializing_if = "Option::is_none"
    )]
    pub checkbox_selector: Option<String>,

    #[serde(default = "default_fields")]
    pub fields: Vec<FieldConfig>,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_max_attempts() -> u32 {
    40
}

fn default_fields() -> Vec<FieldConfig> {
    vec![
        FieldConfig::new("firstName", r#"input[name="FirstName"]"#).required(),
        FieldConfig::new("lastName", r#"input[name="LastName"]"#).required(),
        FieldConfig::new("email", r#"input[name="Email"]"#).required(),
        FieldConfig::new("dateOfBirth", r#"input[name="DateOfBirth"]"#).readonly(),
    ]
}

fn default_checkbox_selector() -> Option<String> {
    Some(r#"input[type="checkbox"]"#.to_string())
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            checkbox_selector: default_checkbox_selector(),
            fields: default_fields(),
        }
    }
}

/// Outgoing request matching configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptionConfig {
    /// Substring the submission URL must contain.
    #[serde(default = "default_url_contains")]
    pub url_contains: String,

    /// Top-level keys the JSON body must have.
    #[serde(default = "default_required_keys")]
    pub required_keys: Vec<String>,

    /// Methods considered for matching.
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    /// Also accept bodies with the required keys sent to any URL.
    /// Prone to capturing unrelated traffic.
    #[serde(default)]
    pub broad_fallback: bool,
}

fn default_url_contains() -> String {
    "/api/oscilla/sendresult".to_string()
}

fn default_required_keys() -> Vec<String> {
    vec!["Id".to_string(), "CustomerName".to_string()]
}

fn default_methods() -> Vec<String> {
    vec!["POST".to_string(), "PUT".to_string()]
}

impl Default for InterceptionConfig {
    fn default() -> Self {
        Self {
            url_contains: default_url_contains(),
            required_keys: default_required_keys(),
            methods: default_methods(),
            broad_fallback: false,
        }
    }
}

/// Completion trigger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Console text that signals the page finished successfully.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Delay between the marker and closing the window.
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,

    /// `KeyboardEvent.key` value that ends the session.
    #[serde(default = "default_exit_key")]
    pub exit_key: String,

    /// Visible texts of controls that end the session (case-insensitive).
    #[serde(default = "default_exit_phrases")]
    pub exit_phrases: Vec<String>,
}

fn default_marker() -> String {
    "Successfully sent data to API".to_string()
}

fn default_grace_delay_ms() -> u64 {
    5000
}

fn default_exit_key() -> String {
    "Escape".to_string()
}

fn default_exit_phrases() -> Vec<String> {
    ["Exit", "Close", "Sulje", "Poistu", "Lopeta"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            grace_delay_ms: default_grace_delay_ms(),
            exit_key: default_exit_key(),
            exit_phrases: default_exit_phrases(),
        }
    }
}

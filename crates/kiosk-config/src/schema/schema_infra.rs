//! Browser, host, storage and logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{app_home_dir, default_true};

/// Browser (Chrome) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    /// Explicit Chrome executable; auto-detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// Profile directory for the kiosk browser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<PathBuf>,

    /// Run Chrome headless (tests and CI only).
    #[serde(default)]
    pub headless: bool,

    /// Put each session window into full-screen state.
    #[serde(default = "default_true")]
    pub fullscreen: bool,

    /// Launch Chrome with `--kiosk` (frameless, no browser UI).
    #[serde(default = "default_true")]
    pub kiosk_mode: bool,

    /// How long to wait for a freshly launched Chrome to accept connections.
    #[serde(default = "default_launch_timeout_ms")]
    pub launch_timeout_ms: u64,

    /// Extra command line arguments passed to Chrome.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_debug_port() -> u16 {
    9222
}

fn default_launch_timeout_ms() -> u64 {
    6000
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            chrome_path: None,
            profile_dir: None,
            headless: false,
            fullscreen: default_true(),
            kiosk_mode: default_true(),
            launch_timeout_ms: default_launch_timeout_ms(),
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Profile directory, defaulting to `~/.kiosk-launcher/browser-profile`.
    pub fn resolved_profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| app_home_dir().join("browser-profile"))
    }

    /// CDP HTTP endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}

/// Captured payload storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for result files; defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// File name prefix for result files.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "patient_result".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl StorageConfig {
    /// Result directory, defaulting to `<data dir>/kiosk-launcher/results`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("kiosk-launcher"))
                .unwrap_or_else(app_home_dir)
                .join("results")
        })
    }
}

/// Host window configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Title of the host window to hide during sessions. When unset the
    /// launcher runs without a host window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_title: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Number of daily log files to keep.
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
            max_log_files: default_max_log_files(),
        }
    }
}

impl LoggingConfig {
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| app_home_dir().join("logs"))
    }
}

//! Launcher type definitions and configuration.

use std::path::PathBuf;
use std::time::Duration;

use kiosk_protocols::WindowError;
use thiserror::Error;

use crate::cdp::CdpError;

/// Launcher errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome or set browser.chrome_path.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("Window creation failed: {0}")]
    WindowFailed(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::ChromeNotAvailable(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::SessionClosed => BrowserError::NotConnected,
            _ => BrowserError::WindowFailed(e.to_string()),
        }
    }
}

impl From<BrowserError> for WindowError {
    fn from(e: BrowserError) -> Self {
        WindowError::OpenFailed(e.to_string())
    }
}

/// Launcher configuration.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    /// Explicit Chrome executable; auto-detected when `None`.
    pub chrome_path: Option<PathBuf>,
    /// Profile directory for the kiosk browser.
    pub profile_dir: Option<PathBuf>,
    /// Whether to run Chrome in headless mode.
    pub headless: bool,
    /// Switch each session window to fullscreen.
    pub fullscreen: bool,
    /// Pass `--kiosk` to Chrome.
    pub kiosk_mode: bool,
    /// How long a freshly launched Chrome has to open its debug port.
    pub launch_timeout: Duration,
    /// Extra arguments appended to the Chrome command line.
    pub extra_args: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            chrome_path: None,
            profile_dir: None,
            headless: false,
            fullscreen: true,
            kiosk_mode: true,
            launch_timeout: Duration::from_secs(6),
            extra_args: Vec::new(),
        }
    }
}

impl LauncherConfig {
    /// Get the profile directory, creating default if not specified.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".kiosk-launcher")
                .join("browser-profile")
        })
    }

    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    /// Chrome command line arguments, excluding the executable.
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", self.get_profile_dir().display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
            "--disable-session-crashed-bubble".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        } else if self.kiosk_mode {
            args.push("--kiosk".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

//! ChromeLauncher: browser discovery, launch and session window creation.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use kiosk_protocols::{SessionWindow, WindowError, WindowLauncher};
use tokio::process::{Child, Command};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{BrowserError, LauncherConfig};
use crate::cdp::CdpClient;
use crate::window::CdpWindow;

const STARTUP_POLL: Duration = Duration::from_millis(200);

/// Creates kiosk session windows in a Chrome instance.
pub struct ChromeLauncher {
    config: LauncherConfig,
    client: RwLock<Option<Arc<CdpClient>>>,
    /// Chrome process handle (if we launched it).
    chrome_process: RwLock<Option<Child>>,
}

impl ChromeLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            chrome_process: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Find Chrome executable path.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            let paths = [
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        #[cfg(target_os = "linux")]
        {
            let paths = [
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
                "/usr/bin/microsoft-edge",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        #[cfg(target_os = "windows")]
        {
            let paths = [
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
            ];
            for path in &paths {
                let p = PathBuf::from(path);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        None
    }

    fn chrome_executable(&self) -> Result<PathBuf, BrowserError> {
        match &self.config.chrome_path {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => {
                warn!("Configured Chrome path {} does not exist", path.display());
                Self::find_chrome().ok_or(BrowserError::ChromeNotFound)
            }
            None => Self::find_chrome().ok_or(BrowserError::ChromeNotFound),
        }
    }

    /// Check if Chrome is already running on the debug port.
    async fn is_chrome_running(&self) -> bool {
        reqwest::get(&format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    /// Launch Chrome with remote debugging enabled.
    async fn launch_chrome(&self) -> Result<Child, BrowserError> {
        let chrome_path = self.chrome_executable()?;
        let profile_dir = self.config.get_profile_dir();

        if let Err(e) = tokio::fs::create_dir_all(&profile_dir).await {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let child = Command::new(&chrome_path)
            .args(self.config.chrome_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(format!("{}: {}", chrome_path.display(), e)))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Connect to the browser, launching it if necessary.
    pub async fn connect(&self) -> Result<Arc<CdpClient>, BrowserError> {
        if let Some(client) = self.client.read().await.as_ref() {
            if client.is_connected() {
                return Ok(client.clone());
            }
        }

        let mut slot = self.client.write().await;
        if let Some(client) = slot.as_ref() {
            if client.is_connected() {
                return Ok(client.clone());
            }
            info!("Browser connection lost, reconnecting");
        }

        if !self.is_chrome_running().await {
            info!("Chrome not running on port {}, launching...", self.config.debug_port);

            let child = self.launch_chrome().await?;
            *self.chrome_process.write().await = Some(child);

            let start = Instant::now();
            loop {
                tokio::time::sleep(STARTUP_POLL).await;
                if self.is_chrome_running().await {
                    break;
                }
                if start.elapsed() >= self.config.launch_timeout {
                    return Err(BrowserError::LaunchFailed(
                        "Chrome failed to start within timeout".to_string(),
                    ));
                }
            }
        } else {
            debug!("Chrome already running on port {}", self.config.debug_port);
        }

        let client = Arc::new(CdpClient::connect(&self.config.endpoint()).await?);
        *slot = Some(client.clone());

        info!("Connected to Chrome at {}", self.config.endpoint());
        Ok(client)
    }

    /// Create one fresh session window.
    pub async fn new_window(&self) -> Result<CdpWindow, BrowserError> {
        let client = self.connect().await?;
        let page = client.new_window(self.config.fullscreen).await?;
        info!("Opened session window {}", page.target_id());
        Ok(CdpWindow::new(page))
    }

    /// Drop the browser connection.
    pub async fn close(&self) {
        let _ = self.client.write().await.take();
        debug!("Browser connection closed");
    }

    /// Shutdown Chrome if we launched it.
    pub async fn shutdown(&self) {
        self.close().await;
        if let Some(mut child) = self.chrome_process.write().await.take() {
            info!("Shutting down Chrome...");
            let _ = child.kill().await;
        }
    }
}

#[async_trait]
impl WindowLauncher for ChromeLauncher {
    async fn open_window(&self) -> Result<Arc<dyn SessionWindow>, WindowError> {
        let window = self.new_window().await?;
        Ok(Arc::new(window))
    }
}

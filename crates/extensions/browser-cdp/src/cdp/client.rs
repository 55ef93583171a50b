//! CDP WebSocket client.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::SplitStream;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

use super::error::CdpError;
use super::protocol::BrowserVersion;
use super::session::PageSession;
use super::transport::{CdpTransport, WsStream};

type WsSource = SplitStream<WsStream>;

/// CDP client for one browser connection.
///
/// Creates session targets and hands out [`PageSession`]s that share this
/// connection.
pub struct CdpClient {
    transport: Arc<CdpTransport>,
    /// Background task handle.
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Chrome debugging endpoint (e.g., "http://localhost:9222")
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        url::Url::parse(&http_endpoint)?;

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!("Connected to browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&browser_ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let transport = Arc::new(CdpTransport::new(ws_sink));

        let recv_task = {
            let transport = transport.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, &transport).await;
                transport.shutdown();
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            transport,
            recv_task,
        })
    }

    /// WebSocket receive loop. Returns when the browser connection ends.
    async fn receive_loop(mut ws_source: WsSource, transport: &CdpTransport) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => transport.dispatch(&text),
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        warn!("Browser connection ended");
    }

    /// Send a browser-level CDP command.
    pub async fn call(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, CdpError> {
        self.transport.call(method, params, None).await
    }

    /// Whether the browser connection is still up.
    pub fn is_connected(&self) -> bool {
        !self.recv_task.is_finished()
    }

    // ========================================================================
    // Target Management
    // ========================================================================

    /// Create a fresh top-level window on `about:blank` and attach to it.
    ///
    /// With `fullscreen`, the window is switched to the fullscreen state
    /// before it is returned.
    pub async fn new_window(&self, fullscreen: bool) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.createTarget",
                Some(json!({
                    "url": "about:blank",
                    "newWindow": true
                })),
            )
            .await?;

        let target_id = result["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing targetId".to_string()))?
            .to_string();
        debug!("Created target {}", target_id);

        if fullscreen {
            if let Err(e) = self.set_fullscreen(&target_id).await {
                // Kiosk-mode browsers are already fullscreen.
                warn!("Could not switch target {} to fullscreen: {}", target_id, e);
            }
        }

        match self.attach_page(&target_id).await {
            Ok(session) => Ok(session),
            Err(e) => {
                let _ = self.close_page(&target_id).await;
                Err(e)
            }
        }
    }

    /// Attach to an existing page.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let event_rx = self.transport.subscribe(&session_id);

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            self.transport.clone(),
            event_rx,
        );

        session.enable_domains().await?;

        Ok(session)
    }

    async fn set_fullscreen(&self, target_id: &str) -> Result<(), CdpError> {
        let window = self
            .call(
                "Browser.getWindowForTarget",
                Some(json!({"targetId": target_id})),
            )
            .await?;
        let window_id = window["windowId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing windowId".to_string()))?;

        self.call(
            "Browser.setWindowBounds",
            Some(json!({
                "windowId": window_id,
                "bounds": {"windowState": "fullscreen"}
            })),
        )
        .await?;
        Ok(())
    }

    /// Close a page/target.
    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

//! [`SessionWindow`] implementation backed by a CDP page session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use kiosk_protocols::{SessionWindow, WindowError, WindowEvent};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cdp::{CdpResponse, PageSession, translate_event};

/// One kiosk session window in Chrome.
pub struct CdpWindow {
    page: Arc<PageSession>,
    closed: AtomicBool,
    events: Mutex<Option<mpsc::UnboundedReceiver<WindowEvent>>>,
    translator: JoinHandle<()>,
}

impl CdpWindow {
    pub(crate) fn new(page: PageSession) -> Self {
        let page = Arc::new(page);
        let (tx, rx) = mpsc::unbounded_channel();

        let translator = match page.take_events() {
            Some(raw) => tokio::spawn(Self::translate_loop(page.clone(), raw, tx)),
            // Events already taken; the stream ends immediately.
            None => tokio::spawn(async move { drop(tx) }),
        };

        Self {
            page,
            closed: AtomicBool::new(false),
            events: Mutex::new(Some(rx)),
            translator,
        }
    }

    async fn translate_loop(
        page: Arc<PageSession>,
        mut raw: mpsc::UnboundedReceiver<CdpResponse>,
        tx: mpsc::UnboundedSender<WindowEvent>,
    ) {
        while let Some(message) = raw.recv().await {
            let Some(mut event) = translate_event(&message) else {
                continue;
            };

            if let WindowEvent::Request(request) = &mut event {
                if !request.has_body() {
                    if let Some(network_id) = pending_body_id(message.params()) {
                        match page.request_post_data(network_id).await {
                            Ok(body) => request.body = Some(body),
                            Err(e) => debug!("No post data for {}: {}", request.url, e),
                        }
                    }
                }
            }

            let closed = matches!(event, WindowEvent::Closed);
            if tx.send(event).is_err() || closed {
                break;
            }
        }
        debug!("Event stream for target {} ended", page.target_id());
    }
}

/// Network ID of a paused request whose body was not sent inline.
fn pending_body_id(params: &Value) -> Option<&str> {
    if params["request"]["hasPostData"].as_bool() != Some(true) {
        return None;
    }
    params["networkId"].as_str()
}

#[async_trait]
impl SessionWindow for CdpWindow {
    fn id(&self) -> &str {
        self.page.target_id()
    }

    async fn navigate(&self, url: &str) -> Result<(), WindowError> {
        self.page.navigate(url).await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, WindowError> {
        Ok(self.page.evaluate(script).await?)
    }

    async fn add_init_script(&self, source: &str) -> Result<(), WindowError> {
        self.page.add_init_script(source).await?;
        Ok(())
    }

    async fn expose_binding(&self, name: &str) -> Result<(), WindowError> {
        self.page.add_binding(name).await?;
        Ok(())
    }

    async fn intercept_requests(&self) -> Result<(), WindowError> {
        self.page
            .enable_interception()
            .await
            .map_err(|e| WindowError::Interception(e.to_string()))
    }

    async fn continue_request(&self, request_id: &str) -> Result<(), WindowError> {
        self.page
            .continue_request(request_id)
            .await
            .map_err(|e| WindowError::Interception(e.to_string()))
    }

    async fn close(&self) -> Result<(), WindowError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        match self.page.close().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_target_gone() => {
                debug!("Target {} already gone", self.page.target_id());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to close target {}: {}", self.page.target_id(), e);
                Err(e.into())
            }
        }
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<WindowEvent>> {
        self.events.lock().take()
    }
}

impl Drop for CdpWindow {
    fn drop(&mut self) {
        self.translator.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_body_id() {
        let params = json!({"networkId": "N1", "request": {"hasPostData": true}});
        assert_eq!(pending_body_id(&params), Some("N1"));

        let params = json!({"networkId": "N1", "request": {"hasPostData": false}});
        assert_eq!(pending_body_id(&params), None);

        let params = json!({"request": {"hasPostData": true}});
        assert_eq!(pending_body_id(&params), None);
    }
}

//! Shared CDP command/event plumbing used by the client and its page sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::SinkExt;
use futures::stream::SplitSink;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{trace, warn};

use super::error::CdpError;
use super::protocol::{CdpRequest, CdpResponse};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;

/// Per-command response timeout.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pending request waiting for response.
struct PendingRequest {
    tx: oneshot::Sender<Result<Value, CdpError>>,
}

/// One WebSocket connection to the browser, shared by every session on it.
pub(crate) struct CdpTransport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Mutex<HashMap<u64, PendingRequest>>,
    /// Event sinks by session ID.
    event_handlers: Mutex<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>,
}

impl CdpTransport {
    pub(crate) fn new(ws_tx: WsSink) -> Self {
        Self {
            ws_tx: tokio::sync::Mutex::new(ws_tx),
            request_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            event_handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Send a CDP command and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Register an event sink for a session.
    pub(crate) fn subscribe(&self, session_id: &str) -> mpsc::UnboundedReceiver<CdpResponse> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_handlers.lock().insert(session_id.to_string(), tx);
        rx
    }

    /// Drop the event sink for a session, ending its event stream.
    pub(crate) fn unsubscribe(&self, session_id: &str) {
        self.event_handlers.lock().remove(session_id);
    }

    /// Route one incoming text frame.
    pub(crate) fn dispatch(&self, text: &str) {
        trace!("CDP recv: {}", text);
        let resp = match serde_json::from_str::<CdpResponse>(text) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Failed to parse CDP message: {}", e);
                return;
            }
        };

        if let Some(id) = resp.id {
            let pending_req = self.pending.lock().remove(&id);
            if let Some(req) = pending_req {
                let result = match resp.error {
                    Some(error) => Err(CdpError::Protocol {
                        code: error.code,
                        message: error.message,
                    }),
                    None => Ok(resp.result.unwrap_or(Value::Null)),
                };
                let _ = req.tx.send(result);
            }
            return;
        }

        let Some(method) = resp.method.as_deref() else {
            return;
        };

        // Detach notifications arrive on the browser connection and name the
        // session in their params.
        let detached = method == "Target.detachedFromTarget";
        let session_id = if detached {
            resp.params
                .as_ref()
                .and_then(|p| p["sessionId"].as_str())
                .map(|s| s.to_string())
        } else {
            resp.session_id.clone()
        }
        .unwrap_or_default();

        let mut handlers = self.event_handlers.lock();
        if let Some(tx) = handlers.get(&session_id) {
            let _ = tx.send(resp);
        }
        if detached {
            handlers.remove(&session_id);
        }
    }

    /// Fail outstanding requests and end every event stream.
    pub(crate) fn shutdown(&self) {
        self.event_handlers.lock().clear();
        for (_, req) in self.pending.lock().drain() {
            let _ = req.tx.send(Err(CdpError::SessionClosed));
        }
    }
}

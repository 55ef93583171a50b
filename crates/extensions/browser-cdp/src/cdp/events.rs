//! Translation of raw CDP events into session window events.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kiosk_protocols::{BindingCall, ConsoleMessage, InterceptedRequest, WindowEvent};
use tracing::warn;

use super::protocol::{
    BindingCalledEvent, CdpResponse, ConsoleApiCalledEvent, NetworkRequest, RequestPausedEvent,
};

/// Map one CDP event to a [`WindowEvent`].
///
/// Returns `None` for events the session window does not surface.
pub fn translate_event(event: &CdpResponse) -> Option<WindowEvent> {
    let method = event.method.as_deref()?;
    let params = event.params().clone();

    match method {
        "Page.loadEventFired" => Some(WindowEvent::Loaded),
        "Runtime.consoleAPICalled" => {
            let call: ConsoleApiCalledEvent = parse(method, params)?;
            let text = call
                .args
                .iter()
                .map(|arg| arg.display())
                .collect::<Vec<_>>()
                .join(" ");
            Some(WindowEvent::Console(ConsoleMessage::new(call.call_type, text)))
        }
        "Runtime.bindingCalled" => {
            let call: BindingCalledEvent = parse(method, params)?;
            Some(WindowEvent::Binding(BindingCall::new(call.name, call.payload)))
        }
        "Fetch.requestPaused" => {
            let paused: RequestPausedEvent = parse(method, params)?;
            let mut request = InterceptedRequest::new(
                paused.request_id,
                paused.request.url.clone(),
                paused.request.method.clone(),
            );
            if let Some(body) = request_body(&paused.request) {
                request = request.with_body(body);
            }
            Some(WindowEvent::Request(request))
        }
        "Target.detachedFromTarget" | "Inspector.detached" | "Target.targetCrashed" => {
            Some(WindowEvent::Closed)
        }
        _ => None,
    }
}

/// Reassemble the body of a paused request.
///
/// `postDataEntries` carries the exact bytes (base64); `postData` is the
/// UTF-8 rendering and is used when entries are absent.
pub(crate) fn request_body(request: &NetworkRequest) -> Option<Vec<u8>> {
    if let Some(entries) = &request.post_data_entries {
        let mut body = Vec::new();
        for entry in entries {
            let Some(bytes) = &entry.bytes else { continue };
            match STANDARD.decode(bytes) {
                Ok(chunk) => body.extend_from_slice(&chunk),
                Err(e) => {
                    warn!("Undecodable post data entry for {}: {}", request.url, e);
                    return request.post_data.as_ref().map(|s| s.as_bytes().to_vec());
                }
            }
        }
        if !body.is_empty() {
            return Some(body);
        }
    }
    request.post_data.as_ref().map(|s| s.as_bytes().to_vec())
}

fn parse<T: serde::de::DeserializeOwned>(method: &str, params: serde_json::Value) -> Option<T> {
    match serde_json::from_value(params) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Malformed {} event: {}", method, e);
            None
        }
    }
}

//! CDP protocol types and message definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// CDP response or event message.
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

impl CdpResponse {
    /// Event params, or `Null` for a params-less event.
    pub fn params(&self) -> &Value {
        self.params.as_ref().unwrap_or(&Value::Null)
    }
}

/// CDP error in response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Browser version info.
///
/// Note: Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

// ============================================================================
// Fetch Types
// ============================================================================

/// Stage at which `Fetch` pauses a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestStage {
    Request,
    Response,
}

/// One `Fetch.enable` pattern.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    pub url_pattern: String,
    pub request_stage: RequestStage,
}

impl RequestPattern {
    /// Pause every request before it is sent.
    pub fn all_requests() -> Self {
        Self {
            url_pattern: "*".to_string(),
            request_stage: RequestStage::Request,
        }
    }
}

/// One chunk of an outgoing request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDataEntry {
    /// Base64-encoded bytes.
    pub bytes: Option<String>,
}

/// Request description carried by `Fetch.requestPaused`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequest {
    pub url: String,
    pub method: String,
    pub post_data: Option<String>,
    #[serde(default)]
    pub has_post_data: bool,
    pub post_data_entries: Option<Vec<PostDataEntry>>,
}

/// `Fetch.requestPaused` event params.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPausedEvent {
    pub request_id: String,
    pub request: NetworkRequest,
    pub network_id: Option<String>,
}

// ============================================================================
// Runtime Types
// ============================================================================

/// Remote object from Runtime domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub value: Option<Value>,
    pub description: Option<String>,
}

impl RemoteObject {
    /// Render the object the way a console would print it.
    pub fn display(&self) -> String {
        match &self.value {
            Some(Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => self.description.clone().unwrap_or_default(),
        }
    }
}

/// `Runtime.consoleAPICalled` event params.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleApiCalledEvent {
    #[serde(rename = "type")]
    pub call_type: String,
    #[serde(default)]
    pub args: Vec<RemoteObject>,
}

/// `Runtime.bindingCalled` event params.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingCalledEvent {
    pub name: String,
    pub payload: String,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

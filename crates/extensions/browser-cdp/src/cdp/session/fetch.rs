//! Request interception through the CDP `Fetch` domain.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::RequestPattern;

use super::core::PageSession;

impl PageSession {
    /// Pause every outgoing request at the request stage.
    ///
    /// Each paused request arrives as `Fetch.requestPaused` and stays held
    /// until [`continue_request`](Self::continue_request) is called.
    pub async fn enable_interception(&self) -> Result<(), CdpError> {
        self.call(
            "Fetch.enable",
            Some(json!({"patterns": [RequestPattern::all_requests()]})),
        )
        .await?;
        debug!("Request interception enabled for session {}", self.session_id);
        Ok(())
    }

    /// Let a paused request proceed unmodified.
    pub async fn continue_request(&self, request_id: &str) -> Result<(), CdpError> {
        self.call("Fetch.continueRequest", Some(json!({"requestId": request_id})))
            .await?;
        Ok(())
    }

    /// Fetch a request body the pause event did not carry inline.
    pub async fn request_post_data(&self, network_id: &str) -> Result<Vec<u8>, CdpError> {
        let result = self
            .call(
                "Network.getRequestPostData",
                Some(json!({"requestId": network_id})),
            )
            .await?;

        let data = result["postData"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing postData".to_string()))?;

        if result["base64Encoded"].as_bool().unwrap_or(false) {
            STANDARD
                .decode(data)
                .map_err(|e| CdpError::InvalidResponse(format!("postData: {}", e)))
        } else {
            Ok(data.as_bytes().to_vec())
        }
    }
}

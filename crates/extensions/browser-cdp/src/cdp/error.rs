//! CDP error types.

use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation failed.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the error means the target or its session no longer exists.
    pub fn is_target_gone(&self) -> bool {
        match self {
            CdpError::SessionClosed => true,
            CdpError::Protocol { message, .. } => {
                let message = message.to_ascii_lowercase();
                message.contains("no target with given id")
                    || message.contains("session with given id not found")
            }
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for kiosk_protocols::WindowError {
    fn from(e: CdpError) -> Self {
        use kiosk_protocols::WindowError;
        match e {
            CdpError::SessionClosed => WindowError::Closed,
            CdpError::NavigationFailed(msg) => WindowError::NavigationFailed(msg),
            CdpError::JavaScript(msg) => WindowError::Script(msg),
            other => WindowError::Browser(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_gone_errors() {
        assert!(CdpError::SessionClosed.is_target_gone());
        assert!(
            CdpError::Protocol {
                code: -32602,
                message: "No target with given id found".to_string(),
            }
            .is_target_gone()
        );
        assert!(
            CdpError::Protocol {
                code: -32001,
                message: "Session with given id not found.".to_string(),
            }
            .is_target_gone()
        );
    }

    #[test]
    fn test_other_protocol_errors_are_not_target_gone() {
        assert!(
            !CdpError::Protocol {
                code: -32000,
                message: "Not allowed".to_string(),
            }
            .is_target_gone()
        );
        assert!(!CdpError::Timeout("closeTarget".to_string()).is_target_gone());
    }
}

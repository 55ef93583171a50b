//! Intercepted network request.

use serde::{Deserialize, Serialize};

/// An outgoing request paused by the session window.
///
/// The request is held until [`SessionWindow::continue_request`] is called
/// with its `id`.
///
/// [`SessionWindow::continue_request`]: crate::window::SessionWindow::continue_request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptedRequest {
    /// Interception ID used to continue the request.
    pub id: String,
    /// Full request URL.
    pub url: String,
    /// HTTP method, upper case.
    pub method: String,
    /// Raw request body, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<u8>>,
}

impl InterceptedRequest {
    pub fn new(id: impl Into<String>, url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            method: method.into().to_ascii_uppercase(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Whether the request carries a non-empty body.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }
}

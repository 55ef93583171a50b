//! Traffic interceptor: captures the result submission from outgoing requests.

use std::sync::Arc;

use kiosk_config::InterceptionConfig;
use kiosk_protocols::{CapturedPayload, InterceptedRequest, SessionWindow};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Decides whether a request is the target submission.
#[derive(Debug, Clone)]
pub struct RequestMatcher {
    url_contains: String,
    required_keys: Vec<String>,
    methods: Vec<String>,
    broad_fallback: bool,
}

impl RequestMatcher {
    pub fn new(config: &InterceptionConfig) -> Self {
        Self {
            url_contains: config.url_contains.clone(),
            required_keys: config.required_keys.clone(),
            methods: config
                .methods
                .iter()
                .map(|m| m.trim().to_ascii_uppercase())
                .collect(),
            broad_fallback: config.broad_fallback,
        }
    }

    /// Decode and match a request. Returns the payload on a match.
    ///
    /// The narrow rule requires the configured URL substring; the broad
    /// fallback accepts any `POST` whose body has the required keys.
    pub fn capture(&self, request: &InterceptedRequest) -> Option<CapturedPayload> {
        if !self.methods.iter().any(|m| *m == request.method) {
            return None;
        }

        let url_match = !self.url_contains.is_empty() && request.url.contains(&self.url_contains);
        let broad = self.broad_fallback && request.method == "POST";
        if !url_match && !broad {
            return None;
        }

        let body = self.decode(request)?;
        if !self.has_required_keys(&body) {
            if url_match {
                debug!("Submission to {} lacks required keys", request.url);
            }
            return None;
        }

        if !url_match {
            info!("Captured payload from {} via broad fallback", request.url);
        }
        Some(CapturedPayload::new(request.url.clone(), body))
    }

    fn decode(&self, request: &InterceptedRequest) -> Option<Value> {
        let bytes = request.body.as_deref().filter(|b| !b.is_empty())?;
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("Request body to {} is not UTF-8: {}", request.url, e);
                return None;
            }
        };
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Request body to {} is not JSON: {}", request.url, e);
                None
            }
        }
    }

    fn has_required_keys(&self, body: &Value) -> bool {
        match body.as_object() {
            Some(object) => self.required_keys.iter().all(|k| object.contains_key(k)),
            None => false,
        }
    }
}

/// Inspects every paused request of one session window.
pub struct TrafficInterceptor {
    window: Arc<dyn SessionWindow>,
    matcher: RequestMatcher,
}

impl TrafficInterceptor {
    pub fn new(window: Arc<dyn SessionWindow>, config: &InterceptionConfig) -> Self {
        Self {
            window,
            matcher: RequestMatcher::new(config),
        }
    }

    /// Start pausing the window's outgoing requests.
    pub async fn attach(&self) -> Result<(), kiosk_protocols::WindowError> {
        self.window.intercept_requests().await
    }

    /// Inspect one paused request and let it continue unmodified.
    pub async fn handle(&self, request: InterceptedRequest) -> Option<CapturedPayload> {
        let captured = self.matcher.capture(&request);

        if let Err(e) = self.window.continue_request(&request.id).await {
            debug!("Could not continue request {}: {}", request.id, e);
        }

        if captured.is_some() {
            info!("Captured submission to {}", request.url);
        }
        captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWindow;
    use serde_json::json;

    const SEND_RESULT: &str = "https://kiosk.example/api/oscilla/sendresult";

    fn post(url: &str, body: &str) -> InterceptedRequest {
        InterceptedRequest::new("req-1", url, "POST").with_body(body)
    }

    #[test]
    fn test_narrow_match() {
        let matcher = RequestMatcher::new(&InterceptionConfig::default());
        let payload = matcher
            .capture(&post(SEND_RESULT, r#"{"Id":42,"CustomerName":"X"}"#))
            .expect("should match");
        assert_eq!(payload.body, json!({"Id": 42, "CustomerName": "X"}));
        assert_eq!(payload.url, SEND_RESULT);
    }

    #[test]
    fn test_unrelated_url_is_ignored() {
        let matcher = RequestMatcher::new(&InterceptionConfig::default());
        let req = post("https://kiosk.example/api/other", r#"{"Id":42,"CustomerName":"X"}"#);
        assert!(matcher.capture(&req).is_none());
    }

    #[test]
    fn test_missing_keys_and_bad_bodies() {
        let matcher = RequestMatcher::new(&InterceptionConfig::default());
        assert!(matcher.capture(&post(SEND_RESULT, r#"{"Id":42}"#)).is_none());
        assert!(matcher.capture(&post(SEND_RESULT, "[1,2]")).is_none());
        assert!(matcher.capture(&post(SEND_RESULT, "Id=42")).is_none());
        assert!(matcher.capture(&post(SEND_RESULT, "")).is_none());

        let invalid_utf8 = InterceptedRequest::new("r", SEND_RESULT, "POST").with_body(vec![0xff, 0xfe]);
        assert!(matcher.capture(&invalid_utf8).is_none());
    }

    #[test]
    fn test_method_filter() {
        let matcher = RequestMatcher::new(&InterceptionConfig::default());
        let get = InterceptedRequest::new("r", SEND_RESULT, "GET").with_body(r#"{"Id":1,"CustomerName":"X"}"#);
        assert!(matcher.capture(&get).is_none());

        let put = InterceptedRequest::new("r", SEND_RESULT, "put").with_body(r#"{"Id":1,"CustomerName":"X"}"#);
        assert!(matcher.capture(&put).is_some());
    }

    #[test]
    fn test_broad_fallback() {
        let config = InterceptionConfig {
            broad_fallback: true,
            ..Default::default()
        };
        let matcher = RequestMatcher::new(&config);
        let body = r#"{"Id":7,"CustomerName":"Y","Extra":true}"#;
        assert!(matcher.capture(&post("https://elsewhere.example/save", body)).is_some());

        // Broad fallback is POST only.
        let put = InterceptedRequest::new("r", "https://elsewhere.example/save", "PUT").with_body(body);
        assert!(matcher.capture(&put).is_none());
    }

    #[tokio::test]
    async fn test_every_request_is_continued() {
        let window = Arc::new(FakeWindow::new());
        let interceptor = TrafficInterceptor::new(window.clone(), &InterceptionConfig::default());
        interceptor.attach().await.unwrap();

        let hit = interceptor
            .handle(post(SEND_RESULT, r#"{"Id":42,"CustomerName":"X"}"#))
            .await;
        let miss = interceptor
            .handle(InterceptedRequest::new("req-2", "https://kiosk.example/app.js", "GET"))
            .await;
        let broken = interceptor
            .handle(InterceptedRequest::new("req-3", SEND_RESULT, "POST").with_body("{"))
            .await;

        assert!(hit.is_some());
        assert!(miss.is_none());
        assert!(broken.is_none());
        assert_eq!(*window.continued.lock(), vec!["req-1", "req-2", "req-3"]);
        assert!(window.intercepting.load(std::sync::atomic::Ordering::SeqCst));
    }
}

use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate".to_string(),
        params: Some(serde_json::json!({"url": "https://example.com"})),
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Page.navigate"));
    assert!(json.contains("example.com"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_request_with_session() {
    let req = CdpRequest {
        id: 7,
        method: "Runtime.enable".to_string(),
        params: None,
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains(r#""sessionId":"S1""#));
    assert!(!json.contains("params"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(resp.params().is_null());
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/120.0",
        "Protocol-Version": "1.3",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/x"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/120.0");
    assert!(version.user_agent.is_empty());
}

#[test]
fn test_request_pattern_serialize() {
    let json = serde_json::to_value(RequestPattern::all_requests()).unwrap();
    assert_eq!(json, serde_json::json!({"urlPattern": "*", "requestStage": "Request"}));
}

#[test]
fn test_request_paused_deserialize() {
    let json = r#"{
        "requestId": "interception-1",
        "request": {
            "url": "https://kiosk.example/api/oscilla/sendresult",
            "method": "POST",
            "headers": {},
            "hasPostData": true,
            "postDataEntries": [{"bytes": "eyJJZCI6MX0="}]
        },
        "frameId": "F",
        "resourceType": "XHR"
    }"#;
    let event: RequestPausedEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.request_id, "interception-1");
    assert!(event.request.has_post_data);
    assert!(event.request.post_data.is_none());
    assert_eq!(event.request.post_data_entries.unwrap().len(), 1);
}

#[test]
fn test_remote_object_display() {
    let text: RemoteObject =
        serde_json::from_str(r#"{"type": "string", "value": "hello"}"#).unwrap();
    assert_eq!(text.display(), "hello");

    let number: RemoteObject = serde_json::from_str(r#"{"type": "number", "value": 3}"#).unwrap();
    assert_eq!(number.display(), "3");

    let object: RemoteObject =
        serde_json::from_str(r#"{"type": "object", "description": "Object"}"#).unwrap();
    assert_eq!(object.display(), "Object");
}

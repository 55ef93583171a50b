use super::*;

#[test]
fn test_console_message_new() {
    let msg = ConsoleMessage::new("log", "Successfully sent data to API");
    assert_eq!(msg.level, "log");
    assert!(msg.text.contains("sent data"));
}

#[test]
fn test_binding_call_serialization() {
    let call = BindingCall::new("__kioskExit", "escape");
    let json = serde_json::to_string(&call).unwrap();
    assert!(json.contains("__kioskExit"));
    assert!(json.contains("escape"));

    let back: BindingCall = serde_json::from_str(&json).unwrap();
    assert_eq!(back, call);
}

#[test]
fn test_window_event_debug() {
    let event = WindowEvent::Console(ConsoleMessage::new("info", "hello"));
    let debug = format!("{:?}", event);
    assert!(debug.contains("Console"));
    assert!(debug.contains("hello"));
}

use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.browser.debug_port, 9222);
    assert!(config.browser.fullscreen);
    assert_eq!(config.session.target_url, "https://kiosk.oscilla.app/");
    assert!(config.host.window_title.is_none());
}

#[test]
fn test_injection_config_default() {
    let injection = InjectionConfig::default();
    assert_eq!(injection.poll_interval_ms, 500);
    assert_eq!(injection.max_attempts, 40);

    let required: Vec<_> = injection
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.key.as_str())
        .collect();
    assert_eq!(required, vec!["firstName", "lastName", "email"]);

    let dob = injection.fields.iter().find(|f| f.key == "dateOfBirth").unwrap();
    assert!(dob.readonly);
    assert!(!dob.required);
    assert_eq!(
        injection.checkbox_selector.as_deref(),
        Some(r#"input[type="checkbox"]"#)
    );
}

#[test]
fn test_interception_config_default() {
    let interception = InterceptionConfig::default();
    assert_eq!(interception.url_contains, "/api/oscilla/sendresult");
    assert_eq!(interception.required_keys, vec!["Id", "CustomerName"]);
    assert!(!interception.broad_fallback);
    assert!(interception.methods.contains(&"POST".to_string()));
}

#[test]
fn test_completion_config_default() {
    let completion = CompletionConfig::default();
    assert_eq!(completion.marker, "Successfully sent data to API");
    assert_eq!(completion.grace_delay_ms, 5000);
    assert_eq!(completion.exit_key, "Escape");
    assert!(completion.exit_phrases.iter().any(|p| p == "Sulje"));
}

#[test]
fn test_storage_defaults() {
    let storage = StorageConfig::default();
    assert_eq!(storage.file_prefix, "patient_result");
    assert!(storage.resolved_data_dir().ends_with("results"));
}

#[test]
fn test_browser_endpoint_and_profile() {
    let browser = BrowserConfig::default();
    assert_eq!(browser.endpoint(), "http://localhost:9222");
    assert!(browser
        .resolved_profile_dir()
        .ends_with(".kiosk-launcher/browser-profile"));
}

#[test]
fn test_logging_defaults() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert_eq!(logging.max_log_files, 30);
    assert!(logging.resolved_log_dir().ends_with("logs"));
}

#[test]
fn test_config_serialization_roundtrip_through_toml() {
    let config = Config::default();
    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("debug_port"));
    let back: Config = toml::from_str(&text).unwrap();
    assert_eq!(back.injection, config.injection);
    assert_eq!(back.interception, config.interception);
}

use super::*;
use crate::schema::FieldConfig;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.browser.debug_port = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "browser.debug_port"));
}

#[test]
fn test_validate_target_url_scheme() {
    let mut config = Config::default();
    config.session.target_url = "kiosk.oscilla.app".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "session.target_url"));
}

#[test]
fn test_validate_zero_poll_interval() {
    let mut config = Config::default();
    config.injection.poll_interval_ms = 0;
    config.injection.max_attempts = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "injection.poll_interval_ms"));
    assert!(result.errors.iter().any(|e| e.path == "injection.max_attempts"));
}

#[test]
fn test_validate_duplicate_field_keys() {
    let mut config = Config::default();
    config
        .injection
        .fields
        .push(FieldConfig::new("email", "input#email2"));

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.message.contains("Duplicate")));
}

#[test]
fn test_validate_no_required_fields_warning() {
    let mut config = Config::default();
    for field in &mut config.injection.fields {
        field.required = false;
    }

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "injection.fields"));
}

#[test]
fn test_validate_broad_fallback_warning() {
    let mut config = Config::default();
    config.interception.broad_fallback = true;
    config.interception.url_contains = String::new();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "interception.broad_fallback"));
}

#[test]
fn test_validate_empty_url_without_fallback() {
    let mut config = Config::default();
    config.interception.url_contains = String::new();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "interception.url_contains"));
}

#[test]
fn test_validate_file_prefix_with_separator() {
    let mut config = Config::default();
    config.storage.file_prefix = "../escape".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "storage.file_prefix"));
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.browser.debug_port = 0;
    let result = ConfigValidator::validate(&config).unwrap();
    let err = result.into_result().unwrap_err();
    assert!(err.to_string().contains("browser.debug_port"));

    let ok = ConfigValidator::validate(&Config::default())
        .unwrap()
        .into_result()
        .unwrap();
    assert!(ok.is_empty());
}

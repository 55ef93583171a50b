//! Configuration validation.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_browser(config, &mut result);
        Self::validate_session(config, &mut result);
        Self::validate_injection(config, &mut result);
        Self::validate_interception(config, &mut result);
        Self::validate_completion(config, &mut result);
        Self::validate_storage(config, &mut result);

        Ok(result)
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }

        if let Some(ref path) = config.browser.chrome_path {
            if !path.exists() {
                result.add_warning(ValidationWarning::new(
                    "browser.chrome_path",
                    format!("Chrome executable does not exist: {:?}", path),
                ));
            }
        }

        if config.browser.headless && config.browser.kiosk_mode {
            result.add_warning(ValidationWarning::new(
                "browser.kiosk_mode",
                "kiosk_mode has no effect when headless is enabled",
            ));
        }
    }

    fn validate_session(config: &Config, result: &mut ValidationResult) {
        let url = &config.session.target_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "session.target_url",
                "target_url must start with http:// or https://",
            ));
        }
    }

    fn validate_injection(config: &Config, result: &mut ValidationResult) {
        let injection = &config.injection;

        if injection.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "injection.poll_interval_ms",
                "poll_interval_ms must be greater than 0",
            ));
        }

        if injection.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "injection.max_attempts",
                "max_attempts must be greater than 0",
            ));
        }

        if !injection.fields.iter().any(|f| f.required) {
            result.add_warning(ValidationWarning::new(
                "injection.fields",
                "No required fields; injection fires on the first poll",
            ));
        }

        let mut seen = HashSet::new();
        for (i, field) in injection.fields.iter().enumerate() {
            if field.selector.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("injection.fields[{}].selector", i),
                    "Selector cannot be empty",
                ));
            }
            if !seen.insert(field.key.as_str()) {
                result.add_error(ValidationError::new(
                    format!("injection.fields[{}].key", i),
                    format!("Duplicate field key '{}'", field.key),
                ));
            }
        }
    }

    fn validate_interception(config: &Config, result: &mut ValidationResult) {
        let interception = &config.interception;

        if interception.url_contains.is_empty() && !interception.broad_fallback {
            result.add_error(ValidationError::new(
                "interception.url_contains",
                "url_contains cannot be empty unless broad_fallback is enabled",
            ));
        }

        if interception.required_keys.is_empty() {
            result.add_warning(ValidationWarning::new(
                "interception.required_keys",
                "No required keys; any JSON body sent to the URL will be captured",
            ));
        }

        if interception.broad_fallback {
            result.add_warning(ValidationWarning::new(
                "interception.broad_fallback",
                "Broad matching may capture unrelated traffic",
            ));
        }

        if interception.methods.is_empty() {
            result.add_error(ValidationError::new(
                "interception.methods",
                "At least one HTTP method must be listed",
            ));
        }
    }

    fn validate_completion(config: &Config, result: &mut ValidationResult) {
        let completion = &config.completion;

        if completion.marker.is_empty() {
            result.add_warning(ValidationWarning::new(
                "completion.marker",
                "Empty marker disables the console completion signal",
            ));
        }

        if completion.exit_key.is_empty() && completion.exit_phrases.is_empty() {
            result.add_warning(ValidationWarning::new(
                "completion",
                "No exit key and no exit phrases; the user cannot leave the session",
            ));
        }

        if completion.grace_delay_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "completion.grace_delay_ms",
                "grace_delay_ms is longer than a minute",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        let prefix = &config.storage.file_prefix;
        if prefix.is_empty() {
            result.add_error(ValidationError::new(
                "storage.file_prefix",
                "file_prefix cannot be empty",
            ));
        } else if prefix.contains(|c| c == '/' || c == '\\') {
            result.add_error(ValidationError::new(
                "storage.file_prefix",
                "file_prefix cannot contain path separators",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

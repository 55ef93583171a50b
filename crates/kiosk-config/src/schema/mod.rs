//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_infra;
mod schema_session;

pub use schema_infra::*;
pub use schema_session::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub injection: InjectionConfig,

    #[serde(default)]
    pub interception: InterceptionConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application directory under the user's home (`~/.kiosk-launcher`).
pub fn app_home_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".kiosk-launcher")
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

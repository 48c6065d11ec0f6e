//! Configuration for report delivery

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://metriton.datawire.io/scout";
pub const DEFAULT_APPLICATION: &str = "scout";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Overrides `endpoint` when set.
pub const ENDPOINT_ENV: &str = "SCOUT_ENDPOINT";
/// Any non-empty value turns reporting off.
pub const DISABLE_ENV: &str = "SCOUT_DISABLE";

/// Delivery settings for a Scout session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Collector URL reports are POSTed to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Application name sent with every report
    #[serde(default = "default_application")]
    pub application: String,

    /// Application version sent with every report
    #[serde(default = "default_version")]
    pub version: String,

    /// Per-request timeout; 0 disables the client timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip delivery entirely
    #[serde(default)]
    pub disabled: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_application() -> String {
    DEFAULT_APPLICATION.to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            application: default_application(),
            version: default_version(),
            timeout_secs: default_timeout_secs(),
            disabled: false,
        }
    }
}

impl ReporterConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Overlay `SCOUT_ENDPOINT` and `SCOUT_DISABLE` from the environment.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(DISABLE_ENV).ok(),
        );
        self
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, disable: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if disable.is_some_and(|v| !v.is_empty()) {
            self.disabled = true;
        }
    }

    /// Client timeout, `None` when `timeout_secs` is 0.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api.key`.
pub const API_KEY_ENV: &str = "RT_API_KEY";

/// Placeholder shown instead of secrets by `config show`.
const REDACTED: &str = "***";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// API credentials and endpoint.
    #[serde(default)]
    pub api: ApiConfig,
    /// Client-side request throttle.
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Query-limit retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// API credentials and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Rotten Tomatoes API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Throttle window: at most `max_calls` requests per `interval_ms`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Calls allowed per window.
    pub max_calls: usize,
    /// Window length in milliseconds.
    pub interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_calls: 5,
            interval_ms: 1000,
        }
    }
}

/// Retry policy for the vendor's query-limit error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay in milliseconds; attempt `n` sleeps `n` times this.
    pub delay_ms: u64,
    /// Maximum number of retries.
    pub limit: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            limit: 5,
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// TCP connect timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    /// Total request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// HTTP proxy host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,
    /// HTTP proxy port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<u16>,
    /// Proxy basic-auth user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_user: Option<String>,
    /// Proxy basic-auth password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_password: Option<String>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Resolves the API key: a non-blank `env_value` wins over `api.key`.
    #[must_use]
    pub fn api_key(&self, env_value: Option<&str>) -> Option<String> {
        let non_blank = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| String::from(v))
        };
        env_value
            .and_then(non_blank)
            .or_else(|| self.api.key.as_deref().and_then(non_blank))
    }

    /// Returns a copy with the API key and proxy password masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.api.key.is_some() {
            copy.api.key = Some(String::from(REDACTED));
        }
        if copy.http.proxy_password.is_some() {
            copy.http.proxy_password = Some(String::from(REDACTED));
        }
        copy
    }
}

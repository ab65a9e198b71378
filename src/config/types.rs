//! Core configuration types.

use super::defaults::{DEFAULT_OBSERVER_PASSWORD, default_observer_password};
use super::{HistoryConfig, LimitsConfig, ListenConfig};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// WebSocket listener.
    pub listen: ListenConfig,
    /// Observer (god view) access.
    #[serde(default)]
    pub observer: ObserverConfig,
    /// Channel log retention.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Per-connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name shown in logs (e.g., "wolfrelay").
    pub name: String,
    /// Log output format (default: text).
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Observer access configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    /// Shared secret for `godview` subscriptions (exact match).
    #[serde(default = "default_observer_password")]
    pub password: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            password: default_observer_password(),
        }
    }
}

impl ObserverConfig {
    /// True while the password is still the well-known default.
    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_OBSERVER_PASSWORD
    }
}

//! Configuration management for Tally.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{Result, TallyError};
use crate::ratelimit::RateLimitSettings;

/// Main configuration for the Tally service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Transaction storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3333))
}

/// Rate limiting configuration. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Requests allowed per window before a client is blocked
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,

    /// Sliding window length
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Block length once the limit is exceeded
    #[serde(default = "default_block_ms")]
    pub block_ms: u64,

    /// Maximum number of tracked clients kept by the sweep
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Period of the background sweep
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            block_ms: default_block_ms(),
            max_entries: default_max_entries(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

fn default_max_requests() -> u64 {
    10
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_block_ms() -> u64 {
    3_600_000
}

fn default_max_entries() -> usize {
    5_000
}

fn default_sweep_interval_ms() -> u64 {
    300_000
}

impl RateLimitingConfig {
    /// Check the values and convert them into limiter settings.
    pub fn to_settings(&self) -> Result<RateLimitSettings> {
        if self.max_requests == 0 {
            return Err(TallyError::Config("max_requests must be at least 1".into()));
        }
        if self.window_ms == 0 {
            return Err(TallyError::Config("window_ms must be greater than 0".into()));
        }
        if self.sweep_interval_ms == 0 {
            return Err(TallyError::Config(
                "sweep_interval_ms must be greater than 0".into(),
            ));
        }

        Ok(RateLimitSettings {
            max_requests: self.max_requests,
            window: Duration::from_millis(self.window_ms),
            block_duration: Duration::from_millis(self.block_ms),
            max_entries: self.max_entries,
            sweep_interval: Duration::from_millis(self.sweep_interval_ms),
        })
    }
}

/// Where transactions are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process only, lost on restart
    #[default]
    Memory,
    /// A single JSON file on disk
    JsonFile,
}

/// Transaction storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path of the JSON file used by the `json_file` backend
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/transactions.json")
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TallyConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TallyConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TallyError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.rate_limiting.to_settings()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_limiter_defaults() {
        let config = TallyConfig::default();
        let settings = config.rate_limiting.to_settings().unwrap();
        assert_eq!(settings, RateLimitSettings::default());
        assert_eq!(config.server.http_addr.port(), 3333);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
rate_limiting:
  max_requests: 100
  window_ms: 1000
storage:
  backend: json_file
  path: /tmp/tally.json
"#;
        let config = TallyConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.rate_limiting.max_requests, 100);
        assert_eq!(config.rate_limiting.window_ms, 1000);
        assert_eq!(config.rate_limiting.block_ms, 3_600_000);
        assert_eq!(config.rate_limiting.max_entries, 5_000);
        assert_eq!(config.storage.backend, StorageBackend::JsonFile);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/tally.json"));
        assert_eq!(config.server.http_addr, default_http_addr());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = TallyConfig::from_yaml("{}").unwrap();
        assert_eq!(config.rate_limiting, RateLimitingConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
server:
  http_addr: "0.0.0.0:8080"
rate_limiting:
  max_requests: 5
  window_ms: 2000
  block_ms: 30000
  max_entries: 10
  sweep_interval_ms: 500
logging:
  level: debug
  format: json
"#;
        let config = TallyConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.http_addr.port(), 8080);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);

        let settings = config.rate_limiting.to_settings().unwrap();
        assert_eq!(settings.max_requests, 5);
        assert_eq!(settings.window, Duration::from_secs(2));
        assert_eq!(settings.block_duration, Duration::from_secs(30));
        assert_eq!(settings.max_entries, 10);
        assert_eq!(settings.sweep_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let result = TallyConfig::from_yaml("rate_limiting:\n  max_requests: 0\n");
        assert!(matches!(result, Err(TallyError::Config(_))));

        let config = RateLimitingConfig {
            sweep_interval_ms: 0,
            ..RateLimitingConfig::default()
        };
        assert!(config.to_settings().is_err());

        let config = RateLimitingConfig {
            window_ms: 0,
            ..RateLimitingConfig::default()
        };
        assert!(config.to_settings().is_err());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let result = TallyConfig::from_yaml("rate_limiting: [not, a, map]");
        assert!(matches!(result, Err(TallyError::Config(_))));
    }

    #[test]
    fn test_from_missing_file_is_io_error() {
        let result = TallyConfig::from_file("/nonexistent/tally.yaml");
        assert!(matches!(result, Err(TallyError::Io(_))));
    }
}

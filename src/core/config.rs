//! Application configuration management
//!
//! Configuration is read-only: it comes from defaults, optionally overridden
//! by a JSON file the user points at. Nothing is written back.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::validation::is_http_url;

/// Published CSV export of the episode sheet
pub const SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQl0fYlik6fvtVqSZ0MrFS9LugV8izIwbc9GPSAcOELk4tyhixYMT1K5OpJX4LZgHHE9s6O6ZwCtWXl/pub?gid=0&single=true&output=csv";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Longest accepted cache staleness window (one year)
const MAX_STALE_AFTER_SECONDS: u64 = 86_400 * 365;

/// Main application configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Where and how the dataset is fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Dataset cache behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cached datasets older than this are reloaded on access; 0 = never stale
    pub stale_after_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: SHEET_URL.to_string(),
            timeout_seconds: 30,
            user_agent: crate::utils::network::get_user_agent().to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after_seconds: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SourceConfig {
    /// Source pointing at an arbitrary URL, other settings default
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::import(&content)
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        tracing::info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Import configuration from JSON string
    pub fn import(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse configuration")?;

        config
            .validate()
            .with_context(|| "Imported configuration is invalid")?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.source.url) {
            anyhow::bail!("Source URL must be an http(s) URL: {}", self.source.url);
        }

        if self.source.timeout_seconds == 0 || self.source.timeout_seconds > 300 {
            anyhow::bail!("Timeout should be between 1 and 300 seconds");
        }

        if self.source.user_agent.trim().is_empty() {
            anyhow::bail!("User agent must not be empty");
        }

        if self.cache.stale_after_seconds > MAX_STALE_AFTER_SECONDS {
            anyhow::bail!(
                "Cache staleness should be at most {} seconds",
                MAX_STALE_AFTER_SECONDS
            );
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.url, SHEET_URL);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = config.export().unwrap();
        let parsed_config = AppConfig::import(&json).unwrap();

        assert_eq!(config, parsed_config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::import(r#"{ "source": { "timeout_seconds": 5 } }"#).unwrap();

        assert_eq!(config.source.timeout_seconds, 5);
        assert_eq!(config.source.url, SHEET_URL);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = AppConfig::default();
        config.source.url = "ftp://example.com/sheet.csv".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.source.url = "not a url".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.source.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.source.timeout_seconds = 301;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stale_window_is_bounded() {
        let mut config = AppConfig::default();
        config.cache.stale_after_seconds = MAX_STALE_AFTER_SECONDS;
        assert!(config.validate().is_ok());

        config.cache.stale_after_seconds = MAX_STALE_AFTER_SECONDS + 1;
        assert!(config.validate().is_err());

        for json in [
            r#"{ "cache": { "stale_after_seconds": 100000000000000000 } }"#,
            r#"{ "cache": { "stale_after_seconds": 18446744073709551615 } }"#,
        ] {
            assert!(AppConfig::import(json).is_err());
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "source": {{ "url": "http://localhost:8080/episodes.csv" }}, "logging": {{ "level": "debug" }} }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.source.url, "http://localhost:8080/episodes.csv");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from(dir.path().join("missing.json")).is_err());
    }
}

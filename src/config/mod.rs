//! Application configuration
//!
//! Loaded from a TOML file named by the `CONFIG_FILE` environment variable
//! (default `config.toml`); a missing file yields the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::utils::retry::RetryConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub request: RequestConfig,
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Capture per-entry HTTP headers from M3U content
    pub open_headers: bool,
    /// User-Agent sent with source requests
    pub user_agent: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            open_headers: false,
            user_agent: concat!("m3u-subscribe/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Worker cap for concurrent source pipelines
    pub max_concurrent_sources: usize,
    pub retry: RetryConfig,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sources: 10,
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            toml::from_str(&contents)
                .map_err(|e| AppError::configuration(format!("{}: {}", config_file, e)))
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.request.timeout_secs, 10);
        assert!(!config.request.open_headers);
        assert_eq!(config.ingestion.max_concurrent_sources, 10);
        assert_eq!(config.ingestion.retry.max_attempts, 3);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [request]
            timeout_secs = 3
            open_headers = true

            [ingestion.retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.request.timeout_secs, 3);
        assert!(config.request.open_headers);
        assert_eq!(config.ingestion.max_concurrent_sources, 10);
        assert_eq!(config.ingestion.retry.max_attempts, 5);
        assert_eq!(config.ingestion.retry.initial_delay_ms, 500);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.request.timeout_secs, config.request.timeout_secs);
        assert_eq!(
            parsed.ingestion.max_concurrent_sources,
            config.ingestion.max_concurrent_sources
        );
    }
}

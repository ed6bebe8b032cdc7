//! Application configuration.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tickwatch_core::{BandError, PriceBand};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Monitor settings.
    pub monitor: MonitorSettings,
    /// Journal file path.
    pub journal_path: String,
    /// Logging level.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorSettings::default(),
            journal_path: "stock_data.csv".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file, falling back to defaults when the file does
    /// not exist. A file that exists but cannot be read or parsed is an
    /// error, not a silent fallback.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Security symbol to watch.
    pub symbol: CompactString,
    /// Low alert threshold.
    pub low_threshold: f64,
    /// High alert threshold.
    pub high_threshold: f64,
    /// Seconds between polls.
    pub poll_interval_secs: u64,
    /// Seconds to wait before retrying a failed fetch.
    pub backoff_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            symbol: CompactString::new("300300.SZ"),
            low_threshold: 12.0,
            high_threshold: 13.0,
            poll_interval_secs: 1800,
            backoff_secs: 300,
        }
    }
}

impl MonitorSettings {
    /// Validated watch band from the two thresholds.
    pub fn band(&self) -> Result<PriceBand, BandError> {
        PriceBand::new(self.low_threshold, self.high_threshold)
    }
}

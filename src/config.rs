//! Configuration management for the fraud screening pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub rules: RuleConfig,
    pub scoring: ScoringConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Rule-based assessment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Amount above which the `large_amount` rule triggers
    #[serde(default = "default_amount_ceiling")]
    pub amount_ceiling: f64,
    /// First hour of the `unusual_time` night window (inclusive)
    #[serde(default = "default_night_start_hour")]
    pub night_start_hour: u32,
    /// Last hour of the night window (exclusive)
    #[serde(default = "default_night_end_hour")]
    pub night_end_hour: u32,
    /// Description fragments that trigger `suspicious_description`
    #[serde(default = "default_suspicious_keywords")]
    pub suspicious_keywords: Vec<String>,
}

fn default_amount_ceiling() -> f64 {
    5000.0
}

fn default_night_start_hour() -> u32 {
    23
}

fn default_night_end_hour() -> u32 {
    6
}

fn default_suspicious_keywords() -> Vec<String> {
    ["urgent", "immediately", "gift card", "crypto", "winnings"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl RuleConfig {
    /// Whether an hour of day falls into the configured night window.
    /// The window may wrap around midnight (the default 23..6 does).
    pub fn is_night_hour(&self, hour: u32) -> bool {
        if self.night_start_hour <= self.night_end_hour {
            hour >= self.night_start_hour && hour < self.night_end_hour
        } else {
            hour >= self.night_start_hour || hour < self.night_end_hour
        }
    }
}

/// Model assessment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Fraud probability at or above which a transaction counts as fraud
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// Pipeline execution configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Per-capability invocation timeout in milliseconds
    #[serde(default = "default_capability_timeout_ms")]
    pub capability_timeout_ms: u64,
}

fn default_capability_timeout_ms() -> u64 {
    5000
}

impl PipelineConfig {
    /// Capability timeout as a [`Duration`].
    pub fn capability_timeout(&self) -> Duration {
        Duration::from_millis(self.capability_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file location.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig {
                amount_ceiling: default_amount_ceiling(),
                night_start_hour: default_night_start_hour(),
                night_end_hour: default_night_end_hour(),
                suspicious_keywords: default_suspicious_keywords(),
            },
            scoring: ScoringConfig {
                threshold: default_threshold(),
            },
            pipeline: PipelineConfig {
                capability_timeout_ms: default_capability_timeout_ms(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.rules.amount_ceiling, 5000.0);
        assert_eq!(config.rules.night_start_hour, 23);
        assert_eq!(config.rules.night_end_hour, 6);
        assert_eq!(config.scoring.threshold, 0.5);
        assert_eq!(config.pipeline.capability_timeout_ms, 5000);
    }

    #[test]
    fn test_capability_timeout_conversion() {
        let config = AppConfig::default();
        assert_eq!(
            config.pipeline.capability_timeout(),
            Duration::from_millis(5000)
        );
    }

    #[test]
    fn test_night_window_wraps_midnight() {
        let config = AppConfig::default();
        assert!(config.rules.is_night_hour(23));
        assert!(config.rules.is_night_hour(0));
        assert!(config.rules.is_night_hour(5));
        assert!(!config.rules.is_night_hour(6));
        assert!(!config.rules.is_night_hour(22));
    }

    #[test]
    fn test_suspicious_keywords_default() {
        let config = AppConfig::default();
        assert!(config
            .rules
            .suspicious_keywords
            .iter()
            .any(|k| k == "urgent"));
    }
}

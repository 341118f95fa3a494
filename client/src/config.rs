//! Configuration management for the Buen Sabor client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with SABOR_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::dashboard::AlertThresholds;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Backend API configuration
    pub api: ApiConfig,

    /// Credentials used by the CLI
    #[serde(default)]
    pub auth: AuthConfig,

    /// Dashboard thresholds and refresh timing
    pub dashboard: DashboardConfig,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the REST API, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    pub email: Option<String>,
    pub password: Option<String>,

    /// Pre-issued bearer token; skips the login call when set
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub critical_threshold: f64,
    pub low_threshold: f64,
    pub high_threshold: f64,

    /// Minimum acceptable margin as a ratio (0.20 = 20%)
    pub min_margin: f64,

    /// Cost multiplier suggested for new products
    pub default_margin_multiplier: f64,

    /// Seconds between dashboard refreshes
    pub auto_refresh_secs: u64,

    /// Seconds after which dashboard data is considered stale
    pub stale_after_secs: u64,
}

impl DashboardConfig {
    pub fn thresholds(&self) -> AlertThresholds {
        let defaults = AlertThresholds::default();
        let to_decimal =
            |value: f64, fallback: Decimal| Decimal::from_f64(value).unwrap_or(fallback);
        AlertThresholds {
            critical: to_decimal(self.critical_threshold, defaults.critical),
            low: to_decimal(self.low_threshold, defaults.low),
            high: to_decimal(self.high_threshold, defaults.high),
            min_margin: to_decimal(self.min_margin, defaults.min_margin),
        }
    }

    pub fn default_multiplier(&self) -> Decimal {
        Decimal::from_f64(self.default_margin_multiplier).unwrap_or(Decimal::new(25, 1))
    }

    pub fn auto_refresh(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 20.0,
            low_threshold: 40.0,
            high_threshold: 80.0,
            min_margin: 0.20,
            default_margin_multiplier: 2.5,
            auto_refresh_secs: 300,
            stale_after_secs: 600,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SABOR_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:8080/api")?
            .set_default("api.timeout_secs", 15)?
            .set_default("dashboard.critical_threshold", 20.0)?
            .set_default("dashboard.low_threshold", 40.0)?
            .set_default("dashboard.high_threshold", 80.0)?
            .set_default("dashboard.min_margin", 0.20)?
            .set_default("dashboard.default_margin_multiplier", 2.5)?
            .set_default("dashboard.auto_refresh_secs", 300)?
            .set_default("dashboard.stale_after_secs", 600)?
            .set_default("logging.format", "pretty")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SABOR_ prefix)
            .add_source(
                Environment::with_prefix("SABOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            dashboard: DashboardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_match_shared_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.thresholds(), AlertThresholds::default());
        assert_eq!(config.default_multiplier(), Decimal::new(25, 1));
        assert_eq!(config.auto_refresh(), Duration::from_secs(300));
        assert_eq!(config.stale_after(), Duration::from_secs(600));
    }

    #[test]
    fn test_api_defaults() {
        let api = ApiConfig::default();
        assert_eq!(api.base_url, "http://localhost:8080/api");
        assert_eq!(api.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_log_format_parses_lowercase() {
        let logging: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(logging.format, LogFormat::Json);
    }
}

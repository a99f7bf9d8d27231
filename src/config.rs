use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::rl::config::{QLearningConfig, RewardConfig};
use crate::rl::environment::{
    generate_synthetic_prices, EngineConfig, PriceSeries, SyntheticSeriesConfig,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub training: QLearningConfig,
    #[serde(default)]
    pub reward: RewardConfig,
    #[serde(default)]
    pub series: SeriesConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source of the price series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Explicit close prices; the synthetic generator is used when absent
    #[serde(default)]
    pub prices: Option<Vec<f64>>,
    #[serde(default)]
    pub synthetic: SyntheticSeriesConfig,
}

impl SeriesConfig {
    /// Number of prices the configured source yields
    pub fn len(&self) -> usize {
        match &self.prices {
            Some(prices) => prices.len(),
            None => self.synthetic.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the price series
    pub fn resolve(&self) -> Result<PriceSeries> {
        match &self.prices {
            Some(prices) => PriceSeries::new(prices.clone()),
            None => generate_synthetic_prices(&self.synthetic),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match &self.prices {
            Some(prices) => {
                if prices.is_empty() {
                    errors.push("series.prices must not be empty".to_string());
                }
                for (idx, price) in prices.iter().enumerate() {
                    if !price.is_finite() || *price <= 0.0 {
                        errors.push(format!(
                            "series.prices[{idx}] must be finite and positive, got {price}"
                        ));
                    }
                }
            }
            None => {
                let synthetic = &self.synthetic;
                if synthetic.length == 0 {
                    errors.push("series.synthetic.length must be at least 1".to_string());
                }
                if !synthetic.initial_price.is_finite() || synthetic.initial_price <= 0.0 {
                    errors.push("series.synthetic.initial_price must be positive".to_string());
                }
                if !synthetic.volatility.is_finite() || synthetic.volatility < 0.0 {
                    errors.push("series.synthetic.volatility must be non-negative".to_string());
                }
                if !synthetic.drift.is_finite() {
                    errors.push("series.synthetic.drift must be finite".to_string());
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rolling log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("QTRADE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (QTRADE__TRAINING__EPISODES, etc.)
            .add_source(
                Environment::with_prefix("QTRADE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(series_errors) = self.series.validate() {
            errors.extend(series_errors);
        }

        // Frame checks need the series length
        let training = if self.series.is_empty() {
            self.training.validate()
        } else {
            self.training.validate_for_series(self.series.len())
        };
        if let Err(training_errors) = training {
            errors.extend(training_errors);
        }

        if let Err(engine_errors) = self.engine.validate() {
            errors.extend(engine_errors);
        }

        if self.logging.level.trim().is_empty() {
            errors.push("logging.level must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::config::FrameBound;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "qtrade-config-{name}-{}-{nanos}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.training.episodes, 20_000);
        assert_eq!(config.training.window_size(), 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.series.len(), 250);
    }

    #[test]
    fn test_frame_beyond_series_rejected() {
        let mut config = AppConfig::default();
        config.series.prices = Some(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        config.training.frame_bound = FrameBound::new(2, 7);

        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("exceeds the price series length")));
    }

    #[test]
    fn test_collects_every_violation() {
        let mut config = AppConfig::default();
        config.series.prices = Some(vec![1.0, -2.0]);
        config.training.learning_rate = 1.5;
        config.engine.trade_fee_bid_percent = 1.0;

        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("series.prices[1]")));
        assert!(errors.iter().any(|e| e.contains("learning_rate")));
        assert!(errors.iter().any(|e| e.contains("trade_fee_bid_percent")));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = scratch_dir("load");
        std::fs::write(
            dir.join("default.toml"),
            r#"
[training]
episodes = 12
learning_rate = 0.25
frame_bound = { start = 3, end = 8 }

[series]
prices = [10.0, 11.0, 12.0, 11.0, 13.0, 12.5, 14.0, 15.0]

[logging]
json = true
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&dir).unwrap();
        assert_eq!(config.training.episodes, 12);
        assert_eq!(config.training.learning_rate, 0.25);
        assert_eq!(config.training.frame_bound, FrameBound::new(3, 8));
        // Untouched keys keep their defaults
        assert_eq!(config.training.discount_factor, 0.5);
        assert_eq!(config.reward.profit_multiplier, 3.0);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
        assert_eq!(config.series.resolve().unwrap().len(), 8);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_directory_uses_defaults() {
        let config = AppConfig::load_from("/nonexistent/qtrade/config").unwrap();
        assert_eq!(config.training.epsilon_decay, 0.9996);
        assert!(config.series.prices.is_none());
    }

    #[test]
    fn test_toml_export_round_trips() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[training]"));
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.training.episodes, config.training.episodes);
    }
}

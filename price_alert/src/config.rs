//! Monitor configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `PRICEWATCH_*` environment variables. Nested keys use a
//! double underscore, e.g. `PRICEWATCH_THRESHOLDS__DROP_MARGIN=0.4`.

use crate::error::{AlertError, Result};
use crate::modules::ModuleKind;
use crate::policy::PolicyThresholds;
use crate::store::Retention;
use price_analysis::DEFAULT_WINDOW_CAPACITY;
use price_forecast::{PredictionConfig, DEFAULT_FEEDBACK_WINDOW_HOURS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "PRICEWATCH";

/// Longest history or feedback window accepted, one year in hours
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

/// Parameters of the synthetic price feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticFeedConfig {
    pub base_price: f64,
    /// Largest step between consecutive prices
    pub volatility: f64,
    pub seed: Option<u64>,
}

impl Default for SyntheticFeedConfig {
    fn default() -> Self {
        Self {
            base_price: 3.0,
            volatility: 0.2,
            seed: None,
        }
    }
}

/// Top-level monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between scheduled cycles
    pub collection_interval_secs: u64,
    /// Hours of stored history fed to the prediction engine
    pub history_hours: i64,
    /// Hours of feedback used to calibrate predictions
    pub feedback_window_hours: i64,
    /// Deadline for a whole cycle, in milliseconds
    pub cycle_timeout_ms: u64,
    /// Samples kept by the trend analyzer
    pub window_capacity: usize,
    /// Price threshold reported by the price monitor module, in cents
    pub min_rate: f64,
    pub log_level: String,
    pub modules: Vec<ModuleKind>,
    pub synthetic: SyntheticFeedConfig,
    pub prediction: PredictionConfig,
    pub thresholds: PolicyThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            collection_interval_secs: 300,
            history_hours: 24,
            feedback_window_hours: DEFAULT_FEEDBACK_WINDOW_HOURS,
            cycle_timeout_ms: 30_000,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            min_rate: 3.0,
            log_level: "info".to_string(),
            modules: ModuleKind::ALL.to_vec(),
            synthetic: SyntheticFeedConfig::default(),
            prediction: PredictionConfig::default(),
            thresholds: PolicyThresholds::default(),
        }
    }
}

impl MonitorConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("modules")
                .try_parsing(true),
        );

        let config: MonitorConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collection_interval_secs == 0 {
            return Err(AlertError::Config(
                "collection_interval_secs must be positive".to_string(),
            ));
        }
        if self.history_hours <= 0 {
            return Err(AlertError::Config(
                "history_hours must be positive".to_string(),
            ));
        }
        if self.history_hours > MAX_WINDOW_HOURS {
            return Err(AlertError::Config(format!(
                "history_hours must be at most {}",
                MAX_WINDOW_HOURS
            )));
        }
        if self.feedback_window_hours <= 0 {
            return Err(AlertError::Config(
                "feedback_window_hours must be positive".to_string(),
            ));
        }
        if self.feedback_window_hours > MAX_WINDOW_HOURS {
            return Err(AlertError::Config(format!(
                "feedback_window_hours must be at most {}",
                MAX_WINDOW_HOURS
            )));
        }
        if self.cycle_timeout_ms == 0 {
            return Err(AlertError::Config(
                "cycle_timeout_ms must be positive".to_string(),
            ));
        }
        if self.window_capacity == 0 {
            return Err(AlertError::Config(
                "window_capacity must be positive".to_string(),
            ));
        }
        if !self.min_rate.is_finite() {
            return Err(AlertError::Config("min_rate must be finite".to_string()));
        }

        self.prediction.validate()?;
        self.thresholds.validate()
    }

    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_millis(self.cycle_timeout_ms)
    }

    /// Store retention: price rows cover the history window, predictions
    /// cover the feedback window
    pub fn retention(&self) -> Retention {
        let hours = |value: i64| chrono::Duration::hours(value.clamp(1, MAX_WINDOW_HOURS));
        Retention {
            prices: hours(self.history_hours),
            predictions: hours(self.feedback_window_hours),
        }
    }
}

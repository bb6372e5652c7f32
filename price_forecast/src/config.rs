//! Prediction model parameters

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Tunable parameters of the weighted-average prediction model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// History points needed for the full model (30 minutes at 5-minute cadence)
    pub min_history_points: usize,
    /// Newest points used by the weighted average and momentum
    pub max_window: usize,
    /// Confidence reported by the limited model
    pub limited_confidence: f64,
    /// Accuracy assumed when no feedback exists
    pub default_accuracy: f64,
    /// Multiplier applied by the limited model on a rising trend
    pub rising_factor: f64,
    /// Multiplier applied by the limited model on a falling trend
    pub falling_factor: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_history_points: 6,
            max_window: 12,
            limited_confidence: 30.0,
            default_accuracy: 0.7,
            rising_factor: 1.02,
            falling_factor: 0.98,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_history_points < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_history_points must be at least 2".to_string(),
            ));
        }
        if self.max_window < 2 {
            return Err(ForecastError::InvalidParameter(
                "max_window must be at least 2".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.limited_confidence) {
            return Err(ForecastError::InvalidParameter(
                "limited_confidence must be between 0 and 100".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_accuracy) {
            return Err(ForecastError::InvalidParameter(
                "default_accuracy must be between 0 and 1".to_string(),
            ));
        }
        if self.rising_factor < 1.0 || self.falling_factor > 1.0 || self.falling_factor <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "rising_factor must be >= 1 and falling_factor in (0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

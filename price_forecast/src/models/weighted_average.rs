//! Feedback-calibrated weighted moving average model
//!
//! The full model needs `min_history_points` prices. It blends an
//! exponentially weighted average of the newest prices with their momentum,
//! and scores its own confidence from data sufficiency, feedback accuracy
//! and volatility. Shorter histories get a limited trend-following guess.

use crate::config::PredictionConfig;
use crate::error::{ForecastError, Result};
use crate::feedback::FeedbackEvent;
use crate::models::calibration::calibrate;
use crate::models::{ForecastBackend, PredictionRecord, PriceRange};
use price_analysis::Trend;
use price_math::{
    exponential_weights, mean, momentum, population_std_dev, round_to, volatility_ratio,
    weighted_average,
};
use tracing::debug;

/// Bounds on the relative width of the next-hour range
const MIN_RANGE_FACTOR: f64 = 0.02;
const MAX_RANGE_FACTOR: f64 = 0.1;
/// Relative spread assumed when a single price gives no deviation
const SINGLE_POINT_SPREAD: f64 = 0.1;

/// Weighted-average prediction engine
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    name: String,
    config: PredictionConfig,
}

impl PredictionEngine {
    /// Create an engine with default parameters
    pub fn new() -> Self {
        Self {
            name: "Weighted Moving Average".to_string(),
            config: PredictionConfig::default(),
        }
    }

    /// Create an engine with custom parameters
    pub fn with_config(config: PredictionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: format!(
                "Weighted Moving Average (window={}, min_points={})",
                config.max_window, config.min_history_points
            ),
            config,
        })
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Full model over newest-first `prices`
    ///
    /// Fails with `DataUnavailable` or `InsufficientHistory` when the
    /// history is too short; `predict` turns those into degraded records.
    pub fn full_prediction(
        &self,
        prices: &[f64],
        feedback: &[FeedbackEvent],
    ) -> Result<PredictionRecord> {
        if prices.is_empty() {
            return Err(ForecastError::DataUnavailable(
                "no usable price history".to_string(),
            ));
        }
        if prices.len() < self.config.min_history_points {
            return Err(ForecastError::InsufficientHistory {
                needed: self.config.min_history_points,
                available: prices.len(),
            });
        }

        let calibration = calibrate(feedback, self.config.default_accuracy);
        let avg_accuracy = calibration.avg_accuracy;

        let window = prices.len().min(self.config.max_window);
        let recent = &prices[..window];
        let newest = recent[0];

        let weights = exponential_weights(window, calibration.weights.historical)?;
        let weighted_ma = weighted_average(recent, &weights)?;
        let price_momentum = momentum(recent);

        let base_prediction = weighted_ma * (1.0 + price_momentum);
        let confidence_factor = (avg_accuracy * 1.2).min(1.0);
        let prediction = base_prediction * (1.0 + price_momentum * confidence_factor);

        // negative means would otherwise turn the penalty into a bonus
        let volatility_penalty = (volatility_ratio(prices).abs() * 100.0).min(20.0);
        let confidence = (50.0
            + prices.len().min(20) as f64
            + avg_accuracy * 20.0
            - volatility_penalty)
            .clamp(0.0, 100.0);

        let range_factor = population_std_dev(recent)
            .unwrap_or(0.0)
            .clamp(MIN_RANGE_FACTOR, MAX_RANGE_FACTOR);

        debug!(
            window,
            weighted_ma,
            momentum = price_momentum,
            avg_accuracy,
            historical_weight = calibration.weights.historical,
            "full prediction computed"
        );

        Ok(PredictionRecord {
            id: None,
            short_term_prediction: Some(round_to(prediction, 2)),
            confidence: round_to(confidence, 1),
            trend: Trend::compare(newest, weighted_ma),
            feedback_quality: calibration
                .from_feedback
                .then(|| (avg_accuracy * 100.0).round()),
            next_hour_range: Some(PriceRange {
                low: round_to(prediction * (1.0 - range_factor), 2),
                high: round_to(prediction * (1.0 + range_factor), 2),
            }),
        })
    }

    /// Trend-following guess for histories shorter than the full model needs
    pub fn limited_prediction(&self, prices: &[f64]) -> PredictionRecord {
        let (Some(&newest), Some(average)) = (prices.first(), mean(prices)) else {
            return PredictionRecord::empty();
        };

        let trend = Trend::compare(newest, average);
        let factor = match trend {
            Trend::Rising => self.config.rising_factor,
            Trend::Falling => self.config.falling_factor,
            _ => 1.0,
        };

        let spread = if prices.len() > 1 {
            population_std_dev(prices).unwrap_or(SINGLE_POINT_SPREAD)
        } else {
            SINGLE_POINT_SPREAD
        };

        PredictionRecord {
            id: None,
            short_term_prediction: Some(newest * factor),
            confidence: self.config.limited_confidence,
            trend,
            feedback_quality: None,
            next_hour_range: Some(PriceRange {
                low: round_to(newest * (1.0 - spread), 2),
                high: round_to(newest * (1.0 + spread), 2),
            }),
        }
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastBackend for PredictionEngine {
    fn predict(&self, history: &[f64], feedback: &[FeedbackEvent]) -> Result<PredictionRecord> {
        let prices: Vec<f64> = history.iter().copied().filter(|p| p.is_finite()).collect();

        match self.full_prediction(&prices, feedback) {
            Err(ForecastError::DataUnavailable(reason)) => {
                debug!(%reason, "no history, returning empty prediction");
                Ok(PredictionRecord::empty())
            }
            Err(ForecastError::InsufficientHistory { needed, available }) => {
                debug!(needed, available, "limited history, using basic prediction");
                Ok(self.limited_prediction(&prices))
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

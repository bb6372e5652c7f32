//! Alert decision rules
//!
//! A notification is due when the current price is far from the window
//! average, when a falling price approaches the window low, or when a
//! confident prediction expects a large move.

use crate::error::{AlertError, Result};
use price_analysis::{AnalysisSnapshot, Trend};
use price_forecast::PredictionRecord;
use serde::{Deserialize, Serialize};

/// Margins and confidence threshold of the alert rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyThresholds {
    /// Current price at least this far below average counts as a drop
    pub drop_margin: f64,
    /// Current price at least this far above average counts as a spike
    pub spike_margin: f64,
    /// Distance from the window low that counts as near the low
    pub near_low_margin: f64,
    /// Predictions below this confidence are ignored
    pub min_confidence: f64,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            drop_margin: 0.5,
            spike_margin: 1.0,
            near_low_margin: 0.3,
            min_confidence: 70.0,
        }
    }
}

impl PolicyThresholds {
    pub fn validate(&self) -> Result<()> {
        let margins = [self.drop_margin, self.spike_margin, self.near_low_margin];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(AlertError::Config(
                "alert margins must be finite and non-negative".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(AlertError::Config(format!(
                "min_confidence must be between 0 and 100, got {}",
                self.min_confidence
            )));
        }

        Ok(())
    }
}

/// Which alert rules fired
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertReasons {
    pub price_drop: bool,
    pub price_spike: bool,
    pub near_low_and_falling: bool,
    pub predicted_drop: bool,
    pub predicted_spike: bool,
}

impl AlertReasons {
    pub fn any(&self) -> bool {
        self.price_drop
            || self.price_spike
            || self.near_low_and_falling
            || self.predicted_drop
            || self.predicted_spike
    }

    /// Names of the rules that fired
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.price_drop, "price_drop"),
            (self.price_spike, "price_spike"),
            (self.near_low_and_falling, "near_low_and_falling"),
            (self.predicted_drop, "predicted_drop"),
            (self.predicted_spike, "predicted_spike"),
        ]
        .into_iter()
        .filter_map(|(fired, label)| fired.then_some(label))
        .collect()
    }
}

/// Stateless alert decision
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NotificationPolicy {
    thresholds: PolicyThresholds,
}

impl NotificationPolicy {
    pub fn new(thresholds: PolicyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    pub fn evaluate(&self, snapshot: &AnalysisSnapshot, prediction: &PredictionRecord) -> AlertReasons {
        let t = &self.thresholds;
        let current = snapshot.current_price;
        let average = snapshot.average_price;

        let confident_prediction = prediction
            .short_term_prediction
            .filter(|_| prediction.confidence >= t.min_confidence);

        AlertReasons {
            price_drop: current <= average - t.drop_margin,
            price_spike: current >= average + t.spike_margin,
            near_low_and_falling: snapshot.trend == Trend::Falling
                && current <= snapshot.min_price + t.near_low_margin,
            predicted_drop: confident_prediction.is_some_and(|p| p <= current - t.drop_margin),
            predicted_spike: confident_prediction.is_some_and(|p| p >= current + t.spike_margin),
        }
    }

    pub fn should_notify(&self, snapshot: &AnalysisSnapshot, prediction: &PredictionRecord) -> bool {
        self.evaluate(snapshot, prediction).any()
    }
}

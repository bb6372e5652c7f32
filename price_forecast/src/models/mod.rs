//! Prediction records and forecasting backends

use crate::error::Result;
use crate::feedback::FeedbackEvent;
use price_analysis::Trend;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

pub mod calibration;
pub mod weighted_average;

/// Identifier assigned by the persistence store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Expected price band for the next hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

/// Output of a forecasting backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Assigned once the record has been persisted
    pub id: Option<RecordId>,
    /// Forecast of the next short-term price
    pub short_term_prediction: Option<f64>,
    /// Confidence score, 0-100
    pub confidence: f64,
    pub trend: Trend,
    /// Mean feedback accuracy as a percentage, when feedback existed
    pub feedback_quality: Option<f64>,
    pub next_hour_range: Option<PriceRange>,
}

impl PredictionRecord {
    /// A record carrying no forecast
    pub fn empty() -> Self {
        Self {
            id: None,
            short_term_prediction: None,
            confidence: 0.0,
            trend: Trend::Unknown,
            feedback_quality: None,
            next_hour_range: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.short_term_prediction.is_none()
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for PredictionRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// A forecasting model producing one short-term prediction
///
/// `history` is ordered newest first. `feedback` holds recent accuracy
/// ratings used to calibrate the model.
pub trait ForecastBackend: Debug + Send + Sync {
    fn predict(&self, history: &[f64], feedback: &[FeedbackEvent]) -> Result<PredictionRecord>;

    /// Name of the model
    fn name(&self) -> &str;
}

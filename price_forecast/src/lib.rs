//! # Price Forecast
//!
//! Short-term electricity price forecasting calibrated by human feedback.
//!
//! ```
//! use price_forecast::{ForecastBackend, PredictionEngine};
//!
//! let engine = PredictionEngine::new();
//! // newest first
//! let record = engine.predict(&[2.1, 2.0, 1.9, 2.0, 2.0, 1.8], &[]).unwrap();
//! assert!(record.short_term_prediction.is_some());
//! assert!((0.0..=100.0).contains(&record.confidence));
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod metrics;
pub mod models;

pub use config::PredictionConfig;
pub use error::{ForecastError, Result};
pub use feedback::{
    FeedbackEvent, FeedbackRating, FeedbackRegistry, FeedbackStore, DEFAULT_FEEDBACK_WINDOW_HOURS,
};
pub use metrics::{average_accuracy, recency_weighted_accuracy};
pub use models::calibration::{calibrate, Calibration, WeightProfile};
pub use models::weighted_average::PredictionEngine;
pub use models::{ForecastBackend, PredictionRecord, PriceRange, RecordId};

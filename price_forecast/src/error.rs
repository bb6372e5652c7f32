//! Error types for the price_forecast crate

use crate::models::RecordId;
use price_math::MathError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No usable price history at all
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Some history, but not enough for the full model
    #[error("Insufficient history: need {needed} points, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    /// Numeric failure inside a forecast
    #[error("Calculation error: {0}")]
    CalculationError(String),

    /// Error related to input validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Feedback referenced a prediction the store does not know
    #[error("Unknown prediction record: {0}")]
    UnknownRecord(RecordId),

    /// The external store failed
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Error serializing a record
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

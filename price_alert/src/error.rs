//! Error types for the price_alert crate

use price_analysis::AnalysisError;
use price_forecast::ForecastError;
use thiserror::Error;

/// Custom error types for the price_alert crate
#[derive(Debug, Error)]
pub enum AlertError {
    /// A collaborator (price source, store) failed
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// A sample or query carried no usable price
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The cycle deadline expired
    #[error("Cycle timed out after {0} ms")]
    Timeout(u64),

    /// Delivering a notification failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before reaching a collaborator
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for AlertError {
    fn from(err: config::ConfigError) -> Self {
        AlertError::Config(err.to_string())
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, AlertError>;

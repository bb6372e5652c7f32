//! # Price Math
//!
//! Numeric kernels shared by the price analysis and forecasting crates.
//! Every function here guards its divisions: a zero denominator yields a
//! documented fallback value instead of a NaN or an error.

use thiserror::Error;

pub mod momentum;
pub mod moving_averages;
pub mod statistics;

pub use momentum::momentum;
pub use moving_averages::{exponential_weights, weighted_average};
pub use statistics::{mean, min_max, population_std_dev, round_to, volatility_ratio};

/// Errors that can occur in price calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for price math operations
pub type Result<T> = std::result::Result<T, MathError>;

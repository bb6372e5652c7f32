//! Weighted moving average calculations
//!
//! Prices are expected newest-first: index 0 is the most recent
//! observation and receives the largest weight.

use crate::{MathError, Result};

/// Build normalized exponential decay weights
///
/// `w_i = exp(-i * decay)` for `i` in `0..window`, scaled so the weights sum
/// to one. A `decay` of zero gives equal weights.
pub fn exponential_weights(window: usize, decay: f64) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }
    if !decay.is_finite() || decay < 0.0 {
        return Err(MathError::InvalidInput(format!(
            "Decay must be a non-negative finite number, got {}",
            decay
        )));
    }

    let raw: Vec<f64> = (0..window).map(|i| (-(i as f64) * decay).exp()).collect();
    // w_0 is exp(0) = 1, so the total is at least one
    let total: f64 = raw.iter().sum();

    Ok(raw.into_iter().map(|w| w / total).collect())
}

/// Weighted average of `values` using `weights` of the same length
pub fn weighted_average(values: &[f64], weights: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot average an empty series".to_string(),
        ));
    }
    if values.len() != weights.len() {
        return Err(MathError::InvalidInput(format!(
            "Values length ({}) doesn't match weights length ({})",
            values.len(),
            weights.len()
        )));
    }

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum == 0.0 {
        return Err(MathError::CalculationError(
            "Weights sum to zero".to_string(),
        ));
    }

    let weighted: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Ok(weighted / weight_sum)
}

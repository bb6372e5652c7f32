//! Descriptive statistics over price slices
//!
//! Thin wrappers around `statrs` that return `None` for empty input
//! instead of `NaN`.

use statrs::statistics::Statistics;

/// Volatility ratio used when the mean of a series is zero
pub const ZERO_MEAN_VOLATILITY_RATIO: f64 = 0.1;

/// Arithmetic mean, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().mean())
}

/// Population standard deviation (divides by `n`), or `None` for an empty slice
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().population_std_dev())
}

/// Minimum and maximum of a slice, or `None` if it is empty
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    }))
}

/// Coefficient of variation (`stddev / mean`)
///
/// Falls back to [`ZERO_MEAN_VOLATILITY_RATIO`] when the slice is empty or
/// its mean is zero.
pub fn volatility_ratio(values: &[f64]) -> f64 {
    match (mean(values), population_std_dev(values)) {
        (Some(avg), Some(std_dev)) if avg != 0.0 => std_dev / avg,
        _ => ZERO_MEAN_VOLATILITY_RATIO,
    }
}

/// Round `value` to `decimals` decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std_dev(&[]), None);
        assert_eq!(min_max(&[]), None);
        assert_eq!(volatility_ratio(&[]), ZERO_MEAN_VOLATILITY_RATIO);
    }

    #[test]
    fn test_basic_statistics() {
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

        assert_relative_eq!(mean(&prices).unwrap(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(population_std_dev(&prices).unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(min_max(&prices), Some((2.0, 9.0)));
        assert_relative_eq!(volatility_ratio(&prices), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_single_value_has_zero_deviation() {
        assert_relative_eq!(population_std_dev(&[3.2]).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_mean_falls_back() {
        assert_eq!(volatility_ratio(&[-1.0, 1.0]), ZERO_MEAN_VOLATILITY_RATIO);
        assert_eq!(volatility_ratio(&[0.0, 0.0]), ZERO_MEAN_VOLATILITY_RATIO);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.456, 2), 2.46);
        assert_eq!(round_to(71.249, 1), 71.2);
        assert_eq!(round_to(84.0, 0), 84.0);
    }
}

//! Accuracy metrics over human feedback

use crate::feedback::FeedbackEvent;
use chrono::{DateTime, Utc};
use price_math::{mean, round_to};

/// Mean accuracy of the feedback events with a finite value in `[0, 1]`
///
/// Returns `None` when no event qualifies.
pub fn average_accuracy(feedback: &[FeedbackEvent]) -> Option<f64> {
    let values: Vec<f64> = feedback
        .iter()
        .map(|event| event.accuracy)
        .filter(|a| a.is_finite() && (0.0..=1.0).contains(a))
        .collect();

    mean(&values)
}

/// Accuracy weighted towards recent feedback
///
/// Each event weighs `1 / (days_old + 1)` where `days_old` counts whole
/// days between `recorded_at` and `now`. Rounded to two decimals, 0 without
/// feedback.
pub fn recency_weighted_accuracy(feedback: &[FeedbackEvent], now: DateTime<Utc>) -> f64 {
    let (weighted, total) = feedback
        .iter()
        .filter(|event| event.accuracy.is_finite())
        .fold((0.0, 0.0), |(weighted, total), event| {
            let days_old = (now - event.recorded_at).num_days().max(0) as f64;
            let weight = 1.0 / (days_old + 1.0);
            (weighted + event.accuracy * weight, total + weight)
        });

    if total == 0.0 {
        return 0.0;
    }

    round_to(weighted / total, 2)
}

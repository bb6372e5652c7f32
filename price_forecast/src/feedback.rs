//! Human feedback on past predictions
//!
//! Feedback is owned by an external store reached through [`FeedbackStore`].
//! [`FeedbackRegistry`] validates ratings before they are written and reads
//! back the recent accuracy-bearing records used to calibrate forecasts.

use crate::error::{ForecastError, Result};
use crate::models::RecordId;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// Default look-back window for feedback, in hours
pub const DEFAULT_FEEDBACK_WINDOW_HOURS: i64 = 72;

/// Accuracy rating attached to a stored prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub record_id: RecordId,
    /// Accuracy in `[0, 1]`
    pub accuracy: f64,
    /// When the rated prediction was created
    pub recorded_at: DateTime<Utc>,
}

impl FeedbackEvent {
    pub fn new(record_id: RecordId, accuracy: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            record_id,
            accuracy,
            recorded_at,
        }
    }
}

/// Two-button rating offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRating {
    Accurate,
    Inaccurate,
}

impl FeedbackRating {
    pub fn accuracy(self) -> f64 {
        match self {
            FeedbackRating::Accurate => 1.0,
            FeedbackRating::Inaccurate => 0.0,
        }
    }
}

impl FromStr for FeedbackRating {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accurate" => Ok(FeedbackRating::Accurate),
            "inaccurate" => Ok(FeedbackRating::Inaccurate),
            other => Err(ForecastError::ValidationError(format!(
                "unknown feedback rating '{}'",
                other
            ))),
        }
    }
}

/// Persistence boundary for prediction feedback
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Overwrite the accuracy of a stored prediction
    ///
    /// Returns `false` when no prediction has the given id.
    async fn update_accuracy(&self, id: RecordId, accuracy: f64) -> Result<bool>;

    /// Predictions created within `window` that carry an accuracy
    async fn recent_with_accuracy(&self, window: Duration) -> Result<Vec<FeedbackEvent>>;
}

/// Validates and relays feedback to a [`FeedbackStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackRegistry {
    window_hours: i64,
}

impl FeedbackRegistry {
    pub fn new() -> Self {
        Self {
            window_hours: DEFAULT_FEEDBACK_WINDOW_HOURS,
        }
    }

    pub fn with_window_hours(window_hours: i64) -> Result<Self> {
        if window_hours <= 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "feedback window must be positive, got {} hours",
                window_hours
            )));
        }

        Ok(Self { window_hours })
    }

    pub fn window_hours(&self) -> i64 {
        self.window_hours
    }

    /// Check that `accuracy` is a finite value in `[0, 1]`
    pub fn validate_accuracy(accuracy: f64) -> Result<f64> {
        if accuracy.is_finite() && (0.0..=1.0).contains(&accuracy) {
            Ok(accuracy)
        } else {
            Err(ForecastError::ValidationError(format!(
                "accuracy must be between 0 and 1, got {}",
                accuracy
            )))
        }
    }

    /// Store `accuracy` for prediction `id`, replacing any earlier rating
    pub async fn record<S>(&self, store: &S, id: RecordId, accuracy: f64) -> Result<()>
    where
        S: FeedbackStore + ?Sized,
    {
        let accuracy = Self::validate_accuracy(accuracy)?;

        if !store.update_accuracy(id, accuracy).await? {
            return Err(ForecastError::UnknownRecord(id));
        }

        info!(record_id = %id, accuracy, "feedback recorded");
        Ok(())
    }

    /// Feedback from the registry's window, newest first
    pub async fn recent<S>(&self, store: &S) -> Result<Vec<FeedbackEvent>>
    where
        S: FeedbackStore + ?Sized,
    {
        self.recent_within(store, Duration::hours(self.window_hours))
            .await
    }

    /// Feedback from an explicit window, newest first
    pub async fn recent_within<S>(&self, store: &S, window: Duration) -> Result<Vec<FeedbackEvent>>
    where
        S: FeedbackStore + ?Sized,
    {
        let mut events = store.recent_with_accuracy(window).await?;
        events.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

        debug!(count = events.len(), "loaded recent feedback");
        Ok(events)
    }
}

impl Default for FeedbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("accurate", FeedbackRating::Accurate, 1.0)]
    #[case(" Inaccurate ", FeedbackRating::Inaccurate, 0.0)]
    fn test_rating_parse(#[case] input: &str, #[case] expected: FeedbackRating, #[case] accuracy: f64) {
        let rating: FeedbackRating = input.parse().unwrap();
        assert_eq!(rating, expected);
        assert_eq!(rating.accuracy(), accuracy);
    }

    #[test]
    fn test_rating_parse_rejects_unknown() {
        assert!("maybe".parse::<FeedbackRating>().is_err());
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(1.0, true)]
    #[case(0.9, true)]
    #[case(-0.1, false)]
    #[case(1.01, false)]
    #[case(f64::NAN, false)]
    fn test_validate_accuracy(#[case] accuracy: f64, #[case] valid: bool) {
        assert_eq!(FeedbackRegistry::validate_accuracy(accuracy).is_ok(), valid);
    }

    #[test]
    fn test_window_must_be_positive() {
        assert!(FeedbackRegistry::with_window_hours(0).is_err());
        assert_eq!(FeedbackRegistry::default().window_hours(), 72);
    }
}

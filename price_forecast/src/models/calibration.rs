//! Weight calibration from human accuracy feedback

use crate::feedback::FeedbackEvent;
use crate::metrics::average_accuracy;
use serde::{Deserialize, Serialize};

/// Relative emphasis of the model components
///
/// `historical` doubles as the decay rate of the exponential weights: the
/// larger it is, the faster older prices lose influence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub trend: f64,
    pub momentum: f64,
    pub historical: f64,
}

impl WeightProfile {
    /// Used when feedback says the model is doing well
    pub const CONFIDENT: Self = Self::new(0.5, 0.3, 0.2);
    /// Used without feedback or with middling accuracy
    pub const BALANCED: Self = Self::new(0.4, 0.3, 0.3);
    /// Used when feedback says the model is doing poorly
    pub const CAUTIOUS: Self = Self::new(0.3, 0.3, 0.4);

    pub const fn new(trend: f64, momentum: f64, historical: f64) -> Self {
        Self {
            trend,
            momentum,
            historical,
        }
    }
}

/// Result of calibrating against a feedback set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Mean accuracy of the feedback, or the default when there is none
    pub avg_accuracy: f64,
    pub weights: WeightProfile,
    /// Whether any usable feedback contributed
    pub from_feedback: bool,
}

/// Pick the weight profile for a feedback set
pub fn calibrate(feedback: &[FeedbackEvent], default_accuracy: f64) -> Calibration {
    let Some(avg_accuracy) = average_accuracy(feedback) else {
        return Calibration {
            avg_accuracy: default_accuracy,
            weights: WeightProfile::BALANCED,
            from_feedback: false,
        };
    };

    let weights = if avg_accuracy > 0.8 {
        WeightProfile::CONFIDENT
    } else if avg_accuracy > 0.6 {
        WeightProfile::BALANCED
    } else {
        WeightProfile::CAUTIOUS
    };

    Calibration {
        avg_accuracy,
        weights,
        from_feedback: true,
    }
}

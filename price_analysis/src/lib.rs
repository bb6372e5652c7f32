//! # Price Analysis
//!
//! `price_analysis` turns a stream of electricity price samples into
//! statistical snapshots.
//!
//! - **Samples**: [`PriceSample`] carries the five-minute, hourly and
//!   day-ahead prices reported at one collection tick
//! - **Rolling window**: [`SampleWindow`] keeps the most recent 288 samples
//!   (24 hours at a five-minute cadence)
//! - **Trend snapshots**: [`TrendAnalyzer`] recomputes an [`AnalysisSnapshot`]
//!   on every update
//! - **Patterns**: [`PatternAnalyzer`] flags spikes and cyclic behaviour
//! - **Insights**: hour-of-day statistics and savings estimates over history
//!
//! ## Usage Example
//!
//! ```
//! use chrono::Utc;
//! use price_analysis::{PriceSample, Trend, TrendAnalyzer};
//!
//! let mut analyzer = TrendAnalyzer::new();
//! analyzer.update(PriceSample::new(Utc::now()).with_five_min_price(2.4));
//! let snapshot = analyzer.update(PriceSample::new(Utc::now()).with_five_min_price(2.1));
//!
//! assert_eq!(snapshot.current_price, 2.1);
//! assert_eq!(snapshot.trend, Trend::Falling);
//! ```

use chrono::{DateTime, Utc};
use price_math::MathError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod insights;
pub mod patterns;
pub mod trend;
pub mod utils;
pub mod window;

pub use insights::{
    hourly_stats, savings_insights, weekly_savings_potential, HourlyStats, InsightKind,
    SavingsInsight,
};
pub use patterns::{PatternAnalyzer, PatternReport, PricePattern};
pub use trend::TrendAnalyzer;
pub use utils::{load_samples, SampleWalk};
pub use window::{SampleWindow, DEFAULT_WINDOW_CAPACITY};

/// Errors that can occur while analyzing price data
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Insufficient data for analysis: {0}")]
    InsufficientData(String),

    #[error("Data loading error: {0}")]
    DataLoadError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Direction of recent price movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    #[default]
    Unknown,
}

impl Trend {
    /// Classify `current` against a `reference` value
    pub fn compare(current: f64, reference: f64) -> Self {
        if current > reference {
            Trend::Rising
        } else if current < reference {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Rising => write!(f, "rising"),
            Trend::Falling => write!(f, "falling"),
            Trend::Stable => write!(f, "stable"),
            Trend::Unknown => write!(f, "unknown"),
        }
    }
}

/// One collection tick worth of prices, in cents per kWh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// When the prices were collected
    pub timestamp: DateTime<Utc>,
    /// Real-time five-minute price
    pub five_min_price: Option<f64>,
    /// Current hour average price
    pub hourly_price: Option<f64>,
    /// Day-ahead price for the current hour
    pub day_ahead_price: Option<f64>,
}

impl PriceSample {
    /// Create a sample with no prices set
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            five_min_price: None,
            hourly_price: None,
            day_ahead_price: None,
        }
    }

    pub fn with_five_min_price(mut self, price: f64) -> Self {
        self.five_min_price = Some(price);
        self
    }

    pub fn with_hourly_price(mut self, price: f64) -> Self {
        self.hourly_price = Some(price);
        self
    }

    pub fn with_day_ahead_price(mut self, price: f64) -> Self {
        self.day_ahead_price = Some(price);
        self
    }

    /// The price a user would pay right now
    ///
    /// The five-minute price wins when present and non-zero, then the hourly
    /// price, then zero.
    pub fn current_price(&self) -> f64 {
        match (self.five_min_price, self.hourly_price) {
            (Some(five_min), _) if five_min != 0.0 => five_min,
            (_, Some(hourly)) => hourly,
            _ => 0.0,
        }
    }

    /// Whether the sample carries a real-time price at all
    pub fn has_price(&self) -> bool {
        self.five_min_price.is_some() || self.hourly_price.is_some()
    }
}

/// A persisted hourly price point, as served by the history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    pub timestamp: DateTime<Utc>,
    pub hourly_price: f64,
    pub day_ahead_price: Option<f64>,
}

impl HistoricalPrice {
    /// Derive a history point from a sample, preferring its hourly price
    pub fn from_sample(sample: &PriceSample) -> Option<Self> {
        let hourly_price = sample.hourly_price.or(sample.five_min_price)?;

        Some(Self {
            timestamp: sample.timestamp,
            hourly_price,
            day_ahead_price: sample.day_ahead_price,
        })
    }
}

/// Statistical view of the sample window after an update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub current_price: f64,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub trend: Trend,
    /// Spread between the highest and lowest price in the window
    pub volatility: f64,
    /// Number of prices pooled into the statistics
    pub data_points: usize,
}

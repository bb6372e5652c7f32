//! # Pricewatch
//!
//! Electricity price monitoring: rolling price analysis, feedback-calibrated
//! short-term forecasts, and alert decisions.
//!
//! The workspace crates are re-exported here:
//!
//! - [`math`]: numeric kernels
//! - [`analysis`]: price samples, the rolling window, trend and pattern analysis
//! - [`forecast`]: the prediction engine and the feedback registry
//! - [`alert`]: the notification policy and the monitoring pipeline
//!
//! ## Example
//!
//! ```
//! use pricewatch_workspace::alert::NotificationPolicy;
//! use pricewatch_workspace::analysis::{PriceSample, Trend, TrendAnalyzer};
//! use pricewatch_workspace::forecast::{ForecastBackend, PredictionEngine};
//! use chrono::{Duration, Utc};
//!
//! let start = Utc::now();
//! let mut analyzer = TrendAnalyzer::new();
//! let mut snapshot = analyzer.snapshot();
//! for i in 0..6 {
//!     let sample = PriceSample::new(start + Duration::minutes(5 * i))
//!         .with_five_min_price(2.0)
//!         .with_hourly_price(2.0);
//!     snapshot = analyzer.update(sample);
//! }
//! assert_eq!(snapshot.trend, Trend::Stable);
//!
//! let prediction = PredictionEngine::new().predict(&[2.0; 6], &[]).unwrap();
//! assert!(!NotificationPolicy::default().should_notify(&snapshot, &prediction));
//! ```

pub use price_alert as alert;
pub use price_analysis as analysis;
pub use price_forecast as forecast;
pub use price_math as math;

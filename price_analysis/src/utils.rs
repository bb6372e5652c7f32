//! Helpers for loading and generating price samples
//!
//! The CSV layout is one sample per row, prices in cents per kWh, empty
//! cells for missing prices:
//!
//! ```text
//! timestamp,five_min_price,hourly_price,day_ahead_price
//! 2024-07-01T12:00:00Z,2.4,2.6,2.9
//! 2024-07-01T12:05:00Z,2.1,,2.9
//! ```

use crate::{AnalysisError, PriceSample, Result};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::path::Path;

/// Samples per hour at a five-minute cadence
const SAMPLES_PER_HOUR: usize = 12;

/// Load samples from a CSV file, sorted by timestamp
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<PriceSample>> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut samples = reader
        .deserialize::<PriceSample>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    if samples.is_empty() {
        return Err(AnalysisError::DataLoadError(
            "No samples found in file".to_string(),
        ));
    }

    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

/// Five-minute random walk of samples
///
/// Each step moves the price by at most `volatility` in either direction.
/// The hourly price of each sample is the mean of the last hour of
/// five-minute prices, mirroring how hourly averages are published.
#[derive(Debug, Clone)]
pub struct SampleWalk {
    rng: StdRng,
    volatility: f64,
    price: f64,
    recent: VecDeque<f64>,
    next_timestamp: DateTime<Utc>,
    started: bool,
}

impl SampleWalk {
    /// Walk seeded from system entropy
    pub fn new(start: DateTime<Utc>, base_price: f64, volatility: f64) -> Self {
        Self::with_rng(start, base_price, volatility, StdRng::from_entropy())
    }

    /// Reproducible walk
    pub fn seeded(start: DateTime<Utc>, base_price: f64, volatility: f64, seed: u64) -> Self {
        Self::with_rng(start, base_price, volatility, StdRng::seed_from_u64(seed))
    }

    fn with_rng(start: DateTime<Utc>, base_price: f64, volatility: f64, rng: StdRng) -> Self {
        Self {
            rng,
            volatility: volatility.abs(),
            price: base_price,
            recent: VecDeque::with_capacity(SAMPLES_PER_HOUR),
            next_timestamp: start,
            started: false,
        }
    }

    /// The next sample; the first one carries the base price
    pub fn next_sample(&mut self) -> PriceSample {
        if self.started {
            self.price += self.volatility * (self.rng.gen::<f64>() * 2.0 - 1.0);
        }
        self.started = true;

        if self.recent.len() == SAMPLES_PER_HOUR {
            self.recent.pop_front();
        }
        self.recent.push_back(self.price);
        let hourly = self.recent.iter().sum::<f64>() / self.recent.len() as f64;

        let timestamp = self.next_timestamp;
        self.next_timestamp = timestamp + Duration::minutes(5);

        PriceSample::new(timestamp)
            .with_five_min_price(self.price)
            .with_hourly_price(hourly)
    }
}

impl Iterator for SampleWalk {
    type Item = PriceSample;

    fn next(&mut self) -> Option<PriceSample> {
        Some(self.next_sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_walk_shape() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let samples: Vec<PriceSample> = SampleWalk::new(start, 2.5, 0.2).take(30).collect();

        assert_eq!(samples.len(), 30);
        assert_eq!(samples[0].five_min_price, Some(2.5));
        assert_eq!(samples[0].hourly_price, Some(2.5));
        assert_eq!(samples[29].timestamp, start + Duration::minutes(145));

        for pair in samples.windows(2) {
            let step = pair[1].five_min_price.unwrap() - pair[0].five_min_price.unwrap();
            assert!(step.abs() <= 0.2 + 1e-12);
        }
    }

    #[test]
    fn test_seeded_walks_repeat() {
        let start = Utc::now();
        let first: Vec<PriceSample> = SampleWalk::seeded(start, 3.0, 0.1, 11).take(20).collect();
        let second: Vec<PriceSample> = SampleWalk::seeded(start, 3.0, 0.1, 11).take(20).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_hourly_price_averages_last_hour() {
        let mut walk = SampleWalk::seeded(Utc::now(), 2.0, 0.3, 5);
        let samples: Vec<PriceSample> = walk.by_ref().take(24).collect();

        let last_hour: Vec<f64> = samples[12..]
            .iter()
            .map(|s| s.five_min_price.unwrap())
            .collect();
        let expected = last_hour.iter().sum::<f64>() / 12.0;
        assert!((samples[23].hourly_price.unwrap() - expected).abs() < 1e-9);
    }
}

//! Price collectors for running without a live price feed

use crate::collaborators::PriceCollector;
use crate::error::{AlertError, Result};
use async_trait::async_trait;
use chrono::Utc;
use price_analysis::{load_samples, PriceSample, SampleWalk};
use std::collections::VecDeque;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

/// Random walk around a base price, one five-minute sample per call
///
/// The first sample is stamped with the creation time; later samples
/// advance five minutes each.
#[derive(Debug)]
pub struct SyntheticCollector {
    walk: Mutex<SampleWalk>,
}

impl SyntheticCollector {
    pub fn new(base_price: f64, volatility: f64) -> Self {
        Self::from_walk(SampleWalk::new(Utc::now(), base_price, volatility))
    }

    /// Deterministic walk for reproducible runs
    pub fn seeded(base_price: f64, volatility: f64, seed: u64) -> Self {
        Self::from_walk(SampleWalk::seeded(Utc::now(), base_price, volatility, seed))
    }

    pub fn from_walk(walk: SampleWalk) -> Self {
        Self {
            walk: Mutex::new(walk),
        }
    }
}

#[async_trait]
impl PriceCollector for SyntheticCollector {
    async fn collect(&self) -> Result<PriceSample> {
        Ok(self.walk.lock().await.next_sample())
    }
}

/// Replays samples loaded from a CSV file in timestamp order
///
/// Fails with an upstream error once every sample has been served.
#[derive(Debug)]
pub struct ReplayCollector {
    samples: Mutex<VecDeque<PriceSample>>,
}

impl ReplayCollector {
    pub fn from_samples(samples: Vec<PriceSample>) -> Self {
        Self {
            samples: Mutex::new(samples.into()),
        }
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let samples = load_samples(path)?;
        debug!(count = samples.len(), "loaded replay samples");
        Ok(Self::from_samples(samples))
    }

    pub async fn remaining(&self) -> usize {
        self.samples.lock().await.len()
    }
}

#[async_trait]
impl PriceCollector for ReplayCollector {
    async fn collect(&self) -> Result<PriceSample> {
        self.samples
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| AlertError::Upstream("replay data exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_synthetic_walk_advances_five_minutes() {
        let collector = SyntheticCollector::seeded(2.5, 0.2, 7);

        let first = collector.collect().await.unwrap();
        let second = collector.collect().await.unwrap();

        assert_eq!(first.five_min_price, Some(2.5));
        assert_eq!(second.timestamp - first.timestamp, Duration::minutes(5));
        let step = (second.five_min_price.unwrap() - 2.5).abs();
        assert!(step <= 0.2);
    }

    #[tokio::test]
    async fn test_replay_exhausts() {
        let sample = PriceSample::new(Utc::now()).with_five_min_price(2.0);
        let collector = ReplayCollector::from_samples(vec![sample.clone()]);

        assert_eq!(collector.collect().await.unwrap(), sample);
        assert_eq!(collector.remaining().await, 0);
        assert!(matches!(
            collector.collect().await,
            Err(AlertError::Upstream(_))
        ));
    }
}

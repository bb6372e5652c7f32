//! Fixed-capacity rolling window of price samples

use crate::{AnalysisError, PriceSample, Result};
use std::collections::VecDeque;

/// 24 hours of samples at a five-minute cadence
pub const DEFAULT_WINDOW_CAPACITY: usize = 288;

/// FIFO buffer holding the most recent samples, oldest first
#[derive(Debug, Clone)]
pub struct SampleWindow {
    capacity: usize,
    samples: VecDeque<PriceSample>,
}

impl SampleWindow {
    /// Create a window holding at most `capacity` samples
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(AnalysisError::InvalidData(
                "Window capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        })
    }

    /// Append a sample, returning the evicted oldest sample if the window was full
    pub fn push(&mut self, sample: PriceSample) -> Option<PriceSample> {
        self.samples.push_back(sample);

        if self.samples.len() > self.capacity {
            self.samples.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently appended sample
    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    /// Iterate samples oldest first
    pub fn iter(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }

    /// Non-null five-minute prices, oldest first
    pub fn five_min_prices(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.five_min_price).collect()
    }

    /// Non-null hourly prices, oldest first
    pub fn hourly_prices(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.hourly_price).collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WINDOW_CAPACITY,
            samples: VecDeque::with_capacity(DEFAULT_WINDOW_CAPACITY),
        }
    }
}

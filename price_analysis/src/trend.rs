//! Trend analysis over the rolling sample window

use crate::window::SampleWindow;
use crate::{AnalysisSnapshot, PriceSample, Result, Trend};
use price_math::{mean, min_max};
use tracing::debug;

/// Owns the sample window and derives a snapshot after every update
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    window: SampleWindow,
}

impl TrendAnalyzer {
    /// Create an analyzer with a 24-hour window
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with a custom window capacity
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            window: SampleWindow::new(capacity)?,
        })
    }

    /// Append `sample` to the window and recompute the snapshot
    pub fn update(&mut self, sample: PriceSample) -> AnalysisSnapshot {
        let current_price = sample.current_price();

        if let Some(evicted) = self.window.push(sample) {
            debug!(timestamp = %evicted.timestamp, "evicted oldest sample from window");
        }

        self.compute(current_price)
    }

    /// Snapshot of the window as it stands, using the latest sample as current
    pub fn snapshot(&self) -> AnalysisSnapshot {
        let current_price = self
            .window
            .latest()
            .map(PriceSample::current_price)
            .unwrap_or(0.0);

        self.compute(current_price)
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    fn compute(&self, current_price: f64) -> AnalysisSnapshot {
        let five_min_prices = self.window.five_min_prices();

        // Both cadences sample the same market, so they share one pool
        let mut all_prices = five_min_prices.clone();
        all_prices.extend(self.window.hourly_prices());

        let (Some(average_price), Some((min_price, max_price))) =
            (mean(&all_prices), min_max(&all_prices))
        else {
            return AnalysisSnapshot::default();
        };

        let trend = match five_min_prices.as_slice() {
            [.., previous, newest] => Trend::compare(*newest, *previous),
            _ => Trend::Unknown,
        };

        AnalysisSnapshot {
            current_price,
            average_price,
            min_price,
            max_price,
            trend,
            volatility: max_price - min_price,
            data_points: all_prices.len(),
        }
    }
}

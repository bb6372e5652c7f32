//! Price pattern detection over a time-bounded history
//!
//! Complements the sample window with a view keyed on wall-clock age:
//! points older than the analysis window (24 hours by default) are dropped
//! relative to the newest point.

use crate::Trend;
use chrono::{DateTime, Duration, Utc};
use price_math::{mean, population_std_dev};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Minimum points before pattern detection runs
const MIN_PATTERN_POINTS: usize = 12;
/// Points inspected for cyclic peaks
const CYCLE_LOOKBACK: usize = 24;
const SPIKE_CONFIDENCE: u8 = 80;
const CYCLE_CONFIDENCE: u8 = 70;

/// A recognised price pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePattern {
    /// Latest price is more than two standard deviations from the mean
    PriceSpike,
    /// Local peaks recur roughly every half hour
    CyclicPattern,
}

/// Output of a pattern analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Population standard deviation of the retained prices
    pub volatility: f64,
    /// Direction over the last three points
    pub trend: Trend,
    pub patterns: Vec<PricePattern>,
    /// Confidence in the detected patterns, 0-100
    pub confidence: u8,
    pub data_points: usize,
}

/// Keeps timestamped prices and reports spikes, cycles and short trends
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    analysis_window: Duration,
    points: VecDeque<(DateTime<Utc>, f64)>,
}

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self::with_window(Duration::hours(24))
    }

    pub fn with_window(analysis_window: Duration) -> Self {
        Self {
            analysis_window,
            points: VecDeque::new(),
        }
    }

    /// Record a price and return the updated report
    pub fn update(&mut self, timestamp: DateTime<Utc>, price: f64) -> PatternReport {
        self.points.push_back((timestamp, price));
        self.prune(timestamp);
        self.report()
    }

    /// Report on the points currently retained
    pub fn report(&self) -> PatternReport {
        let prices: Vec<f64> = self.points.iter().map(|(_, p)| *p).collect();
        let (patterns, confidence) = detect_patterns(&prices);

        PatternReport {
            volatility: volatility(&prices),
            trend: short_trend(&prices),
            patterns,
            confidence,
            data_points: prices.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn prune(&mut self, newest: DateTime<Utc>) {
        let cutoff = newest - self.analysis_window;
        self.points.retain(|(ts, _)| *ts > cutoff);
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    population_std_dev(prices).unwrap_or(0.0)
}

fn short_trend(prices: &[f64]) -> Trend {
    if prices.len() < 2 {
        return Trend::Unknown;
    }

    let recent = &prices[prices.len().saturating_sub(3)..];
    if recent.windows(2).all(|w| w[0] < w[1]) {
        Trend::Rising
    } else if recent.windows(2).all(|w| w[0] > w[1]) {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

fn detect_patterns(prices: &[f64]) -> (Vec<PricePattern>, u8) {
    let mut patterns = Vec::new();
    let mut confidence = 0;

    if prices.len() < MIN_PATTERN_POINTS {
        return (patterns, confidence);
    }

    if let (Some(avg), Some(std_dev), Some(last)) =
        (mean(prices), population_std_dev(prices), prices.last())
    {
        if (last - avg).abs() > 2.0 * std_dev {
            patterns.push(PricePattern::PriceSpike);
            confidence = SPIKE_CONFIDENCE;
        }
    }

    if prices.len() >= CYCLE_LOOKBACK {
        let recent = &prices[prices.len() - CYCLE_LOOKBACK..];
        let peaks: Vec<usize> = (1..CYCLE_LOOKBACK - 1)
            .filter(|&i| recent[i] > recent[i - 1] && recent[i] > recent[i + 1])
            .collect();

        if let [.., previous, last] = peaks.as_slice() {
            if (5..=7).contains(&(last - previous)) {
                patterns.push(PricePattern::CyclicPattern);
                confidence = confidence.max(CYCLE_CONFIDENCE);
            }
        }
    }

    (patterns, confidence)
}

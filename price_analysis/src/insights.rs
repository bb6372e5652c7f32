//! Usage insights derived from hourly price history

use crate::HistoricalPrice;
use chrono::Timelike;
use price_math::{mean, population_std_dev, round_to};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of daily usage assumed to be movable to the cheapest hour
const SHIFTABLE_USAGE: f64 = 0.2;
/// Hours compared on each side of the peak/off-peak split
const PEAK_HOURS: usize = 3;

/// Price statistics for one hour of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyStats {
    pub average: f64,
    pub std_dev: f64,
    pub samples: usize,
}

/// Kind of savings recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    ShiftUsage,
    OptimalUsage,
}

/// An actionable savings recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsInsight {
    pub kind: InsightKind,
    /// Estimated monthly savings in dollars
    pub savings: f64,
    pub description: String,
    /// 0-100
    pub impact_score: u32,
}

/// Group history by hour of day (UTC) and summarise each hour
pub fn hourly_stats(history: &[HistoricalPrice]) -> BTreeMap<u32, HourlyStats> {
    let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for point in history {
        by_hour
            .entry(point.timestamp.hour())
            .or_default()
            .push(point.hourly_price);
    }

    by_hour
        .into_iter()
        .filter_map(|(hour, prices)| {
            let average = mean(&prices)?;
            let std_dev = population_std_dev(&prices)?;
            Some((
                hour,
                HourlyStats {
                    average: round_to(average, 2),
                    std_dev: round_to(std_dev, 2),
                    samples: prices.len(),
                },
            ))
        })
        .collect()
}

/// Weekly savings from moving a fifth of usage to the cheapest hour
pub fn weekly_savings_potential(history: &[HistoricalPrice]) -> f64 {
    let averages: Vec<f64> = hourly_stats(history).values().map(|s| s.average).collect();

    let Some(overall) = mean(&averages) else {
        return 0.0;
    };
    let best = averages.iter().copied().fold(f64::INFINITY, f64::min);

    round_to((overall - best) * 24.0 * 7.0 * SHIFTABLE_USAGE, 2)
}

/// Peak-shifting and off-peak scheduling recommendations
pub fn savings_insights(history: &[HistoricalPrice]) -> Vec<SavingsInsight> {
    let stats = hourly_stats(history);
    if stats.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<(u32, f64)> = stats.iter().map(|(h, s)| (*h, s.average)).collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let off_peak = &sorted[..PEAK_HOURS.min(sorted.len())];
    let peak = &sorted[sorted.len().saturating_sub(PEAK_HOURS)..];

    let average_of = |hours: &[(u32, f64)]| {
        let prices: Vec<f64> = hours.iter().map(|(_, p)| *p).collect();
        mean(&prices).unwrap_or(0.0)
    };
    let format_hours = |hours: &[(u32, f64)]| {
        hours
            .iter()
            .map(|(h, _)| format!("{}:00", h))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let monthly_savings = round_to((average_of(peak) - average_of(off_peak)) * 30.0, 2);
    let impact = ((monthly_savings / 10.0) * 100.0).clamp(0.0, 100.0) as u32;

    vec![
        SavingsInsight {
            kind: InsightKind::ShiftUsage,
            savings: monthly_savings,
            description: format!(
                "Shift energy-intensive activities away from peak hours ({}) to save up to ${:.2} monthly",
                format_hours(peak),
                monthly_savings
            ),
            impact_score: impact,
        },
        SavingsInsight {
            kind: InsightKind::OptimalUsage,
            savings: monthly_savings * 0.8,
            description: format!(
                "Schedule high-energy tasks during off-peak hours ({}) for optimal savings",
                format_hours(off_peak)
            ),
            impact_score: 85,
        },
    ]
}

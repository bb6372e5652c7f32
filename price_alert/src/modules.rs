//! Feature modules attached to notifications
//!
//! The set of modules is closed. Each contributes a JSON section to a
//! notification while enabled.

use crate::error::{AlertError, Result};
use price_analysis::{
    savings_insights, weekly_savings_potential, AnalysisSnapshot, HistoricalPrice, PatternReport,
};
use price_forecast::PredictionRecord;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kinds of feature module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    PriceMonitor,
    PatternAnalysis,
    MlPrediction,
    Dashboard,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::PriceMonitor,
        ModuleKind::PatternAnalysis,
        ModuleKind::MlPrediction,
        ModuleKind::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::PriceMonitor => "price_monitor",
            ModuleKind::PatternAnalysis => "pattern_analysis",
            ModuleKind::MlPrediction => "ml_prediction",
            ModuleKind::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        ModuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| AlertError::Config(format!("unknown module '{}'", s)))
    }
}

/// What a cycle produced, as seen by the modules
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    pub snapshot: &'a AnalysisSnapshot,
    pub prediction: &'a PredictionRecord,
    pub patterns: &'a PatternReport,
    /// Recency-weighted feedback accuracy, 0-1
    pub feedback_accuracy: f64,
    /// Stored hourly history the prediction was made from, newest first
    pub history: &'a [HistoricalPrice],
}

/// A feature module
#[derive(Debug, Clone, PartialEq)]
pub enum Module {
    /// Compares the current price against a user threshold
    PriceMonitor { min_rate: f64 },
    PatternAnalysis,
    MlPrediction,
    Dashboard,
}

impl Module {
    pub fn kind(&self) -> ModuleKind {
        match self {
            Module::PriceMonitor { .. } => ModuleKind::PriceMonitor,
            Module::PatternAnalysis => ModuleKind::PatternAnalysis,
            Module::MlPrediction => ModuleKind::MlPrediction,
            Module::Dashboard => ModuleKind::Dashboard,
        }
    }

    /// This module's notification section, `None` when it has nothing to say
    pub fn notification_data(&self, ctx: &ModuleContext<'_>) -> Option<Value> {
        match self {
            Module::PriceMonitor { min_rate } => Some(json!({
                "current_price": ctx.snapshot.current_price,
                "min_rate": min_rate,
                "below_min_rate": ctx.snapshot.current_price <= *min_rate,
            })),
            Module::PatternAnalysis => (ctx.patterns.data_points > 0).then(|| {
                json!({
                    "current_trend": ctx.patterns.trend,
                    "volatility": ctx.patterns.volatility,
                    "patterns": ctx.patterns.patterns,
                    "confidence": ctx.patterns.confidence,
                })
            }),
            Module::MlPrediction => ctx.prediction.short_term_prediction.map(|predicted| {
                json!({
                    "predicted_price": predicted,
                    "confidence": ctx.prediction.confidence,
                    "trend": ctx.prediction.trend,
                    "next_hour_range": ctx.prediction.next_hour_range,
                })
            }),
            Module::Dashboard => Some(json!({
                "snapshot": ctx.snapshot,
                "accuracy_rate": ctx.feedback_accuracy,
                "weekly_savings_potential": weekly_savings_potential(ctx.history),
                "insights": savings_insights(ctx.history),
            })),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    module: Module,
    enabled: bool,
}

/// One module per kind, each enabled or disabled
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRegistry {
    entries: Vec<Entry>,
}

impl ModuleRegistry {
    /// Registry with every module enabled
    pub fn new(min_rate: f64) -> Self {
        Self::with_enabled(min_rate, &ModuleKind::ALL)
    }

    /// Registry with only `enabled` switched on
    pub fn with_enabled(min_rate: f64, enabled: &[ModuleKind]) -> Self {
        let entries = ModuleKind::ALL
            .into_iter()
            .map(|kind| Entry {
                module: match kind {
                    ModuleKind::PriceMonitor => Module::PriceMonitor { min_rate },
                    ModuleKind::PatternAnalysis => Module::PatternAnalysis,
                    ModuleKind::MlPrediction => Module::MlPrediction,
                    ModuleKind::Dashboard => Module::Dashboard,
                },
                enabled: enabled.contains(&kind),
            })
            .collect();

        Self { entries }
    }

    pub fn enable(&mut self, kind: ModuleKind) {
        self.set_enabled(kind, true);
    }

    pub fn disable(&mut self, kind: ModuleKind) {
        self.set_enabled(kind, false);
    }

    fn set_enabled(&mut self, kind: ModuleKind, enabled: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.module.kind() == kind) {
            entry.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, kind: ModuleKind) -> bool {
        self.entries
            .iter()
            .any(|e| e.module.kind() == kind && e.enabled)
    }

    /// Every module kind with its state
    pub fn list(&self) -> Vec<(ModuleKind, bool)> {
        self.entries
            .iter()
            .map(|e| (e.module.kind(), e.enabled))
            .collect()
    }

    /// Notification sections of the enabled modules, keyed by module name
    pub fn notification_data(&self, ctx: &ModuleContext<'_>) -> Value {
        let sections: Map<String, Value> = self
            .entries
            .iter()
            .filter(|e| e.enabled)
            .filter_map(|e| {
                e.module
                    .notification_data(ctx)
                    .map(|data| (e.module.kind().to_string(), data))
            })
            .collect();

        Value::Object(sections)
    }
}

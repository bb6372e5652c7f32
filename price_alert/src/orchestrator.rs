//! The monitoring pipeline
//!
//! One cycle walks `Collecting -> Analyzing -> Predicting -> Deciding ->
//! Notifying` and always ends with a [`CycleReport`]. Collecting and
//! Analyzing failures abort the cycle; a failed prediction is replaced by an
//! empty one; a failed notification is reported without failing the cycle.

use crate::collaborators::{Notification, Notifier, PersistenceProvider, PriceCollector};
use crate::config::MonitorConfig;
use crate::error::{AlertError, Result};
use crate::modules::{ModuleContext, ModuleRegistry};
use crate::policy::{AlertReasons, NotificationPolicy};
use chrono::{DateTime, Utc};
use price_analysis::{
    AnalysisSnapshot, HistoricalPrice, PatternAnalyzer, PatternReport, PriceSample, TrendAnalyzer,
};
use price_forecast::{
    recency_weighted_accuracy, FeedbackEvent, FeedbackRating, FeedbackRegistry, ForecastBackend,
    PredictionEngine, PredictionRecord, RecordId,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Pipeline stage a cycle is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    Idle,
    Collecting,
    Analyzing,
    Predicting,
    Deciding,
    Notifying,
    Error,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleStage::Idle => "idle",
            CycleStage::Collecting => "collecting",
            CycleStage::Analyzing => "analyzing",
            CycleStage::Predicting => "predicting",
            CycleStage::Deciding => "deciding",
            CycleStage::Notifying => "notifying",
            CycleStage::Error => "error",
        };
        f.write_str(name)
    }
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleStatus {
    Completed,
    /// The cycle aborted while in `stage`
    Error { stage: CycleStage, message: String },
}

/// Result of one pipeline cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    #[serde(flatten)]
    pub status: CycleStatus,
    pub started_at: DateTime<Utc>,
    pub snapshot: Option<AnalysisSnapshot>,
    pub prediction: Option<PredictionRecord>,
    pub reasons: AlertReasons,
    pub notified: bool,
    /// Why the prediction was replaced by an empty one
    pub prediction_error: Option<String>,
    /// Why a due notification was not delivered
    pub notify_error: Option<String>,
}

impl CycleReport {
    fn failed(started_at: DateTime<Utc>, stage: CycleStage, err: &AlertError) -> Self {
        Self {
            status: CycleStatus::Error {
                stage,
                message: err.to_string(),
            },
            started_at,
            snapshot: None,
            prediction: None,
            reasons: AlertReasons::default(),
            notified: false,
            prediction_error: None,
            notify_error: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == CycleStatus::Completed
    }

    /// Final stage: `Idle` after a completed cycle, `Error` otherwise
    pub fn final_stage(&self) -> CycleStage {
        match self.status {
            CycleStatus::Completed => CycleStage::Idle,
            CycleStatus::Error { .. } => CycleStage::Error,
        }
    }
}

struct CycleOutcome {
    snapshot: AnalysisSnapshot,
    prediction: PredictionRecord,
    reasons: AlertReasons,
    notified: bool,
    prediction_error: Option<String>,
    notify_error: Option<String>,
}

struct PredictionOutcome {
    record: PredictionRecord,
    feedback_accuracy: f64,
    history: Vec<HistoricalPrice>,
}

#[derive(Debug)]
struct AnalysisState {
    trend: TrendAnalyzer,
    patterns: PatternAnalyzer,
}

/// Runs monitoring cycles against the configured collaborators
///
/// Share it behind an `Arc`; cycles may run concurrently and serialize only
/// on the sample window.
pub struct Orchestrator {
    collector: Arc<dyn PriceCollector>,
    persistence: Arc<dyn PersistenceProvider>,
    notifier: Arc<dyn Notifier>,
    backend: Arc<dyn ForecastBackend>,
    state: Mutex<AnalysisState>,
    policy: NotificationPolicy,
    feedback: FeedbackRegistry,
    modules: ModuleRegistry,
    history_hours: i64,
    cycle_timeout: Duration,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .field("modules", &self.modules)
            .field("history_hours", &self.history_hours)
            .field("cycle_timeout", &self.cycle_timeout)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(
        config: &MonitorConfig,
        collector: Arc<dyn PriceCollector>,
        persistence: Arc<dyn PersistenceProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            collector,
            persistence,
            notifier,
            backend: Arc::new(PredictionEngine::with_config(config.prediction.clone())?),
            state: Mutex::new(AnalysisState {
                trend: TrendAnalyzer::with_capacity(config.window_capacity)?,
                patterns: PatternAnalyzer::new(),
            }),
            policy: NotificationPolicy::new(config.thresholds),
            feedback: FeedbackRegistry::with_window_hours(config.feedback_window_hours)?,
            modules: ModuleRegistry::with_enabled(config.min_rate, &config.modules),
            history_hours: config.history_hours,
            cycle_timeout: config.cycle_timeout(),
        })
    }

    /// Replace the default prediction engine
    pub fn with_backend(mut self, backend: Arc<dyn ForecastBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Add a sample to the window and return the new snapshot
    ///
    /// Samples without any price are rejected and leave the window unchanged.
    pub async fn push(&self, sample: PriceSample) -> Result<AnalysisSnapshot> {
        self.analyze(sample).await.map(|(snapshot, _)| snapshot)
    }

    /// Snapshot of the current window
    pub async fn snapshot(&self) -> AnalysisSnapshot {
        self.state.lock().await.trend.snapshot()
    }

    pub async fn pattern_report(&self) -> PatternReport {
        self.state.lock().await.patterns.report()
    }

    /// Rate a stored prediction, replacing any earlier rating
    pub async fn submit_feedback(&self, id: RecordId, accuracy: f64) -> Result<()> {
        FeedbackRegistry::validate_accuracy(accuracy)
            .map_err(|err| AlertError::Validation(err.to_string()))?;

        let session = self.persistence.open_session().await?;
        self.feedback.record(session.as_ref(), id, accuracy).await?;
        Ok(())
    }

    pub async fn submit_rating(&self, id: RecordId, rating: FeedbackRating) -> Result<()> {
        self.submit_feedback(id, rating.accuracy()).await
    }

    /// Rated predictions inside the feedback window, newest first
    pub async fn recent_feedback(&self) -> Result<Vec<FeedbackEvent>> {
        let session = self.persistence.open_session().await?;
        Ok(self.feedback.recent(session.as_ref()).await?)
    }

    /// Run one cycle under the configured deadline
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        let mut stage = CycleStage::Idle;

        let result = timeout(self.cycle_timeout, self.execute(&mut stage)).await;

        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                error!(%stage, error = %err, "cycle failed");
                return CycleReport::failed(started_at, stage, &err);
            }
            Err(_) => {
                let err = AlertError::Timeout(self.cycle_timeout.as_millis() as u64);
                error!(%stage, error = %err, "cycle timed out");
                return CycleReport::failed(started_at, stage, &err);
            }
        };

        info!(
            current_price = outcome.snapshot.current_price,
            prediction = ?outcome.prediction.short_term_prediction,
            notified = outcome.notified,
            "cycle completed"
        );

        CycleReport {
            status: CycleStatus::Completed,
            started_at,
            snapshot: Some(outcome.snapshot),
            prediction: Some(outcome.prediction),
            reasons: outcome.reasons,
            notified: outcome.notified,
            prediction_error: outcome.prediction_error,
            notify_error: outcome.notify_error,
        }
    }

    async fn execute(&self, stage: &mut CycleStage) -> Result<CycleOutcome> {
        *stage = CycleStage::Collecting;
        let sample = self.collector.collect().await?;

        *stage = CycleStage::Analyzing;
        let (snapshot, patterns) = self.analyze(sample.clone()).await?;
        debug!(?snapshot, "window analyzed");

        *stage = CycleStage::Predicting;
        let (prediction, feedback_accuracy, history, prediction_error) =
            match self.predict(&sample).await {
                Ok(outcome) => (outcome.record, outcome.feedback_accuracy, outcome.history, None),
                Err(err) => {
                    warn!(error = %err, "prediction failed, continuing without one");
                    (PredictionRecord::empty(), 0.0, Vec::new(), Some(err.to_string()))
                }
            };

        *stage = CycleStage::Deciding;
        let reasons = self.policy.evaluate(&snapshot, &prediction);

        let mut notified = false;
        let mut notify_error = None;
        if reasons.any() {
            *stage = CycleStage::Notifying;
            let ctx = ModuleContext {
                snapshot: &snapshot,
                prediction: &prediction,
                patterns: &patterns,
                feedback_accuracy,
                history: &history,
            };
            let notification = Notification {
                created_at: Utc::now(),
                snapshot: snapshot.clone(),
                prediction: prediction.clone(),
                reasons,
                modules: self.modules.notification_data(&ctx),
            };

            match self.notifier.notify(&notification).await {
                Ok(()) => notified = true,
                Err(err) => {
                    warn!(error = %err, reasons = ?reasons.labels(), "notification failed");
                    notify_error = Some(err.to_string());
                }
            }
        }

        *stage = CycleStage::Idle;
        Ok(CycleOutcome {
            snapshot,
            prediction,
            reasons,
            notified,
            prediction_error,
            notify_error,
        })
    }

    async fn analyze(&self, sample: PriceSample) -> Result<(AnalysisSnapshot, PatternReport)> {
        if !sample.has_price() {
            return Err(AlertError::DataUnavailable(format!(
                "sample at {} carries no price",
                sample.timestamp
            )));
        }

        let timestamp = sample.timestamp;
        let current_price = sample.current_price();

        // no await between the two updates
        let mut state = self.state.lock().await;
        let snapshot = state.trend.update(sample);
        let patterns = state.patterns.update(timestamp, current_price);

        Ok((snapshot, patterns))
    }

    async fn predict(&self, sample: &PriceSample) -> Result<PredictionOutcome> {
        let session = self.persistence.open_session().await?;

        if let Some(point) = HistoricalPrice::from_sample(sample) {
            if let Err(err) = session.record_price(&point).await {
                warn!(error = %err, "failed to record price");
            }
        }

        let history = session.get_recent_history(self.history_hours).await?;
        let prices: Vec<f64> = history.iter().map(|point| point.hourly_price).collect();
        let feedback = self.feedback.recent(session.as_ref()).await?;

        let mut record = self.backend.predict(&prices, &feedback)?;
        let feedback_accuracy = recency_weighted_accuracy(&feedback, Utc::now());

        if !record.is_empty() {
            match session.store_prediction(&record).await {
                Ok(id) => record = record.with_id(id),
                Err(err) => warn!(error = %err, "failed to store prediction"),
            }
        }

        debug!(
            backend = self.backend.name(),
            history = prices.len(),
            feedback = feedback.len(),
            confidence = record.confidence,
            "prediction made"
        );

        Ok(PredictionOutcome {
            record,
            feedback_accuracy,
            history,
        })
    }
}

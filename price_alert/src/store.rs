//! In-memory persistence
//!
//! Keeps hourly price rows and stored predictions in process memory. The
//! history window is measured back from the newest price row, so replayed
//! data with old timestamps is served the same way as live data.
//!
//! Rows are kept for a bounded [`Retention`]: price rows older than the
//! newest row minus the price window are dropped on every insert, and
//! predictions older than the prediction window are dropped whenever a new
//! prediction is stored.

use crate::collaborators::{PersistenceProvider, StoreSession};
use crate::error::{AlertError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use price_analysis::HistoricalPrice;
use price_forecast::{FeedbackEvent, FeedbackStore, PredictionRecord, RecordId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Default retention for both price rows and predictions, in hours
pub const DEFAULT_RETENTION_HOURS: i64 = 72;

/// How long the store keeps its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    /// Measured back from the newest price row
    pub prices: Duration,
    /// Measured back from the time a prediction is stored
    pub predictions: Duration,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            prices: Duration::hours(DEFAULT_RETENTION_HOURS),
            predictions: Duration::hours(DEFAULT_RETENTION_HOURS),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredPrediction {
    created_at: DateTime<Utc>,
    record: PredictionRecord,
    accuracy: Option<f64>,
}

#[derive(Debug, Default)]
struct StoreState {
    prices: Vec<HistoricalPrice>,
    predictions: BTreeMap<RecordId, StoredPrediction>,
    next_id: u64,
}

/// Shared in-memory store
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    open_sessions: Arc<AtomicUsize>,
    retention: Retention,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Retention) -> Self {
        Self {
            retention,
            ..Self::default()
        }
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Sessions currently held by callers
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub async fn price_count(&self) -> usize {
        self.state.lock().await.prices.len()
    }

    pub async fn prediction_count(&self) -> usize {
        self.state.lock().await.predictions.len()
    }

    /// A stored prediction with its accuracy, if any
    pub async fn prediction(&self, id: RecordId) -> Option<(PredictionRecord, Option<f64>)> {
        self.state
            .lock()
            .await
            .predictions
            .get(&id)
            .map(|stored| (stored.record.clone(), stored.accuracy))
    }

    /// Newest prediction id, if any prediction was stored
    pub async fn latest_prediction_id(&self) -> Option<RecordId> {
        self.state
            .lock()
            .await
            .predictions
            .keys()
            .next_back()
            .copied()
    }
}

#[async_trait]
impl PersistenceProvider for InMemoryStore {
    async fn open_session(&self) -> Result<Box<dyn StoreSession>> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemorySession {
            state: Arc::clone(&self.state),
            open_sessions: Arc::clone(&self.open_sessions),
            retention: self.retention,
        }))
    }
}

/// Session handle over an [`InMemoryStore`]
#[derive(Debug)]
pub struct InMemorySession {
    state: Arc<Mutex<StoreState>>,
    open_sessions: Arc<AtomicUsize>,
    retention: Retention,
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl FeedbackStore for InMemorySession {
    async fn update_accuracy(&self, id: RecordId, accuracy: f64) -> price_forecast::Result<bool> {
        let mut state = self.state.lock().await;
        match state.predictions.get_mut(&id) {
            Some(stored) => {
                stored.accuracy = Some(accuracy);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn recent_with_accuracy(&self, window: Duration) -> price_forecast::Result<Vec<FeedbackEvent>> {
        let cutoff = Utc::now().checked_sub_signed(window);
        let state = self.state.lock().await;

        Ok(state
            .predictions
            .iter()
            .filter(|(_, stored)| cutoff.map_or(true, |c| stored.created_at >= c))
            .filter_map(|(id, stored)| {
                stored
                    .accuracy
                    .map(|accuracy| FeedbackEvent::new(*id, accuracy, stored.created_at))
            })
            .collect())
    }
}

#[async_trait]
impl StoreSession for InMemorySession {
    async fn record_price(&self, point: &HistoricalPrice) -> Result<()> {
        let mut state = self.state.lock().await;
        // keep rows ordered by timestamp
        let position = state
            .prices
            .partition_point(|row| row.timestamp <= point.timestamp);
        state.prices.insert(position, point.clone());

        let newest = state.prices.last().map(|row| row.timestamp);
        if let Some(cutoff) = newest.and_then(|ts| ts.checked_sub_signed(self.retention.prices)) {
            let expired = state.prices.partition_point(|row| row.timestamp < cutoff);
            if expired > 0 {
                state.prices.drain(..expired);
                debug!(expired, retained = state.prices.len(), "pruned price rows");
            }
        }
        Ok(())
    }

    async fn get_recent_history(&self, hours: i64) -> Result<Vec<HistoricalPrice>> {
        let state = self.state.lock().await;
        let Some(newest) = state.prices.last() else {
            return Ok(Vec::new());
        };
        let window = Duration::try_hours(hours).ok_or_else(|| {
            AlertError::Validation(format!("history window of {} hours is out of range", hours))
        })?;
        let cutoff = newest.timestamp.checked_sub_signed(window);

        let history: Vec<HistoricalPrice> = state
            .prices
            .iter()
            .rev()
            .take_while(|row| cutoff.map_or(true, |c| row.timestamp >= c))
            .cloned()
            .collect();

        debug!(hours, rows = history.len(), "loaded price history");
        Ok(history)
    }

    async fn store_prediction(&self, record: &PredictionRecord) -> Result<RecordId> {
        let now = Utc::now();
        let mut state = self.state.lock().await;

        if let Some(cutoff) = now.checked_sub_signed(self.retention.predictions) {
            let before = state.predictions.len();
            state.predictions.retain(|_, stored| stored.created_at >= cutoff);
            let expired = before - state.predictions.len();
            if expired > 0 {
                debug!(expired, "pruned predictions");
            }
        }

        state.next_id += 1;
        let id = RecordId(state.next_id);

        state.predictions.insert(
            id,
            StoredPrediction {
                created_at: now,
                record: record.clone().with_id(id),
                accuracy: None,
            },
        );
        Ok(id)
    }
}

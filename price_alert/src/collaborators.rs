//! Boundaries to the outside world
//!
//! The pipeline reads prices from a [`PriceCollector`], persists history
//! and predictions through a [`StoreSession`] opened per use from a
//! [`PersistenceProvider`], and delivers alerts through a [`Notifier`].

use crate::error::Result;
use crate::policy::AlertReasons;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use price_analysis::{AnalysisSnapshot, HistoricalPrice, PriceSample};
use price_forecast::{FeedbackStore, PredictionRecord, RecordId};
use serde::Serialize;

/// Source of the latest price sample
#[async_trait]
pub trait PriceCollector: Send + Sync {
    async fn collect(&self) -> Result<PriceSample>;
}

/// Opens persistence sessions
///
/// A session is released when dropped, so every exit path of a cycle gives
/// it back.
#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn StoreSession>>;
}

/// One unit of access to the price and prediction store
#[async_trait]
pub trait StoreSession: FeedbackStore {
    /// Append an hourly price row
    async fn record_price(&self, point: &HistoricalPrice) -> Result<()>;

    /// Price rows from the last `hours`, newest first
    async fn get_recent_history(&self, hours: i64) -> Result<Vec<HistoricalPrice>>;

    /// Persist a prediction and return its id
    async fn store_prediction(&self, record: &PredictionRecord) -> Result<RecordId>;
}

/// Payload handed to a [`Notifier`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub created_at: DateTime<Utc>,
    pub snapshot: AnalysisSnapshot,
    pub prediction: PredictionRecord,
    pub reasons: AlertReasons,
    /// Per-module details keyed by module name
    pub modules: serde_json::Value,
}

/// Delivers alert notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

//! Notifier that writes alerts to the log

use crate::collaborators::{Notification, Notifier};
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Emits every notification as an `info` event
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let modules = serde_json::to_string(&notification.modules)?;

        info!(
            current_price = notification.snapshot.current_price,
            average_price = notification.snapshot.average_price,
            trend = %notification.snapshot.trend,
            prediction = ?notification.prediction.short_term_prediction,
            confidence = notification.prediction.confidence,
            reasons = ?notification.reasons.labels(),
            %modules,
            "price alert"
        );
        Ok(())
    }
}

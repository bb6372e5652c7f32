use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use price_alert::{
    AlertError, CycleStage, CycleStatus, InMemoryStore, MonitorConfig, Notification, Notifier,
    Orchestrator, PersistenceProvider, PriceCollector, ReplayCollector, StoreSession,
    SyntheticCollector,
};
use price_analysis::{PriceSample, Trend};
use approx::assert_relative_eq;
use price_forecast::{
    FeedbackEvent, FeedbackRating, ForecastBackend, ForecastError, PredictionRecord, RecordId,
};
use std::sync::Arc;
use tokio::sync::Mutex;

fn sample(minute: i64, five_min: f64, hourly: Option<f64>) -> PriceSample {
    let ts = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
    let sample = PriceSample::new(ts).with_five_min_price(five_min);
    match hourly {
        Some(price) => sample.with_hourly_price(price),
        None => sample,
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> price_alert::Result<()> {
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> price_alert::Result<()> {
        Err(AlertError::Notification("chat service unreachable".to_string()))
    }
}

struct FailingCollector;

#[async_trait]
impl PriceCollector for FailingCollector {
    async fn collect(&self) -> price_alert::Result<PriceSample> {
        Err(AlertError::Upstream("price feed returned 503".to_string()))
    }
}

struct SlowCollector;

#[async_trait]
impl PriceCollector for SlowCollector {
    async fn collect(&self) -> price_alert::Result<PriceSample> {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        Ok(sample(0, 2.0, None))
    }
}

struct OfflineStore;

#[async_trait]
impl PersistenceProvider for OfflineStore {
    async fn open_session(&self) -> price_alert::Result<Box<dyn StoreSession>> {
        Err(AlertError::Upstream("database offline".to_string()))
    }
}

#[derive(Debug)]
struct FixedBackend(f64, f64);

impl ForecastBackend for FixedBackend {
    fn predict(
        &self,
        _history: &[f64],
        _feedback: &[FeedbackEvent],
    ) -> price_forecast::Result<PredictionRecord> {
        Ok(PredictionRecord {
            short_term_prediction: Some(self.0),
            confidence: self.1,
            trend: Trend::Rising,
            ..PredictionRecord::empty()
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn orchestrator(
    collector: Arc<dyn PriceCollector>,
    store: Arc<dyn PersistenceProvider>,
    notifier: Arc<dyn Notifier>,
) -> Orchestrator {
    Orchestrator::new(&MonitorConfig::default(), collector, store, notifier).unwrap()
}

#[tokio::test]
async fn test_six_flat_samples_do_not_alert() {
    let samples = (0..6).map(|i| sample(i * 5, 2.0, Some(2.0))).collect();
    let store = InMemoryStore::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(samples)),
        Arc::new(store.clone()),
        notifier.clone(),
    );

    for _ in 0..6 {
        let report = orch.run_cycle().await;
        assert!(report.is_completed());
        assert!(!report.notified);
    }

    let snapshot = orch.snapshot().await;
    assert_eq!(snapshot.current_price, 2.0);
    assert_eq!(snapshot.average_price, 2.0);
    assert_eq!(snapshot.min_price, 2.0);
    assert_eq!(snapshot.max_price, 2.0);
    assert_eq!(snapshot.trend, Trend::Stable);
    assert!(notifier.sent.lock().await.is_empty());
    assert_eq!(store.price_count().await, 6);
    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn test_collect_failure_is_fatal() {
    let orch = orchestrator(
        Arc::new(FailingCollector),
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingNotifier::default()),
    );

    let report = orch.run_cycle().await;

    assert!(!report.is_completed());
    assert_eq!(report.final_stage(), CycleStage::Error);
    assert!(matches!(
        report.status,
        CycleStatus::Error { stage: CycleStage::Collecting, .. }
    ));
    assert!(report.snapshot.is_none());
    assert_eq!(orch.snapshot().await.data_points, 0);
}

#[tokio::test]
async fn test_sample_without_price_leaves_window_untouched() {
    let empty = PriceSample::new(Utc::now());
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(vec![empty])),
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingNotifier::default()),
    );
    orch.push(sample(0, 2.0, None)).await.unwrap();

    let report = orch.run_cycle().await;

    assert!(matches!(
        report.status,
        CycleStatus::Error { stage: CycleStage::Analyzing, .. }
    ));
    assert_eq!(orch.snapshot().await.data_points, 1);
    assert!(matches!(
        orch.push(PriceSample::new(Utc::now())).await,
        Err(AlertError::DataUnavailable(_))
    ));
}

#[tokio::test]
async fn test_prediction_failure_is_absorbed_and_drop_still_alerts() {
    let notifier = Arc::new(RecordingNotifier::default());
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(vec![sample(10, 1.4, None)])),
        Arc::new(OfflineStore),
        notifier.clone(),
    );
    orch.push(sample(0, 2.3, None)).await.unwrap();
    orch.push(sample(5, 2.3, None)).await.unwrap();

    let report = orch.run_cycle().await;

    assert!(report.is_completed());
    assert!(report.prediction_error.is_some());
    assert_eq!(report.prediction, Some(PredictionRecord::empty()));
    assert!(report.reasons.price_drop);
    assert!(report.notified);

    let sent = notifier.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].modules.get("price_monitor").is_some());
    assert!(sent[0].modules.get("ml_prediction").is_none());
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_cycle() {
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(vec![sample(10, 1.4, None)])),
        Arc::new(InMemoryStore::new()),
        Arc::new(FailingNotifier),
    );
    orch.push(sample(0, 2.3, None)).await.unwrap();
    orch.push(sample(5, 2.3, None)).await.unwrap();

    let report = orch.run_cycle().await;

    assert!(report.is_completed());
    assert!(report.reasons.any());
    assert!(!report.notified);
    assert!(report
        .notify_error
        .as_deref()
        .is_some_and(|e| e.contains("unreachable")));
}

#[tokio::test]
async fn test_custom_backend_predicted_spike_alerts() {
    let notifier = Arc::new(RecordingNotifier::default());
    let store = InMemoryStore::new();
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(vec![sample(0, 2.0, None)])),
        Arc::new(store.clone()),
        notifier.clone(),
    )
    .with_backend(Arc::new(FixedBackend(3.2, 85.0)));

    let report = orch.run_cycle().await;

    assert!(report.reasons.predicted_spike);
    assert!(report.notified);
    let prediction = report.prediction.unwrap();
    assert_eq!(prediction.short_term_prediction, Some(3.2));
    assert_eq!(prediction.id, store.latest_prediction_id().await);
    assert!(prediction.id.is_some());

    let sent = notifier.sent.lock().await;
    assert_eq!(sent[0].modules["ml_prediction"]["predicted_price"], 3.2);
    // the stored row feeds the dashboard's savings insights
    let insights = sent[0].modules["dashboard"]["insights"].as_array().unwrap();
    assert_eq!(insights.len(), 2);
    assert_eq!(insights[1]["kind"], "optimal_usage");
}

#[tokio::test]
async fn test_feedback_round_trip() {
    let samples = (0..3).map(|i| sample(i * 5, 2.0 + i as f64 * 0.1, None)).collect();
    let store = InMemoryStore::new();
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(samples)),
        Arc::new(store.clone()),
        Arc::new(RecordingNotifier::default()),
    );

    let mut last_id = None;
    for _ in 0..3 {
        let report = orch.run_cycle().await;
        last_id = report.prediction.and_then(|p| p.id).or(last_id);
    }
    let id = last_id.unwrap();

    orch.submit_feedback(id, 0.9).await.unwrap();

    let feedback = orch.recent_feedback().await.unwrap();
    let event = feedback.iter().find(|e| e.record_id == id).unwrap();
    assert_eq!(event.accuracy, 0.9);
    assert_eq!(store.prediction(id).await.unwrap().1, Some(0.9));
    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn test_feedback_raises_next_prediction_confidence() {
    // flat prices keep the volatility penalty at zero; 21 rows saturate the
    // data-point term so only the feedback accuracy moves confidence
    let samples = (0..22).map(|i| sample(i * 5, 2.0, Some(2.0))).collect();
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(samples)),
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingNotifier::default()),
    );

    let mut before = None;
    for _ in 0..21 {
        let report = orch.run_cycle().await;
        assert!(report.is_completed());
        before = report.prediction;
    }
    let before = before.unwrap();
    assert_eq!(before.feedback_quality, None);
    assert_relative_eq!(before.confidence, 84.0);

    orch.submit_feedback(before.id.unwrap(), 0.9).await.unwrap();

    let after = orch.run_cycle().await.prediction.unwrap();
    assert_eq!(after.feedback_quality, Some(90.0));
    assert_relative_eq!(after.confidence, 88.0);
    assert!(after.confidence > before.confidence);
}

#[tokio::test]
async fn test_rating_is_stored_as_accuracy() {
    let samples = (0..2).map(|i| sample(i * 5, 2.0 + i as f64 * 0.1, None)).collect();
    let store = InMemoryStore::new();
    let orch = orchestrator(
        Arc::new(ReplayCollector::from_samples(samples)),
        Arc::new(store.clone()),
        Arc::new(RecordingNotifier::default()),
    );

    let mut ids = Vec::new();
    for _ in 0..2 {
        if let Some(id) = orch.run_cycle().await.prediction.and_then(|p| p.id) {
            ids.push(id);
        }
    }
    assert_eq!(ids.len(), 2);

    orch.submit_rating(ids[0], FeedbackRating::Accurate).await.unwrap();
    orch.submit_rating(ids[1], FeedbackRating::Inaccurate).await.unwrap();

    assert_eq!(store.prediction(ids[0]).await.unwrap().1, Some(1.0));
    assert_eq!(store.prediction(ids[1]).await.unwrap().1, Some(0.0));

    let feedback = orch.recent_feedback().await.unwrap();
    assert_eq!(feedback.len(), 2);
    assert!(matches!(
        orch.submit_rating(RecordId(99), FeedbackRating::Accurate).await,
        Err(AlertError::Forecast(ForecastError::UnknownRecord(RecordId(99))))
    ));
}

#[tokio::test]
async fn test_feedback_validation() {
    let store = InMemoryStore::new();
    let orch = orchestrator(
        Arc::new(FailingCollector),
        Arc::new(store.clone()),
        Arc::new(RecordingNotifier::default()),
    );

    assert!(matches!(
        orch.submit_feedback(RecordId(1), 1.2).await,
        Err(AlertError::Validation(_))
    ));
    assert!(matches!(
        orch.submit_feedback(RecordId(1), 0.5).await,
        Err(AlertError::Forecast(ForecastError::UnknownRecord(RecordId(1))))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cycles_share_one_window() {
    let config = MonitorConfig {
        window_capacity: 8,
        ..MonitorConfig::default()
    };
    let orch = Arc::new(
        Orchestrator::new(
            &config,
            Arc::new(SyntheticCollector::seeded(3.0, 0.1, 42)),
            Arc::new(InMemoryStore::new()),
            Arc::new(RecordingNotifier::default()),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run_cycle().await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_completed());
    }

    // eight samples, each with a five-minute and an hourly price
    assert_eq!(orch.snapshot().await.data_points, 16);
    assert_eq!(orch.pattern_report().await.data_points, 20);
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_cycle_reports_error() {
    let config = MonitorConfig {
        cycle_timeout_ms: 50,
        ..MonitorConfig::default()
    };
    let orch = Orchestrator::new(
        &config,
        Arc::new(SlowCollector),
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingNotifier::default()),
    )
    .unwrap();

    let report = orch.run_cycle().await;

    match report.status {
        CycleStatus::Error { stage, message } => {
            assert_eq!(stage, CycleStage::Collecting);
            assert!(message.contains("timed out"));
        }
        CycleStatus::Completed => panic!("slow cycle should time out"),
    }
    assert_eq!(orch.snapshot().await.data_points, 0);
}

#[tokio::test]
async fn test_report_serializes_with_status_tag() {
    let orch = orchestrator(
        Arc::new(FailingCollector),
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingNotifier::default()),
    );

    let json = serde_json::to_value(orch.run_cycle().await).unwrap();

    assert_eq!(json["status"], "error");
    assert_eq!(json["stage"], "collecting");
}

use price_alert::{AlertReasons, NotificationPolicy, PolicyThresholds};
use price_analysis::{AnalysisSnapshot, Trend};
use price_forecast::PredictionRecord;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn snapshot(current: f64, average: f64, min: f64, trend: Trend) -> AnalysisSnapshot {
    AnalysisSnapshot {
        current_price: current,
        average_price: average,
        min_price: min,
        max_price: average.max(current),
        trend,
        volatility: average.max(current) - min,
        data_points: 10,
    }
}

fn prediction(price: f64, confidence: f64) -> PredictionRecord {
    PredictionRecord {
        short_term_prediction: Some(price),
        confidence,
        ..PredictionRecord::empty()
    }
}

#[test]
fn test_flat_market_does_not_alert() {
    let policy = NotificationPolicy::default();
    let snap = snapshot(2.0, 2.0, 2.0, Trend::Stable);

    assert!(!policy.should_notify(&snap, &PredictionRecord::empty()));
    assert!(!policy.should_notify(&snap, &prediction(2.0, 90.0)));
}

#[test]
fn test_price_drop_alerts_regardless_of_prediction() {
    let policy = NotificationPolicy::default();
    let snap = snapshot(1.4, 2.0, 1.4, Trend::Stable);

    for record in [
        PredictionRecord::empty(),
        prediction(1.4, 10.0),
        prediction(5.0, 95.0),
    ] {
        let reasons = policy.evaluate(&snap, &record);
        assert!(reasons.price_drop);
        assert!(policy.should_notify(&snap, &record));
    }
}

#[test]
fn test_predicted_spike_alerts() {
    let policy = NotificationPolicy::default();
    let snap = snapshot(3.5, 2.0, 1.8, Trend::Rising);
    let reasons = policy.evaluate(&snap, &prediction(4.6, 80.0));

    assert!(reasons.predicted_spike);
    assert!(!reasons.predicted_drop);
    assert!(policy.should_notify(&snap, &prediction(4.6, 80.0)));
}

#[rstest]
#[case(69.9, false)]
#[case(70.0, true)]
#[case(100.0, true)]
fn test_prediction_confidence_threshold(#[case] confidence: f64, #[case] alerts: bool) {
    let policy = NotificationPolicy::default();
    let snap = snapshot(2.0, 2.0, 2.0, Trend::Stable);

    assert_eq!(policy.should_notify(&snap, &prediction(1.2, confidence)), alerts);
    assert_eq!(
        policy.evaluate(&snap, &prediction(1.2, confidence)).predicted_drop,
        alerts
    );
}

#[test]
fn test_near_low_requires_falling_trend() {
    let policy = NotificationPolicy::default();
    let falling = snapshot(1.9, 2.0, 1.7, Trend::Falling);
    let stable = snapshot(1.9, 2.0, 1.7, Trend::Stable);

    assert_eq!(
        policy.evaluate(&falling, &PredictionRecord::empty()),
        AlertReasons {
            near_low_and_falling: true,
            ..AlertReasons::default()
        }
    );
    assert!(!policy.should_notify(&stable, &PredictionRecord::empty()));
}

#[test]
fn test_price_spike() {
    let policy = NotificationPolicy::default();
    let snap = snapshot(3.0, 2.0, 1.5, Trend::Rising);

    assert!(policy.evaluate(&snap, &PredictionRecord::empty()).price_spike);
}

#[test]
fn test_alerting_is_monotone_in_downward_spread() {
    let policy = NotificationPolicy::default();
    let average = 2.0;
    let mut alerted = false;

    for step in 0..=40 {
        let current = average - step as f64 * 0.05;
        let snap = snapshot(current, average, current, Trend::Stable);
        let alerts = policy.should_notify(&snap, &PredictionRecord::empty());

        assert!(!(alerted && !alerts), "alert stopped at spread {}", average - current);
        alerted |= alerts;
    }
    assert!(alerted);
}

#[test]
fn test_custom_thresholds() {
    let policy = NotificationPolicy::new(PolicyThresholds {
        drop_margin: 0.1,
        min_confidence: 50.0,
        ..PolicyThresholds::default()
    });
    let snap = snapshot(1.85, 2.0, 1.85, Trend::Stable);

    assert!(policy.evaluate(&snap, &PredictionRecord::empty()).price_drop);
    assert!(policy.evaluate(&snap, &prediction(1.7, 55.0)).predicted_drop);
}

use price_forecast::{ForecastError, PredictionConfig, PredictionEngine, RecordId};
use price_math::MathError;

#[test]
fn test_error_display() {
    let err = ForecastError::InsufficientHistory {
        needed: 6,
        available: 3,
    };
    assert_eq!(err.to_string(), "Insufficient history: need 6 points, have 3");

    let err = ForecastError::UnknownRecord(RecordId(9));
    assert_eq!(err.to_string(), "Unknown prediction record: 9");
}

#[test]
fn test_math_error_conversion() {
    let err: ForecastError = MathError::InvalidInput("bad window".to_string()).into();
    assert!(matches!(err, ForecastError::Math(_)));
    assert!(err.to_string().contains("bad window"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let configs = [
        PredictionConfig {
            min_history_points: 1,
            ..PredictionConfig::default()
        },
        PredictionConfig {
            default_accuracy: 1.5,
            ..PredictionConfig::default()
        },
        PredictionConfig {
            falling_factor: 1.1,
            ..PredictionConfig::default()
        },
    ];

    for config in configs {
        assert!(matches!(
            PredictionEngine::with_config(config),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}

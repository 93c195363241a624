use fraudscore_core::{EngineConfig, FraudError, FraudResult};

#[test]
fn defaults_match_the_documented_table() {
    let config = EngineConfig::default();

    assert_eq!(config.anomaly.threshold_std, 2.5);
    assert_eq!(config.anomaly.min_baseline, 5);
    assert_eq!(config.velocity.time_window_minutes, 10);
    assert_eq!(config.velocity.transaction_count_threshold, 3);
    assert_eq!(config.velocity.daily_multiplier, 2.0);
    assert_eq!(config.geographic.min_speed_kmh, 900.0);
    assert_eq!(config.geographic.country_shift_confidence, 0.6);
    assert_eq!(config.behavioral.new_merchant_confidence, 0.3);
    assert!((config.weights.total() - 1.45).abs() < 1e-9);
    assert_eq!(
        (
            config.risk_thresholds.medium,
            config.risk_thresholds.high,
            config.risk_thresholds.critical
        ),
        (0.30, 0.50, 0.70)
    );
    assert!(config.validate().is_ok());
}

#[test]
fn partial_json_keeps_remaining_defaults() -> FraudResult<()> {
    let config = EngineConfig::from_json_str(
        r#"{
            "velocity": { "time_window_minutes": 30 },
            "weights": { "impossible_travel": 0.5 }
        }"#,
    )?;

    assert_eq!(config.velocity.time_window_minutes, 30);
    assert_eq!(config.velocity.transaction_count_threshold, 3);
    assert_eq!(config.weights.impossible_travel, 0.5);
    assert_eq!(config.weights.amount_anomaly, 0.20);
    assert_eq!(config.anomaly, EngineConfig::default().anomaly);
    Ok(())
}

#[test]
fn empty_document_is_the_default() -> FraudResult<()> {
    assert_eq!(EngineConfig::from_json_str("{}")?, EngineConfig::default());
    Ok(())
}

#[test]
fn out_of_order_thresholds_are_rejected() {
    let err = EngineConfig::from_json_str(r#"{"risk_thresholds": {"medium": 0.6, "high": 0.5}}"#);
    assert!(matches!(err, Err(FraudError::InvalidConfig { .. })));
}

#[test]
fn negative_and_all_zero_weights_are_rejected() {
    let mut config = EngineConfig::default();
    config.weights.country_shift = -0.1;
    assert!(matches!(config.validate(), Err(FraudError::InvalidConfig { .. })));

    let zeroed = r#"{"weights": {
        "amount_anomaly": 0, "time_anomaly": 0, "rapid_transactions": 0,
        "high_frequency_day": 0, "impossible_travel": 0, "country_shift": 0,
        "category_deviation": 0, "new_merchant": 0
    }}"#;
    assert!(matches!(
        EngineConfig::from_json_str(zeroed),
        Err(FraudError::InvalidConfig { .. })
    ));
}

#[test]
fn degenerate_detector_parameters_are_rejected() {
    let mut config = EngineConfig::default();
    config.velocity.time_window_minutes = 0;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.velocity.transaction_count_threshold = 0;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.geographic.min_speed_kmh = 0.0;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.behavioral.new_merchant_confidence = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn malformed_json_is_a_serialization_error() {
    assert!(matches!(
        EngineConfig::from_json_str("{ not json"),
        Err(FraudError::Serialization(_))
    ));
}

//! Amount and time-of-day anomaly detection.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fraudscore_core::{
    anomaly_detector::AnomalyDetector, config::AnomalyConfig, FraudResult, MerchantCategory,
    Transaction, TransactionHistory,
};

fn day(n: i64, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, 15, 0).unwrap() + Duration::days(n)
}

fn tx(id: &str, amount: f64, at: DateTime<Utc>) -> Transaction {
    Transaction::new(id, "CH001", amount, at)
        .with_merchant("Target", MerchantCategory::Retail)
        .with_country("USA")
}

/// Ten purchases alternating $80 / $120: mean $100, sample std ≈ $21.
fn steady_spender() -> FraudResult<TransactionHistory> {
    let mut history = TransactionHistory::new();
    for i in 0..10 {
        let amount = if i % 2 == 0 { 80.0 } else { 120.0 };
        history.add_transaction(tx(&format!("TX{i:02}"), amount, day(i, 10)))?;
    }
    Ok(history)
}

#[test]
fn large_spike_is_anomalous_at_full_confidence() -> FraudResult<()> {
    let history = steady_spender()?;
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());

    let signal = detector.detect_amount_anomaly(&tx("NEW", 5000.0, day(10, 10)));
    assert!(signal.triggered);
    assert_eq!(signal.confidence, 1.0);
    Ok(())
}

#[test]
fn ordinary_amount_is_not_anomalous_but_still_reports_confidence() -> FraudResult<()> {
    let history = steady_spender()?;
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());

    let signal = detector.detect_amount_anomaly(&tx("NEW", 130.0, day(10, 10)));
    assert!(!signal.triggered);
    // z ≈ 1.42, confidence = z / 5
    assert!(signal.confidence > 0.2 && signal.confidence < 0.35, "{}", signal.confidence);
    Ok(())
}

#[test]
fn confidence_saturates_only_past_twice_the_threshold() -> FraudResult<()> {
    let history = steady_spender()?;
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());
    // std ≈ 21.08; 100 + 3 × std gives z = 3, just past 2.5
    let signal = detector.detect_amount_anomaly(&tx("NEW", 163.25, day(10, 10)));
    assert!(signal.triggered);
    assert!(signal.confidence > 0.55 && signal.confidence < 0.65, "{}", signal.confidence);
    Ok(())
}

#[test]
fn fewer_than_five_prior_transactions_is_silent() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    for i in 0..4 {
        history.add_transaction(tx(&format!("TX{i}"), 20.0 + i as f64, day(i, 10)))?;
    }
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());
    let candidate = tx("NEW", 10_000.0, day(5, 3));

    let amount = detector.detect_amount_anomaly(&candidate);
    let time = detector.detect_time_anomaly(&candidate);
    assert!(!amount.triggered);
    assert_eq!(amount.confidence, 0.0);
    assert!(!time.triggered);
    assert_eq!(time.confidence, 0.0);
    Ok(())
}

#[test]
fn candidate_is_excluded_from_its_own_baseline() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    for i in 0..4 {
        history.add_transaction(tx(&format!("TX{i}"), 50.0, day(i, 10)))?;
    }
    let candidate = tx("NEW", 50.0, day(4, 10));
    history.add_transaction(candidate.clone())?;

    // Five recorded, but only four are baseline for the candidate itself.
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());
    let signal = detector.detect_amount_anomaly(&candidate);
    assert_eq!(signal.confidence, 0.0);
    assert!(!signal.triggered);
    Ok(())
}

#[test]
fn flat_history_treats_any_deviation_as_maximal() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    for i in 0..6 {
        history.add_transaction(tx(&format!("TX{i}"), 25.0, day(i, 10)))?;
    }
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());

    let same = detector.detect_amount_anomaly(&tx("SAME", 25.0, day(7, 10)));
    assert!(!same.triggered);
    assert_eq!(same.confidence, 0.0);

    let off = detector.detect_amount_anomaly(&tx("OFF", 26.0, day(7, 10)));
    assert!(off.triggered);
    assert_eq!(off.confidence, 1.0);
    Ok(())
}

#[test]
fn threshold_is_configurable() -> FraudResult<()> {
    let history = steady_spender()?;
    let strict = AnomalyDetector::new(
        &history,
        AnomalyConfig {
            threshold_std: 1.0,
            ..AnomalyConfig::default()
        },
    );
    assert!(strict.detect_amount_anomaly(&tx("NEW", 130.0, day(10, 10))).triggered);
    Ok(())
}

#[test]
fn unseen_hour_is_a_time_anomaly() -> FraudResult<()> {
    let history = steady_spender()?;
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());

    let night = detector.detect_time_anomaly(&tx("NEW", 100.0, day(10, 3)));
    assert!(night.triggered);
    assert_eq!(night.confidence, 1.0);

    let usual = detector.detect_time_anomaly(&tx("NEW", 100.0, day(10, 10)));
    assert!(!usual.triggered);
    assert_eq!(usual.confidence, 0.0);
    Ok(())
}

#[test]
fn hour_seen_just_under_five_percent_is_rare() -> FraudResult<()> {
    // 1 of 25 transactions (4%) at 22:00, the rest at 10:00.
    let mut history = TransactionHistory::new();
    for i in 0..25 {
        let hour = if i == 0 { 22 } else { 10 };
        history.add_transaction(tx(&format!("TX{i:02}"), 50.0, day(i, hour)))?;
    }
    let detector = AnomalyDetector::new(&history, AnomalyConfig::default());

    let signal = detector.detect_time_anomaly(&tx("NEW", 50.0, day(30, 22)));
    assert!(signal.triggered);
    assert!((signal.confidence - 0.96).abs() < 1e-9);
    Ok(())
}

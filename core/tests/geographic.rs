//! Impossible-travel and country-shift detection.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fraudscore_core::{
    config::GeographicConfig, geographic_analyzer::GeographicAnalyzer, FraudResult,
    MerchantCategory, Transaction, TransactionHistory,
};

const SF: (f64, f64) = (37.77, -122.42);
const LONDON: (f64, f64) = (51.51, -0.13);
const NYC: (f64, f64) = (40.71, -74.01);

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

fn tx(id: &str, at: DateTime<Utc>, (lat, lon): (f64, f64), country: &str) -> Transaction {
    Transaction::new(id, "CH001", 75.0, at)
        .with_merchant("Starbucks", MerchantCategory::Restaurant)
        .with_location(lat, lon)
        .with_country(country)
}

fn analyzer(history: &TransactionHistory) -> GeographicAnalyzer<'_> {
    GeographicAnalyzer::new(history, GeographicConfig::default())
}

#[test]
fn san_francisco_to_london_in_five_minutes_is_impossible() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    history.add_transaction(tx("TX1", t0(), SF, "USA"))?;

    let candidate = tx("TX2", t0() + Duration::minutes(5), LONDON, "GBR");
    let (signal, speed) = analyzer(&history).check_impossible_travel(&candidate);

    let speed = speed.unwrap_or_default();
    assert!(speed > 100_000.0 && speed < 106_000.0, "speed was {speed}");
    assert!(signal.triggered);
    assert_eq!(signal.confidence, 1.0);
    Ok(())
}

#[test]
fn same_place_is_never_impossible() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    history.add_transaction(tx("TX1", t0(), SF, "USA"))?;
    let geo = analyzer(&history);

    for elapsed in [Duration::zero(), Duration::seconds(1), Duration::hours(5)] {
        let (signal, speed) = geo.check_impossible_travel(&tx("TX2", t0() + elapsed, SF, "USA"));
        assert!(!signal.triggered);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(speed, Some(0.0));
    }
    Ok(())
}

#[test]
fn simultaneous_transactions_far_apart_are_maximally_impossible() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    history.add_transaction(tx("TX1", t0(), SF, "USA"))?;

    let (signal, speed) = analyzer(&history).check_impossible_travel(&tx("TX2", t0(), NYC, "USA"));
    assert!(signal.triggered);
    assert_eq!(signal.confidence, 1.0);
    assert_eq!(speed, Some(f64::INFINITY));
    Ok(())
}

#[test]
fn a_cross_country_flight_is_plausible() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    history.add_transaction(tx("TX1", t0(), SF, "USA"))?;

    // ~4,130 km in 6 hours
    let candidate = tx("TX2", t0() + Duration::hours(6), NYC, "USA");
    let (signal, speed) = analyzer(&history).check_impossible_travel(&candidate);
    assert!(speed.unwrap_or_default() < 900.0);
    assert!(!signal.triggered);
    assert_eq!(signal.confidence, 0.0);
    Ok(())
}

#[test]
fn no_located_predecessor_means_no_signal() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    let geo = analyzer(&history);
    let (signal, speed) = geo.check_impossible_travel(&tx("TX1", t0(), SF, "USA"));
    assert_eq!((signal.triggered, signal.confidence, speed), (false, 0.0, None));

    history.add_transaction(Transaction::new("TX0", "CH001", 10.0, t0()).with_country("USA"))?;
    let candidate = tx("TX1", t0() + Duration::minutes(1), LONDON, "GBR");
    let (signal, speed) = analyzer(&history).check_impossible_travel(&candidate);
    assert_eq!((signal.triggered, signal.confidence, speed), (false, 0.0, None));
    Ok(())
}

#[test]
fn unlocated_candidate_means_no_signal() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    history.add_transaction(tx("TX1", t0(), SF, "USA"))?;

    let candidate =
        Transaction::new("TX2", "CH001", 10.0, t0() + Duration::minutes(1)).with_country("GBR");
    let (signal, speed) = analyzer(&history).check_impossible_travel(&candidate);
    assert!(!signal.triggered);
    assert_eq!(speed, None);
    Ok(())
}

#[test]
fn travel_is_measured_from_the_latest_located_transaction() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    history.add_transaction(tx("TX1", t0(), SF, "USA"))?;
    history.add_transaction(tx("TX2", t0() + Duration::hours(12), LONDON, "GBR"))?;
    history.add_transaction(
        Transaction::new("TX3", "CH001", 5.0, t0() + Duration::hours(13)).with_country("GBR"),
    )?;

    // The unlocated TX3 is skipped; London → London is no movement.
    let candidate = tx("TX4", t0() + Duration::hours(13), LONDON, "GBR");
    let (signal, speed) = analyzer(&history).check_impossible_travel(&candidate);
    assert!(!signal.triggered);
    assert_eq!(speed, Some(0.0));
    Ok(())
}

#[test]
fn first_ever_transaction_is_not_a_country_shift() {
    let history = TransactionHistory::new();
    let signal = analyzer(&history).check_country_shift(&tx("TX1", t0(), LONDON, "GBR"));
    assert!(!signal.triggered);
    assert_eq!(signal.confidence, 0.0);
}

#[test]
fn second_transaction_from_another_country_is_a_shift() -> FraudResult<()> {
    let mut history = TransactionHistory::new();
    history.add_transaction(tx("TX1", t0(), SF, "USA"))?;
    let geo = analyzer(&history);

    let shifted = geo.check_country_shift(&tx("TX2", t0() + Duration::days(2), LONDON, "GBR"));
    assert!(shifted.triggered);
    assert!((shifted.confidence - 0.6).abs() < 1e-12);

    let home = geo.check_country_shift(&tx("TX3", t0() + Duration::days(2), NYC, "USA"));
    assert!(!home.triggered);
    assert_eq!(home.confidence, 0.0);
    Ok(())
}

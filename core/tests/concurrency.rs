//! Shared history under concurrent writers and readers.

use chrono::{TimeZone, Utc};
use fraudscore_core::{
    EngineConfig, FraudResult, MerchantCategory, SharedHistory, Transaction,
};
use std::collections::BTreeSet;
use std::thread;

fn purchase(id: String, cardholder: String) -> Transaction {
    Transaction::new(id, cardholder, 25.0, Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
        .with_merchant("Kiosk", MerchantCategory::Retail)
        .with_country("USA")
}

#[test]
fn concurrent_writers_lose_nothing() -> FraudResult<()> {
    let shared = SharedHistory::new();

    thread::scope(|scope| {
        for worker in 0..8 {
            let shared = shared.clone();
            scope.spawn(move || {
                for n in 0..25 {
                    let tx = purchase(format!("W{worker}-{n}"), format!("CH{worker}"));
                    shared.add_transaction(tx).expect("distinct ids");
                }
            });
        }
    });

    assert_eq!(shared.len()?, 200);
    let per_cardholder = shared.with_history(|h| {
        (0..8)
            .map(|w| h.get_transactions_by_cardholder(&format!("CH{w}")).len())
            .collect::<Vec<_>>()
    })?;
    assert_eq!(per_cardholder, vec![25; 8]);
    Ok(())
}

#[test]
fn analyze_and_record_serializes_same_cardholder() -> FraudResult<()> {
    let shared = SharedHistory::new();
    let config = EngineConfig::default();

    let counts: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..20)
            .map(|n| {
                let shared = &shared;
                let config = &config;
                scope.spawn(move || {
                    shared
                        .analyze_and_record(config, purchase(format!("TX{n}"), "CH001".into()))
                        .map(|r| r.details.rapid_tx_count)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker").expect("analysis"))
            .collect()
    });

    // Each analysis saw a distinct number of already-recorded predecessors.
    let distinct: BTreeSet<usize> = counts.into_iter().collect();
    assert_eq!(distinct, (0..20).collect::<BTreeSet<_>>());
    assert_eq!(shared.len()?, 20);
    Ok(())
}

#[test]
fn readers_see_a_consistent_history() -> FraudResult<()> {
    let shared = SharedHistory::new();
    for n in 0..5 {
        shared.add_transaction(purchase(format!("TX{n}"), "CH001".into()))?;
    }
    let config = EngineConfig::default();
    let probe = purchase("PROBE".into(), "CH001".into());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|_| scope.spawn(|| shared.analyze(&config, &probe)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("reader"))
            .collect::<FraudResult<Vec<_>>>()
    })?;

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(shared.len()?, 5);
    Ok(())
}

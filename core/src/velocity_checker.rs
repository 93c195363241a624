//! Velocity: bursts of transactions and unusually busy days.

use crate::{
    config::VelocityConfig,
    history::TransactionHistory,
    transaction::Transaction,
    types::Signal,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

pub struct VelocityChecker<'h> {
    history: &'h TransactionHistory,
    config: VelocityConfig,
}

impl<'h> VelocityChecker<'h> {
    pub fn new(history: &'h TransactionHistory, config: VelocityConfig) -> Self {
        Self { history, config }
    }

    /// Count prior transactions inside the window ending at the candidate.
    ///
    /// Returns the signal and the count. A count exactly at the threshold
    /// yields confidence `1 / threshold`; each extra transaction adds
    /// another `1 / threshold`.
    pub fn check_rapid_transactions(&self, candidate: &Transaction) -> (Signal, usize) {
        let window_end = candidate.timestamp;
        // A window reaching past the earliest representable instant covers everything.
        let window_start = Duration::try_minutes(self.config.time_window_minutes)
            .and_then(|window| window_end.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let count = self
            .history
            .baseline_for(candidate)
            .filter(|t| window_start <= t.timestamp && t.timestamp <= window_end)
            .count();

        let threshold = self.config.transaction_count_threshold as f64;
        let confidence = (count as f64 - threshold + 1.0) / threshold;
        (
            Signal::new(count >= self.config.transaction_count_threshold, confidence),
            count,
        )
    }

    /// Compare the candidate's calendar-day count to the historical daily average.
    ///
    /// Returns the signal and the day count, candidate included.
    pub fn check_high_frequency_day(&self, candidate: &Transaction) -> (Signal, usize) {
        let target_day = candidate.timestamp.date_naive();

        let mut total = 0usize;
        let mut same_day = 0usize;
        let mut days = HashSet::new();
        for t in self.history.baseline_for(candidate) {
            let day = t.timestamp.date_naive();
            if day == target_day {
                same_day += 1;
            }
            days.insert(day);
            total += 1;
        }
        let day_count = same_day + 1;

        if total < self.config.min_baseline.max(1) {
            return (Signal::QUIET, day_count);
        }

        let avg_per_day = total as f64 / days.len().max(1) as f64;
        let multiplier = self.config.daily_multiplier;
        let ratio = day_count as f64 / avg_per_day;

        (
            Signal::new(ratio > multiplier, (ratio - multiplier) / multiplier),
            day_count,
        )
    }
}

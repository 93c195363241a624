//! Geography: physically impossible travel and first use from a new country.

use crate::{
    config::GeographicConfig,
    history::TransactionHistory,
    transaction::{Location, Transaction},
    types::Signal,
};
use std::collections::HashSet;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Elapsed time below this is treated as simultaneous (one millisecond).
const SIMULTANEOUS_HOURS: f64 = 1.0 / 3_600_000.0;

pub struct GeographicAnalyzer<'h> {
    history: &'h TransactionHistory,
    config: GeographicConfig,
}

impl<'h> GeographicAnalyzer<'h> {
    pub fn new(history: &'h TransactionHistory, config: GeographicConfig) -> Self {
        Self { history, config }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn calculate_distance(a: &Location, b: &Location) -> f64 {
        let lat1 = a.latitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let dlat = (b.latitude - a.latitude).to_radians();
        let dlon = (b.longitude - a.longitude).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
    }

    /// Implied speed between the most recent located transaction at or before
    /// the candidate and the candidate itself.
    ///
    /// Returns the signal and the speed in km/h, if one could be computed.
    /// Movement with no elapsed time reports an infinite speed.
    pub fn check_impossible_travel(&self, candidate: &Transaction) -> (Signal, Option<f64>) {
        let Some(here) = candidate.location else {
            return (Signal::QUIET, None);
        };

        let previous = self
            .history
            .baseline_for(candidate)
            .filter(|t| t.timestamp <= candidate.timestamp)
            .filter_map(|t| t.location.map(|loc| (t, loc)))
            .last();
        let Some((prev_tx, there)) = previous else {
            return (Signal::QUIET, None);
        };

        let distance = Self::calculate_distance(&there, &here);
        if distance <= 0.0 {
            return (Signal::QUIET, Some(0.0));
        }

        let elapsed_hours =
            (candidate.timestamp - prev_tx.timestamp).num_milliseconds() as f64 / 3_600_000.0;
        if elapsed_hours < SIMULTANEOUS_HOURS {
            return (Signal::new(true, 1.0), Some(f64::INFINITY));
        }

        let speed = distance / elapsed_hours;
        let min_speed = self.config.min_speed_kmh;
        (
            Signal::new(speed > min_speed, (speed - min_speed) / min_speed),
            Some(speed),
        )
    }

    /// First transaction from a country the cardholder has never used.
    /// A cardholder's very first transaction is never a shift.
    pub fn check_country_shift(&self, candidate: &Transaction) -> Signal {
        let countries: HashSet<&str> = self
            .history
            .baseline_for(candidate)
            .map(|t| t.country.as_str())
            .collect();

        if countries.is_empty() || countries.contains(candidate.country.as_str()) {
            return Signal::QUIET;
        }
        Signal::new(true, self.config.country_shift_confidence)
    }
}

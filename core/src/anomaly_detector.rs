//! Statistical anomalies: unusual amounts and unusual hours of day.

use crate::{
    config::AnomalyConfig,
    history::TransactionHistory,
    transaction::Transaction,
    types::Signal,
};
use chrono::Timelike;

/// Stand-in z-score when the baseline has zero spread and the amount differs.
pub const SATURATED_Z: f64 = 1.0e6;

/// Spread below this is treated as zero.
const ZERO_SPREAD: f64 = 1.0e-9;

pub struct AnomalyDetector<'h> {
    history: &'h TransactionHistory,
    config: AnomalyConfig,
}

impl<'h> AnomalyDetector<'h> {
    pub fn new(history: &'h TransactionHistory, config: AnomalyConfig) -> Self {
        Self { history, config }
    }

    /// Z-score of the candidate amount against the cardholder's baseline.
    ///
    /// Confidence is `z / (2 × threshold)`, saturating at 1.0, and is
    /// reported whether or not the threshold is crossed.
    pub fn detect_amount_anomaly(&self, candidate: &Transaction) -> Signal {
        let amounts: Vec<f64> = self
            .history
            .baseline_for(candidate)
            .map(|t| t.amount)
            .collect();

        if amounts.len() < self.config.min_baseline.max(2) {
            return Signal::QUIET;
        }

        let (mean, std_dev) = mean_and_sample_std(&amounts);
        let z = z_score(candidate.amount, mean, std_dev);
        let threshold = self.config.threshold_std;

        Signal::new(z > threshold, z / (threshold * 2.0))
    }

    /// Rarity of the candidate's hour of day in the cardholder's history.
    pub fn detect_time_anomaly(&self, candidate: &Transaction) -> Signal {
        let mut hour_counts = [0usize; 24];
        let mut total = 0usize;
        for t in self.history.baseline_for(candidate) {
            hour_counts[t.timestamp.hour() as usize] += 1;
            total += 1;
        }

        if total < self.config.min_baseline.max(1) {
            return Signal::QUIET;
        }

        let frequency = hour_counts[candidate.timestamp.hour() as usize] as f64 / total as f64;
        if frequency < self.config.rare_frequency {
            Signal::new(true, 1.0 - frequency)
        } else {
            Signal::QUIET
        }
    }
}

/// Mean and sample (n - 1) standard deviation. Needs at least two values.
pub fn mean_and_sample_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    let deviation = (value - mean).abs();
    if std_dev < ZERO_SPREAD {
        if deviation < ZERO_SPREAD {
            0.0
        } else {
            SATURATED_Z
        }
    } else {
        deviation / std_dev
    }
}

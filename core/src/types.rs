//! Shared primitive types used across the scoring pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a single payment event.
pub type TransactionId = String;

/// Stable identifier of a cardholder; the key into the history.
pub type CardholderId = String;

/// Outcome of one detector: a boolean verdict plus a continuous
/// confidence in [0, 1]. Confidence is reported even when not triggered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Signal {
    pub triggered: bool,
    pub confidence: f64,
}

impl Signal {
    /// Insufficient data, or nothing unusual.
    pub const QUIET: Signal = Signal {
        triggered: false,
        confidence: 0.0,
    };

    pub fn new(triggered: bool, confidence: f64) -> Self {
        Self {
            triggered,
            confidence: clamp_unit(confidence),
        }
    }
}

/// The eight fraud indicators, in the order the engine evaluates them.
/// Variants are ordered so maps keyed by `Indicator` iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    AmountAnomaly,
    TimeAnomaly,
    RapidTransactions,
    HighFrequencyDay,
    ImpossibleTravel,
    CountryShift,
    CategoryDeviation,
    NewMerchant,
}

impl Indicator {
    pub const ALL: [Indicator; 8] = [
        Indicator::AmountAnomaly,
        Indicator::TimeAnomaly,
        Indicator::RapidTransactions,
        Indicator::HighFrequencyDay,
        Indicator::ImpossibleTravel,
        Indicator::CountryShift,
        Indicator::CategoryDeviation,
        Indicator::NewMerchant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AmountAnomaly => "amount_anomaly",
            Self::TimeAnomaly => "time_anomaly",
            Self::RapidTransactions => "rapid_transactions",
            Self::HighFrequencyDay => "high_frequency_day",
            Self::ImpossibleTravel => "impossible_travel",
            Self::CountryShift => "country_shift",
            Self::CategoryDeviation => "category_deviation",
            Self::NewMerchant => "new_merchant",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Clamp to [0, 1], mapping NaN to 0.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

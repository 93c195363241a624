//! Immutable scoring configuration.
//!
//! RULE: Thresholds and weights are plain values handed to the engine
//! constructor. Nothing here is global or mutated after construction.

use crate::{
    error::{FraudError, FraudResult},
    types::Indicator,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

// ── Detector parameters ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Z-score above which an amount is anomalous.
    pub threshold_std: f64,
    /// Historical transactions required before amount/time signals fire.
    pub min_baseline: usize,
    /// An hour-of-day seen less often than this is unusual.
    pub rare_frequency: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            threshold_std: 2.5,
            min_baseline: 5,
            rare_frequency: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    pub time_window_minutes: i64,
    pub transaction_count_threshold: usize,
    /// Day count must exceed this multiple of the daily average.
    pub daily_multiplier: f64,
    /// Historical transactions required before the daily check fires.
    pub min_baseline: usize,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            time_window_minutes: 10,
            transaction_count_threshold: 3,
            daily_multiplier: 2.0,
            min_baseline: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographicConfig {
    /// Commercial flight speed; anything faster is impossible travel.
    pub min_speed_kmh: f64,
    pub country_shift_confidence: f64,
}

impl Default for GeographicConfig {
    fn default() -> Self {
        Self {
            min_speed_kmh: 900.0,
            country_shift_confidence: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralConfig {
    pub rare_frequency: f64,
    pub min_baseline: usize,
    pub new_merchant_confidence: f64,
}

impl Default for BehavioralConfig {
    fn default() -> Self {
        Self {
            rare_frequency: 0.05,
            min_baseline: 5,
            new_merchant_confidence: 0.3,
        }
    }
}

// ── Scoring parameters ───────────────────────────────────────────────────────

/// Per-indicator weights. The engine divides by their sum, so the table
/// need not add up to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorWeights {
    pub amount_anomaly: f64,
    pub time_anomaly: f64,
    pub rapid_transactions: f64,
    pub high_frequency_day: f64,
    pub impossible_travel: f64,
    pub country_shift: f64,
    pub category_deviation: f64,
    pub new_merchant: f64,
}

impl Default for IndicatorWeights {
    fn default() -> Self {
        Self {
            amount_anomaly: 0.20,
            time_anomaly: 0.10,
            rapid_transactions: 0.25,
            high_frequency_day: 0.15,
            impossible_travel: 0.30,
            country_shift: 0.20,
            category_deviation: 0.10,
            new_merchant: 0.15,
        }
    }
}

impl IndicatorWeights {
    pub fn weight(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::AmountAnomaly => self.amount_anomaly,
            Indicator::TimeAnomaly => self.time_anomaly,
            Indicator::RapidTransactions => self.rapid_transactions,
            Indicator::HighFrequencyDay => self.high_frequency_day,
            Indicator::ImpossibleTravel => self.impossible_travel,
            Indicator::CountryShift => self.country_shift,
            Indicator::CategoryDeviation => self.category_deviation,
            Indicator::NewMerchant => self.new_merchant,
        }
    }

    pub fn total(&self) -> f64 {
        Indicator::ALL.iter().map(|i| self.weight(*i)).sum()
    }
}

/// Lower bounds of each risk tier; anything below `medium` is LOW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.30,
            high: 0.50,
            critical: 0.70,
        }
    }
}

// ── Engine configuration ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub anomaly: AnomalyConfig,
    pub velocity: VelocityConfig,
    pub geographic: GeographicConfig,
    pub behavioral: BehavioralConfig,
    pub weights: IndicatorWeights,
    pub risk_thresholds: RiskThresholds,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document; missing keys keep defaults.
    pub fn from_json_str(json: &str) -> FraudResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file. Used by the runner's `--config` flag.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_json_str(&content)?)
    }

    pub fn validate(&self) -> FraudResult<()> {
        positive("anomaly.threshold_std", self.anomaly.threshold_std)?;
        unit("anomaly.rare_frequency", self.anomaly.rare_frequency)?;
        if self.velocity.time_window_minutes <= 0 {
            return invalid("velocity.time_window_minutes must be positive");
        }
        if Duration::try_minutes(self.velocity.time_window_minutes).is_none() {
            return invalid("velocity.time_window_minutes is too large to represent");
        }
        if self.velocity.transaction_count_threshold == 0 {
            return invalid("velocity.transaction_count_threshold must be at least 1");
        }
        positive("velocity.daily_multiplier", self.velocity.daily_multiplier)?;
        positive("geographic.min_speed_kmh", self.geographic.min_speed_kmh)?;
        unit(
            "geographic.country_shift_confidence",
            self.geographic.country_shift_confidence,
        )?;
        unit("behavioral.rare_frequency", self.behavioral.rare_frequency)?;
        unit(
            "behavioral.new_merchant_confidence",
            self.behavioral.new_merchant_confidence,
        )?;

        for indicator in Indicator::ALL {
            let w = self.weights.weight(indicator);
            if !w.is_finite() || w < 0.0 {
                return invalid(format!("weight for {indicator} must be a non-negative number"));
            }
        }
        if self.weights.total() <= 0.0 {
            return invalid("at least one indicator weight must be positive");
        }

        let t = &self.risk_thresholds;
        let ascending =
            0.0 < t.medium && t.medium < t.high && t.high < t.critical && t.critical <= 1.0;
        if !ascending {
            return invalid(format!(
                "risk thresholds must satisfy 0 < medium < high < critical <= 1, got {}/{}/{}",
                t.medium, t.high, t.critical
            ));
        }
        Ok(())
    }
}

fn invalid<T>(reason: impl Into<String>) -> FraudResult<T> {
    Err(FraudError::InvalidConfig {
        reason: reason.into(),
    })
}

fn positive(name: &str, value: f64) -> FraudResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be positive, got {value}"))
    }
}

fn unit(name: &str, value: f64) -> FraudResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        invalid(format!("{name} must be within [0, 1], got {value}"))
    }
}

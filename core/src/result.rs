//! The immutable outcome of one analysis.

use crate::{
    error::FraudResult,
    transaction::{MerchantCategory, TransactionType},
    types::{CardholderId, Indicator, TransactionId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    ApproveTransaction,
    MonitorTransaction,
    ReviewTransaction,
    RequireVerification,
    BlockTransaction,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApproveTransaction => "APPROVE_TRANSACTION",
            Self::MonitorTransaction => "MONITOR_TRANSACTION",
            Self::ReviewTransaction => "REVIEW_TRANSACTION",
            Self::RequireVerification => "REQUIRE_VERIFICATION",
            Self::BlockTransaction => "BLOCK_TRANSACTION",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One indicator's contribution to the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub triggered: bool,
    pub confidence: f64,
    pub weight: f64,
}

/// Salient transaction fields echoed for audit, plus detector measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction_amount: f64,
    pub merchant_name: String,
    pub merchant_category: MerchantCategory,
    pub transaction_type: TransactionType,
    pub country: String,
    pub timestamp: DateTime<Utc>,
    pub rapid_tx_count: usize,
    pub daily_tx_count: usize,
    /// km/h; `None` when no located predecessor exists.
    pub impossible_travel_speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAnalysisResult {
    pub transaction_id: TransactionId,
    pub cardholder_id: CardholderId,
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    pub fraud_indicators: BTreeMap<Indicator, IndicatorResult>,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    pub details: TransactionDetails,
}

impl FraudAnalysisResult {
    pub fn is_triggered(&self, indicator: Indicator) -> bool {
        self.fraud_indicators
            .get(&indicator)
            .map(|r| r.triggered)
            .unwrap_or(false)
    }

    pub fn triggered_indicators(&self) -> Vec<Indicator> {
        self.fraud_indicators
            .iter()
            .filter(|(_, r)| r.triggered)
            .map(|(i, _)| *i)
            .collect()
    }

    pub fn to_json(&self) -> FraudResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

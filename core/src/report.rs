//! Aggregate view over a batch of analysis results.

use crate::{
    result::{FraudAnalysisResult, RiskLevel},
    types::Indicator,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of indicators listed in `top_fraud_indicators`.
const TOP_INDICATORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_transactions: usize,
    /// HIGH and CRITICAL together.
    pub high_risk_transactions: usize,
    pub medium_risk_transactions: usize,
    pub average_fraud_score: f64,
    /// Most frequently triggered indicators, most frequent first.
    pub top_fraud_indicators: Vec<(Indicator, usize)>,
    /// High-risk count plus half the medium-risk count, rounded down.
    pub estimated_fraud_transactions: usize,
}

impl SummaryReport {
    pub fn from_results(results: &[FraudAnalysisResult]) -> Self {
        let high = results
            .iter()
            .filter(|r| r.risk_level >= RiskLevel::High)
            .count();
        let medium = results
            .iter()
            .filter(|r| r.risk_level == RiskLevel::Medium)
            .count();

        let average = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.fraud_score).sum::<f64>() / results.len() as f64
        };

        let mut counts: BTreeMap<Indicator, usize> = BTreeMap::new();
        for indicator in results.iter().flat_map(|r| r.triggered_indicators()) {
            *counts.entry(indicator).or_insert(0) += 1;
        }
        let mut top: Vec<(Indicator, usize)> = counts.into_iter().collect();
        // Stable sort keeps indicator order among ties.
        top.sort_by(|a, b| b.1.cmp(&a.1));
        top.truncate(TOP_INDICATORS);

        Self {
            total_transactions: results.len(),
            high_risk_transactions: high,
            medium_risk_transactions: medium,
            average_fraud_score: average,
            top_fraud_indicators: top,
            estimated_fraud_transactions: high + medium / 2,
        }
    }
}

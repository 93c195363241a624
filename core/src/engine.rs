//! The fraud analysis engine: runs all eight detectors over a history
//! snapshot, combines their confidences and classifies the result.
//!
//! EVALUATION ORDER (fixed, mirrors `Indicator::ALL`):
//!   1. amount_anomaly        5. impossible_travel
//!   2. time_anomaly          6. country_shift
//!   3. rapid_transactions    7. category_deviation
//!   4. high_frequency_day    8. new_merchant
//!
//! RULES:
//!   - Analysis never mutates history. Recording is the caller's decision.
//!   - Structurally invalid transactions are rejected before any detector runs.
//!   - Sparse history is not an error; affected indicators stay quiet.

use crate::{
    anomaly_detector::AnomalyDetector,
    behavioral_analyzer::BehavioralAnalyzer,
    config::EngineConfig,
    error::{FraudError, FraudResult},
    geographic_analyzer::GeographicAnalyzer,
    history::TransactionHistory,
    report::SummaryReport,
    result::{FraudAnalysisResult, IndicatorResult, Recommendation, RiskLevel, TransactionDetails},
    transaction::Transaction,
    types::{clamp_unit, Indicator, Signal},
    velocity_checker::VelocityChecker,
};
use std::collections::BTreeMap;

pub struct FraudAnalysisEngine<'h> {
    config: EngineConfig,
    anomaly: AnomalyDetector<'h>,
    velocity: VelocityChecker<'h>,
    geographic: GeographicAnalyzer<'h>,
    behavioral: BehavioralAnalyzer<'h>,
}

impl<'h> FraudAnalysisEngine<'h> {
    /// Build an engine over `history` with a validated configuration.
    pub fn new(history: &'h TransactionHistory, config: EngineConfig) -> FraudResult<Self> {
        config.validate()?;
        Ok(Self::build(history, config))
    }

    /// Engine with the stock thresholds and weights.
    pub fn with_defaults(history: &'h TransactionHistory) -> Self {
        Self::build(history, EngineConfig::default())
    }

    fn build(history: &'h TransactionHistory, config: EngineConfig) -> Self {
        Self {
            anomaly: AnomalyDetector::new(history, config.anomaly),
            velocity: VelocityChecker::new(history, config.velocity),
            geographic: GeographicAnalyzer::new(history, config.geographic),
            behavioral: BehavioralAnalyzer::new(history, config.behavioral),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score one transaction against the current history.
    pub fn analyze_transaction(
        &self,
        transaction: &Transaction,
    ) -> FraudResult<FraudAnalysisResult> {
        transaction.validate()?;

        let (rapid, rapid_count) = self.velocity.check_rapid_transactions(transaction);
        let (busy_day, daily_count) = self.velocity.check_high_frequency_day(transaction);
        let (travel, speed) = self.geographic.check_impossible_travel(transaction);

        let signals: [(Indicator, Signal); 8] = [
            (Indicator::AmountAnomaly, self.anomaly.detect_amount_anomaly(transaction)),
            (Indicator::TimeAnomaly, self.anomaly.detect_time_anomaly(transaction)),
            (Indicator::RapidTransactions, rapid),
            (Indicator::HighFrequencyDay, busy_day),
            (Indicator::ImpossibleTravel, travel),
            (Indicator::CountryShift, self.geographic.check_country_shift(transaction)),
            (Indicator::CategoryDeviation, self.behavioral.analyze_category_deviation(transaction)),
            (Indicator::NewMerchant, self.behavioral.check_merchant_pattern(transaction)),
        ];

        let fraud_indicators: BTreeMap<Indicator, IndicatorResult> = signals
            .iter()
            .map(|(indicator, signal)| {
                (
                    *indicator,
                    IndicatorResult {
                        triggered: signal.triggered,
                        confidence: signal.confidence,
                        weight: self.config.weights.weight(*indicator),
                    },
                )
            })
            .collect();

        let fraud_score = self.weighted_score(&fraud_indicators);
        let risk_level = self.classify_risk(fraud_score);
        let (recommendation, reason) = recommend(risk_level, &fraud_indicators);

        log::debug!(
            "analyze: {} cardholder={} score={fraud_score:.3} level={risk_level}",
            transaction.transaction_id,
            transaction.cardholder_id,
        );
        if risk_level == RiskLevel::Critical {
            log::warn!(
                "analyze: {} classified CRITICAL (score={fraud_score:.3}), recommending {recommendation}",
                transaction.transaction_id,
            );
        }

        Ok(FraudAnalysisResult {
            transaction_id: transaction.transaction_id.clone(),
            cardholder_id: transaction.cardholder_id.clone(),
            fraud_score,
            risk_level,
            fraud_indicators,
            recommendation,
            recommendation_reason: reason.to_string(),
            details: TransactionDetails {
                transaction_amount: transaction.amount,
                merchant_name: transaction.merchant_name.clone(),
                merchant_category: transaction.merchant_category,
                transaction_type: transaction.transaction_type,
                country: transaction.country.clone(),
                timestamp: transaction.timestamp,
                rapid_tx_count: rapid_count,
                daily_tx_count: daily_count,
                impossible_travel_speed: speed,
            },
        })
    }

    /// Analyze each transaction in order against the same history.
    /// History is not updated between transactions.
    pub fn batch_analyze(
        &self,
        transactions: &[Transaction],
    ) -> FraudResult<Vec<FraudAnalysisResult>> {
        let results = transactions
            .iter()
            .map(|tx| self.analyze_transaction(tx))
            .collect::<FraudResult<Vec<_>>>()?;
        log::info!("batch: analyzed {} transactions", results.len());
        Ok(results)
    }

    /// Same output as `batch_analyze`, fanned out over `workers` threads.
    /// Results come back in input order.
    pub fn batch_analyze_parallel(
        &self,
        transactions: &[Transaction],
        workers: usize,
    ) -> FraudResult<Vec<FraudAnalysisResult>> {
        if transactions.is_empty() {
            return Ok(Vec::new());
        }
        let workers = workers.clamp(1, transactions.len());
        let chunk_size = transactions.len().div_ceil(workers);

        let chunks: Vec<FraudResult<Vec<FraudAnalysisResult>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = transactions
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|tx| self.analyze_transaction(tx))
                            .collect::<FraudResult<Vec<_>>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(FraudError::Other(anyhow::anyhow!("analysis worker panicked")))
                    })
                })
                .collect()
        });

        let mut results = Vec::with_capacity(transactions.len());
        for chunk in chunks {
            results.extend(chunk?);
        }
        log::info!(
            "batch: analyzed {} transactions on {workers} workers",
            results.len()
        );
        Ok(results)
    }

    pub fn generate_summary_report(&self, results: &[FraudAnalysisResult]) -> SummaryReport {
        SummaryReport::from_results(results)
    }

    /// Ascending threshold table; first match wins.
    pub fn classify_risk(&self, fraud_score: f64) -> RiskLevel {
        let t = &self.config.risk_thresholds;
        if fraud_score < t.medium {
            RiskLevel::Low
        } else if fraud_score < t.high {
            RiskLevel::Medium
        } else if fraud_score < t.critical {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Weighted mean of confidences, normalised by the total weight.
    fn weighted_score(&self, indicators: &BTreeMap<Indicator, IndicatorResult>) -> f64 {
        let total_weight: f64 = indicators.values().map(|r| r.weight).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let weighted_sum: f64 = indicators.values().map(|r| r.confidence * r.weight).sum();
        clamp_unit(weighted_sum / total_weight)
    }
}

fn recommend(
    level: RiskLevel,
    indicators: &BTreeMap<Indicator, IndicatorResult>,
) -> (Recommendation, &'static str) {
    let fired = |i: Indicator| indicators.get(&i).map(|r| r.triggered).unwrap_or(false);

    match level {
        RiskLevel::Critical => (
            Recommendation::BlockTransaction,
            "Multiple high-risk indicators detected",
        ),
        RiskLevel::High if fired(Indicator::ImpossibleTravel) => (
            Recommendation::RequireVerification,
            "Impossible travel detected",
        ),
        RiskLevel::High if fired(Indicator::RapidTransactions) => (
            Recommendation::RequireVerification,
            "Unusual transaction velocity",
        ),
        RiskLevel::High => (Recommendation::ReviewTransaction, "High fraud risk"),
        RiskLevel::Medium => (
            Recommendation::MonitorTransaction,
            "Multiple moderate risk factors",
        ),
        RiskLevel::Low => (Recommendation::ApproveTransaction, "Low fraud risk"),
    }
}

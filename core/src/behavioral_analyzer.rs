//! Behaviour: spending in an unusual merchant category or at a new merchant.

use crate::{
    config::BehavioralConfig,
    history::TransactionHistory,
    transaction::{MerchantCategory, Transaction},
    types::Signal,
};
use std::collections::{HashMap, HashSet};

pub struct BehavioralAnalyzer<'h> {
    history: &'h TransactionHistory,
    config: BehavioralConfig,
}

impl<'h> BehavioralAnalyzer<'h> {
    pub fn new(history: &'h TransactionHistory, config: BehavioralConfig) -> Self {
        Self { history, config }
    }

    /// Rarity of the candidate's merchant category in the cardholder's history.
    pub fn analyze_category_deviation(&self, candidate: &Transaction) -> Signal {
        let mut counts: HashMap<MerchantCategory, usize> = HashMap::new();
        let mut total = 0usize;
        for t in self.history.baseline_for(candidate) {
            *counts.entry(t.merchant_category).or_insert(0) += 1;
            total += 1;
        }

        if total < self.config.min_baseline.max(1) {
            return Signal::QUIET;
        }

        let seen = counts.get(&candidate.merchant_category).copied().unwrap_or(0);
        let frequency = seen as f64 / total as f64;
        if frequency < self.config.rare_frequency {
            Signal::new(true, 1.0 - frequency)
        } else {
            Signal::QUIET
        }
    }

    /// A merchant the cardholder has never paid before. Weak on its own.
    pub fn check_merchant_pattern(&self, candidate: &Transaction) -> Signal {
        let merchants: HashSet<&str> = self
            .history
            .baseline_for(candidate)
            .map(|t| t.merchant_name.as_str())
            .collect();

        if merchants.is_empty() || merchants.contains(candidate.merchant_name.as_str()) {
            return Signal::QUIET;
        }
        Signal::new(true, self.config.new_merchant_confidence)
    }
}

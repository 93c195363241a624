//! Append-only, per-cardholder transaction history.
//!
//! RULE: Transactions are stored once, in the cardholder's sequence.
//! The global index maps every transaction id to its slot in that
//! sequence, so the two views can never disagree.
//!
//! Insertion order is taken as chronological order; nothing is re-sorted.

use crate::{
    error::{FraudError, FraudResult},
    transaction::Transaction,
    types::{CardholderId, TransactionId},
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

/// Position of a transaction inside its cardholder's sequence.
#[derive(Debug, Clone)]
struct Slot {
    cardholder_id: CardholderId,
    position: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionHistory {
    by_cardholder: HashMap<CardholderId, Vec<Transaction>>,
    index: HashMap<TransactionId, Slot>,
    /// Global insertion order, for deterministic whole-history scans.
    log: Vec<TransactionId>,
}

impl TransactionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the cardholder's sequence and the global index.
    /// Structurally invalid transactions never enter the history.
    pub fn add_transaction(&mut self, tx: Transaction) -> FraudResult<()> {
        tx.validate()?;
        if self.index.contains_key(&tx.transaction_id) {
            return Err(FraudError::DuplicateTransaction {
                transaction_id: tx.transaction_id,
            });
        }

        let sequence = self.by_cardholder.entry(tx.cardholder_id.clone()).or_default();
        self.index.insert(
            tx.transaction_id.clone(),
            Slot {
                cardholder_id: tx.cardholder_id.clone(),
                position: sequence.len(),
            },
        );
        self.log.push(tx.transaction_id.clone());
        sequence.push(tx);
        Ok(())
    }

    /// The cardholder's transactions in recorded order. Empty if unknown.
    pub fn get_transactions_by_cardholder(&self, cardholder_id: &str) -> &[Transaction] {
        self.by_cardholder
            .get(cardholder_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Transactions with `start <= timestamp <= end`, in recorded order.
    pub fn get_transactions_in_timeframe(
        &self,
        cardholder_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&Transaction> {
        self.get_transactions_by_cardholder(cardholder_id)
            .iter()
            .filter(|t| start <= t.timestamp && t.timestamp <= end)
            .collect()
    }

    /// Flag a transaction as confirmed fraud.
    pub fn mark_fraud(&mut self, transaction_id: &str) -> FraudResult<()> {
        let slot = self
            .index
            .get(transaction_id)
            .ok_or_else(|| FraudError::NotFound {
                transaction_id: transaction_id.to_string(),
            })?;
        let tx = self
            .by_cardholder
            .get_mut(&slot.cardholder_id)
            .and_then(|seq| seq.get_mut(slot.position))
            .ok_or_else(|| FraudError::NotFound {
                transaction_id: transaction_id.to_string(),
            })?;
        tx.is_fraud = true;
        log::debug!("history: marked {transaction_id} as fraud");
        Ok(())
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        let slot = self.index.get(transaction_id)?;
        self.by_cardholder
            .get(&slot.cardholder_id)
            .and_then(|seq| seq.get(slot.position))
    }

    pub fn contains(&self, transaction_id: &str) -> bool {
        self.index.contains_key(transaction_id)
    }

    pub fn get_total_amount_by_cardholder(&self, cardholder_id: &str) -> f64 {
        self.get_transactions_by_cardholder(cardholder_id)
            .iter()
            .map(|t| t.amount)
            .sum()
    }

    /// Every transaction marked as fraud, in global insertion order.
    pub fn get_fraud_transactions(&self) -> Vec<&Transaction> {
        self.transactions().filter(|t| t.is_fraud).collect()
    }

    /// All transactions in global insertion order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.log.iter().filter_map(|id| self.get_transaction(id))
    }

    /// Countries the cardholder has transacted from, derived on demand.
    pub fn countries_seen(&self, cardholder_id: &str) -> BTreeSet<&str> {
        self.get_transactions_by_cardholder(cardholder_id)
            .iter()
            .map(|t| t.country.as_str())
            .collect()
    }

    /// Merchant names the cardholder has used, derived on demand.
    pub fn merchants_seen(&self, cardholder_id: &str) -> BTreeSet<&str> {
        self.get_transactions_by_cardholder(cardholder_id)
            .iter()
            .map(|t| t.merchant_name.as_str())
            .collect()
    }

    /// The cardholder's recorded transactions other than `candidate` itself.
    /// This is the baseline every detector measures a candidate against.
    pub fn baseline_for<'a>(
        &'a self,
        candidate: &'a Transaction,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.get_transactions_by_cardholder(&candidate.cardholder_id)
            .iter()
            .filter(move |t| t.transaction_id != candidate.transaction_id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn cardholder_count(&self) -> usize {
        self.by_cardholder.len()
    }
}

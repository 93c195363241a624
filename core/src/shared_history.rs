//! Thread-safe handle over a `TransactionHistory`.
//!
//! Single writer, many readers: analyses hold the read lock for their whole
//! run, so an in-flight `add_transaction` is never observed half-applied.
//! `analyze_and_record` holds the write lock across both steps, so a
//! cardholder's stream is scored and appended without interleaving.

use crate::{
    config::EngineConfig,
    engine::FraudAnalysisEngine,
    error::{FraudError, FraudResult},
    history::TransactionHistory,
    result::FraudAnalysisResult,
    transaction::Transaction,
};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    inner: Arc<RwLock<TransactionHistory>>,
}

impl SharedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(history: TransactionHistory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(history)),
        }
    }

    fn read(&self) -> FraudResult<RwLockReadGuard<'_, TransactionHistory>> {
        self.inner.read().map_err(|_| FraudError::LockPoisoned)
    }

    fn write(&self) -> FraudResult<RwLockWriteGuard<'_, TransactionHistory>> {
        self.inner.write().map_err(|_| FraudError::LockPoisoned)
    }

    pub fn add_transaction(&self, tx: Transaction) -> FraudResult<()> {
        self.write()?.add_transaction(tx)
    }

    pub fn mark_fraud(&self, transaction_id: &str) -> FraudResult<()> {
        self.write()?.mark_fraud(transaction_id)
    }

    /// Score against the history as it stands; nothing is recorded.
    pub fn analyze(
        &self,
        config: &EngineConfig,
        tx: &Transaction,
    ) -> FraudResult<FraudAnalysisResult> {
        let history = self.read()?;
        FraudAnalysisEngine::new(&history, config.clone())?.analyze_transaction(tx)
    }

    /// Score, then append, under one write lock.
    pub fn analyze_and_record(
        &self,
        config: &EngineConfig,
        tx: Transaction,
    ) -> FraudResult<FraudAnalysisResult> {
        let mut history = self.write()?;
        let result = FraudAnalysisEngine::new(&history, config.clone())?.analyze_transaction(&tx)?;
        history.add_transaction(tx)?;
        Ok(result)
    }

    /// Run `f` against a consistent view of the history.
    pub fn with_history<T>(&self, f: impl FnOnce(&TransactionHistory) -> T) -> FraudResult<T> {
        let history = self.read()?;
        Ok(f(&history))
    }

    /// Owned copy of the current history.
    pub fn snapshot(&self) -> FraudResult<TransactionHistory> {
        Ok(self.read()?.clone())
    }

    pub fn len(&self) -> FraudResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> FraudResult<bool> {
        Ok(self.read()?.is_empty())
    }
}

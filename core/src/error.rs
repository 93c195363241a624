use thiserror::Error;

#[derive(Error, Debug)]
pub enum FraudError {
    #[error("Invalid transaction: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Transaction '{transaction_id}' is already recorded")]
    DuplicateTransaction { transaction_id: String },

    #[error("Transaction '{transaction_id}' not found")]
    NotFound { transaction_id: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Transaction history lock poisoned")]
    LockPoisoned,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FraudError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type FraudResult<T> = Result<T, FraudError>;

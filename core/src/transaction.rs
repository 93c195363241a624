//! The payment event record and its closed enumerations.
//!
//! A `Transaction` is immutable once recorded, except for `is_fraud`,
//! which only `TransactionHistory::mark_fraud` sets after investigation.

use crate::{
    error::{FraudError, FraudResult},
    types::{CardholderId, TransactionId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Purchase,
    Withdrawal,
    Transfer,
    Online,
    International,
    Refund,
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::Online => "online",
            Self::International => "international",
            Self::Refund => "refund",
            Self::Other => "other",
        }
    }
}

impl From<String> for TransactionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "purchase" => Self::Purchase,
            "withdrawal" => Self::Withdrawal,
            "transfer" => Self::Transfer,
            "online" => Self::Online,
            "international" => Self::International,
            "refund" => Self::Refund,
            _ => Self::Other,
        }
    }
}

impl From<TransactionType> for String {
    fn from(t: TransactionType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Merchant classification. Unknown wire values decode to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MerchantCategory {
    Grocery,
    Restaurant,
    Retail,
    Gas,
    Utilities,
    Entertainment,
    Travel,
    OnlineRetail,
    CashAdvance,
    Electronics,
    Casino,
    Other,
}

impl MerchantCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grocery => "grocery",
            Self::Restaurant => "restaurant",
            Self::Retail => "retail",
            Self::Gas => "gas",
            Self::Utilities => "utilities",
            Self::Entertainment => "entertainment",
            Self::Travel => "travel",
            Self::OnlineRetail => "online_retail",
            Self::CashAdvance => "cash_advance",
            Self::Electronics => "electronics",
            Self::Casino => "casino",
            Self::Other => "other",
        }
    }
}

impl From<String> for MerchantCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "grocery" => Self::Grocery,
            "restaurant" => Self::Restaurant,
            "retail" => Self::Retail,
            "gas" | "gas_station" => Self::Gas,
            "utilities" => Self::Utilities,
            "entertainment" => Self::Entertainment,
            "travel" => Self::Travel,
            "online_retail" => Self::OnlineRetail,
            "cash_advance" => Self::CashAdvance,
            "electronics" => Self::Electronics,
            "casino" => Self::Casino,
            _ => Self::Other,
        }
    }
}

impl From<MerchantCategory> for String {
    fn from(c: MerchantCategory) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for MerchantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── Location ─────────────────────────────────────────────────────────────────

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> FraudResult<Self> {
        let loc = Self {
            latitude,
            longitude,
        };
        loc.validate()?;
        Ok(loc)
    }

    pub fn validate(&self) -> FraudResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(FraudError::validation(
                "location.latitude",
                format!("must be within [-90, 90], got {}", self.latitude),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(FraudError::validation(
                "location.longitude",
                format!("must be within [-180, 180], got {}", self.longitude),
            ));
        }
        Ok(())
    }
}

// ── Transaction ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub cardholder_id: CardholderId,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub merchant_name: String,
    pub merchant_category: MerchantCategory,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub mcc_code: String,
    pub country: String,
    #[serde(default)]
    pub is_fraud: bool,
}

impl Transaction {
    /// A purchase at an unnamed merchant with no location.
    /// Chain the `with_*` setters to fill in the rest.
    pub fn new(
        transaction_id: impl Into<TransactionId>,
        cardholder_id: impl Into<CardholderId>,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            cardholder_id: cardholder_id.into(),
            amount,
            timestamp,
            merchant_name: String::new(),
            merchant_category: MerchantCategory::Other,
            transaction_type: TransactionType::Purchase,
            location: None,
            mcc_code: String::new(),
            country: String::new(),
            is_fraud: false,
        }
    }

    pub fn with_merchant(mut self, name: impl Into<String>, category: MerchantCategory) -> Self {
        self.merchant_name = name.into();
        self.merchant_category = category;
        self
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(Location {
            latitude,
            longitude,
        });
        self
    }

    pub fn with_mcc(mut self, mcc_code: impl Into<String>) -> Self {
        self.mcc_code = mcc_code.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Structural checks run before any detector sees the transaction.
    pub fn validate(&self) -> FraudResult<()> {
        if self.transaction_id.trim().is_empty() {
            return Err(FraudError::validation("transaction_id", "must not be empty"));
        }
        if self.cardholder_id.trim().is_empty() {
            return Err(FraudError::validation("cardholder_id", "must not be empty"));
        }
        if !self.amount.is_finite() {
            return Err(FraudError::validation("amount", "must be a finite number"));
        }
        if self.amount < 0.0 {
            return Err(FraudError::validation(
                "amount",
                format!("must be non-negative, got {:.2}", self.amount),
            ));
        }
        if let Some(loc) = &self.location {
            loc.validate()?;
        }
        Ok(())
    }
}

//! fraudscore-core: per-cardholder transaction history, eight fraud
//! detectors and the engine that combines them into a risk decision.
//!
//! The core does no I/O. Callers hand it a `Transaction` and a history
//! and receive a `FraudAnalysisResult`; persistence, transport and
//! presentation live elsewhere.

pub mod anomaly_detector;
pub mod behavioral_analyzer;
pub mod config;
pub mod engine;
pub mod error;
pub mod geographic_analyzer;
pub mod history;
pub mod report;
pub mod result;
pub mod rng;
pub mod scenario;
pub mod shared_history;
pub mod transaction;
pub mod types;
pub mod velocity_checker;

pub use config::EngineConfig;
pub use engine::FraudAnalysisEngine;
pub use error::{FraudError, FraudResult};
pub use history::TransactionHistory;
pub use result::{FraudAnalysisResult, Recommendation, RiskLevel};
pub use shared_history::SharedHistory;
pub use transaction::{Location, MerchantCategory, Transaction, TransactionType};
pub use types::{Indicator, Signal};

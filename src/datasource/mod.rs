//! Ledger source abstraction for loading materialized transactions.

use crate::domain::Transaction;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod csv_ledger;
pub mod mock;

pub use csv_ledger::CsvLedgerSource;
pub use mock::MockLedgerSource;

/// Supplies the full transaction history of a portfolio.
///
/// Implementations return transactions in any order; the compiler groups and
/// sorts them before replay.
#[async_trait]
pub trait LedgerSource: Send + Sync + fmt::Debug {
    async fn load_transactions(&self) -> Result<Vec<Transaction>, LedgerSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerSourceError {
    #[error("io error: {0}")]
    Io(String),
    #[error("csv error: {0}")]
    Csv(String),
    #[error("invalid row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

//! Mock ledger source for testing without touching the filesystem.

use super::{LedgerSource, LedgerSourceError};
use crate::domain::Transaction;
use async_trait::async_trait;

/// Ledger source that returns predefined transactions.
#[derive(Debug, Clone, Default)]
pub struct MockLedgerSource {
    transactions: Vec<Transaction>,
}

impl MockLedgerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction(mut self, tx: Transaction) -> Self {
        self.transactions.push(tx);
        self
    }

    pub fn with_transactions(mut self, txs: Vec<Transaction>) -> Self {
        self.transactions.extend(txs);
        self
    }
}

#[async_trait]
impl LedgerSource for MockLedgerSource {
    async fn load_transactions(&self) -> Result<Vec<Transaction>, LedgerSourceError> {
        Ok(self.transactions.clone())
    }
}

//! Batch compilation of a whole ledger into disposal events.
//!
//! This module provides:
//! - Per-ticker grouping and deterministic replay ordering
//! - Sequential and parallel (one blocking task per ticker) runs
//! - Per-ticker failure isolation

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{BuyLot, Ticker, TradeDate};
use crate::engine::{upcoming_discounts, DiscountCandidate, TaxRules};
use crate::error::DataError;
use crate::report::EventLog;

pub mod batch;

pub use batch::Compiler;

/// A ticker whose replay was aborted. It contributes nothing to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerFailure {
    pub ticker: Ticker,
    pub error: DataError,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("replay worker failed: {0}")]
    Worker(String),
}

/// Outcome of one compilation run.
#[derive(Debug, Clone)]
pub struct CompileReport {
    /// Events of every successfully replayed ticker, grouped by ticker.
    pub log: EventLog,
    /// Lots still open per successfully replayed ticker.
    pub open_lots: BTreeMap<Ticker, Vec<BuyLot>>,
    pub failures: Vec<TickerFailure>,
    pub rules: TaxRules,
}

impl CompileReport {
    pub fn run_id(&self) -> Uuid {
        self.log.run_id()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_for(&self, ticker: &Ticker) -> Option<&TickerFailure> {
        self.failures.iter().find(|f| &f.ticker == ticker)
    }

    /// Tickers that replayed without error.
    pub fn compiled_tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.open_lots.keys()
    }

    pub fn open_lots_for(&self, ticker: &Ticker) -> &[BuyLot] {
        self.open_lots.get(ticker).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Open lots across all tickers that become discount-eligible after `as_of`.
    pub fn upcoming_discounts(
        &self,
        as_of: TradeDate,
        lookback_days: u64,
    ) -> Vec<DiscountCandidate> {
        upcoming_discounts(
            self.open_lots.values().flatten(),
            &self.rules,
            as_of,
            lookback_days,
        )
    }
}

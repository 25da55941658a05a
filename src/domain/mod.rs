//! Domain types and determinism layer for the tax-lot ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TradeDate, Ticker, Side
//! - Transaction, BuyLot, GainFragment and DisposalEvent records
//! - Stable transaction ordering for deterministic replay
//! - Financial-year and period windows for reporting

pub mod decimal;
pub mod gain;
pub mod lot;
pub mod ordering;
pub mod period;
pub mod primitives;
pub mod transaction;

pub use decimal::Decimal;
pub use gain::{DisposalEvent, GainFragment};
pub use lot::BuyLot;
pub use ordering::{is_replay_ordered, sort_transactions_deterministic, TransactionOrderingKey};
pub use period::{FinancialYear, Period, MAX_FINANCIAL_YEAR, MIN_FINANCIAL_YEAR};
pub use primitives::{Side, Ticker, TradeDate};
pub use transaction::{Transaction, MAX_TRANSACTION_AMOUNT};

//! Pure computation engine for LIFO tax-lot matching.

use crate::domain::{BuyLot, DisposalEvent, Ticker};

pub mod discounts;
pub mod gain_calculator;
pub mod lot_queue;
pub mod matcher;

pub use discounts::{upcoming_discounts, DiscountCandidate};
pub use gain_calculator::{DisposalLeg, GainCalculator, TaxRules};
pub use lot_queue::{LotQueue, LotQueueError};
pub use matcher::{EngineState, MatchingEngine};

/// Everything one security's replay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerOutcome {
    pub ticker: Ticker,
    /// One event per disposal, in replay order.
    pub events: Vec<DisposalEvent>,
    /// Lots still open after the last transaction, oldest first.
    pub open_lots: Vec<BuyLot>,
}

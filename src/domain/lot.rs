//! Open acquisition lots.

use crate::domain::{Decimal, Ticker, TradeDate, Transaction};
use serde::{Deserialize, Serialize};

/// A tranche of units acquired in a single transaction, tracked until fully
/// disposed.
///
/// `remaining_volume` and `remaining_brokerage` only ever decrease; brokerage
/// leaves the lot as slices are attributed to disposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyLot {
    /// Key of the acquisition transaction that opened this lot.
    pub buy_tx_key: String,
    pub date: TradeDate,
    pub ticker: Ticker,
    pub original_volume: Decimal,
    pub remaining_volume: Decimal,
    pub unit_price_with_costs: Decimal,
    pub original_brokerage: Decimal,
    /// Brokerage not yet attributed to a disposal.
    pub remaining_brokerage: Decimal,
}

impl BuyLot {
    pub fn from_acquisition(tx: &Transaction) -> Self {
        let volume = tx.volume();
        BuyLot {
            buy_tx_key: tx.tx_key().to_string(),
            date: tx.date,
            ticker: tx.ticker.clone(),
            original_volume: volume,
            remaining_volume: volume,
            unit_price_with_costs: tx.unit_price_with_costs,
            original_brokerage: tx.brokerage,
            remaining_brokerage: tx.brokerage,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        !self.remaining_volume.is_positive()
    }

    /// Cost basis of the units still open.
    pub fn remaining_cost(&self) -> Decimal {
        self.remaining_volume * self.unit_price_with_costs
    }

    /// Detach the brokerage share for `matched` units, pro-rated against the
    /// volume still open. Taking the whole remaining volume takes exactly the
    /// remaining brokerage. `None` if the allocation overflows.
    pub fn take_brokerage(&mut self, matched: Decimal) -> Option<Decimal> {
        let share = self
            .remaining_brokerage
            .checked_pro_rata(matched, self.remaining_volume)?;
        self.remaining_brokerage -= share;
        Some(share)
    }

    pub(crate) fn reduce_volume(&mut self, volume: Decimal) {
        self.remaining_volume -= volume;
    }
}

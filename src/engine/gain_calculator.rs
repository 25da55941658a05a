use crate::domain::{BuyLot, Decimal, GainFragment, TradeDate, Transaction};
use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// Long-term discount parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRules {
    /// A holding must exceed this many days to be discounted.
    pub discount_threshold_days: u32,
    /// Discounted gains are divided by this.
    pub discount_divisor: Decimal,
}

impl Default for TaxRules {
    fn default() -> Self {
        Self {
            discount_threshold_days: 365,
            discount_divisor: Decimal::from_i64(2),
        }
    }
}

impl TaxRules {
    /// Only positive gains held past the threshold are discounted.
    pub fn is_discountable(&self, held_days: i64, pretax_gain: Decimal) -> bool {
        held_days > i64::from(self.discount_threshold_days) && pretax_gain.is_positive()
    }

    /// First disposal date on which a lot bought on `buy_date` qualifies.
    pub fn discount_eligible_from(&self, buy_date: TradeDate) -> Option<TradeDate> {
        buy_date.checked_add_days(u64::from(self.discount_threshold_days) + 1)
    }
}

/// The disposal side of a match, tracking what is still unmatched.
#[derive(Debug)]
pub struct DisposalLeg<'a> {
    tx: &'a Transaction,
    remaining_volume: Decimal,
    remaining_brokerage: Decimal,
}

impl<'a> DisposalLeg<'a> {
    pub fn new(tx: &'a Transaction) -> Self {
        Self {
            tx,
            remaining_volume: tx.volume(),
            remaining_brokerage: tx.brokerage,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        self.tx
    }

    pub fn remaining_volume(&self) -> Decimal {
        self.remaining_volume
    }

    /// Brokerage share for `matched` units; the final slice takes the rest.
    fn take(&mut self, matched: Decimal) -> Option<Decimal> {
        let share = self
            .remaining_brokerage
            .checked_pro_rata(matched, self.remaining_volume)?;
        self.remaining_brokerage -= share;
        self.remaining_volume -= matched;
        Some(share)
    }
}

/// Computes the gain for one matched (lot slice, disposal) pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct GainCalculator {
    rules: TaxRules,
}

impl GainCalculator {
    pub fn new(rules: TaxRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TaxRules {
        &self.rules
    }

    /// Price `matched_volume` units of `lot` against `sale`.
    ///
    /// Moves the slice's brokerage out of the lot and the disposal leg; the
    /// caller is responsible for reducing the lot's volume afterwards.
    ///
    /// # Errors
    /// Returns `MalformedTransaction` if any amount overflows the decimal
    /// range. The lot and leg may be partly updated when that happens.
    pub fn compute(
        &self,
        lot: &mut BuyLot,
        sale: &mut DisposalLeg<'_>,
        matched_volume: Decimal,
    ) -> Result<GainFragment, DataError> {
        let sell = sale.tx;
        let overflow = || {
            DataError::malformed(
                &sell.ticker,
                format!("amount overflow pricing disposal on {}", sell.date),
            )
        };

        let buy_value = matched_volume
            .checked_mul(lot.unit_price_with_costs)
            .ok_or_else(overflow)?;
        let sell_value = matched_volume
            .checked_mul(sell.unit_price_with_costs)
            .ok_or_else(overflow)?;
        let pretax_gain = sell_value.checked_sub(buy_value).ok_or_else(overflow)?;

        let held_days = lot.date.days_until(sell.date);
        let discounted = self.rules.is_discountable(held_days, pretax_gain);
        let taxable_before_costs = if discounted {
            pretax_gain
                .checked_div(self.rules.discount_divisor)
                .ok_or_else(overflow)?
        } else {
            pretax_gain
        };

        let buy_brokerage_allocated = lot.take_brokerage(matched_volume).ok_or_else(overflow)?;
        let sell_brokerage_allocated = sale.take(matched_volume).ok_or_else(overflow)?;
        let brokerage_allocated = buy_brokerage_allocated
            .checked_add(sell_brokerage_allocated)
            .ok_or_else(overflow)?;
        let taxable_gain = taxable_before_costs
            .checked_sub(brokerage_allocated)
            .ok_or_else(overflow)?;

        Ok(GainFragment {
            ticker: sell.ticker.clone(),
            sell_date: sell.date,
            buy_date: lot.date,
            sell_tx_key: sell.tx_key().to_string(),
            buy_tx_key: lot.buy_tx_key.clone(),
            matched_volume,
            buy_unit_cost: lot.unit_price_with_costs,
            sell_unit_price: sell.unit_price_with_costs,
            held_days,
            discounted,
            pretax_gain,
            taxable_gain,
            buy_brokerage_allocated,
            sell_brokerage_allocated,
            brokerage_allocated,
        })
    }
}

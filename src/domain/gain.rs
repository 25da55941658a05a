//! Realized gain records: per-lot fragments and per-disposal events.

use crate::domain::{Decimal, Ticker, TradeDate, Transaction};
use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// The outcome of matching one slice of a buy lot against one disposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainFragment {
    pub ticker: Ticker,
    pub sell_date: TradeDate,
    pub buy_date: TradeDate,
    pub sell_tx_key: String,
    pub buy_tx_key: String,
    pub matched_volume: Decimal,
    /// Effective per-unit acquisition cost of the lot.
    pub buy_unit_cost: Decimal,
    /// Effective per-unit disposal price.
    pub sell_unit_price: Decimal,
    pub held_days: i64,
    /// Whether the long-term discount was applied.
    pub discounted: bool,
    pub pretax_gain: Decimal,
    pub taxable_gain: Decimal,
    pub buy_brokerage_allocated: Decimal,
    pub sell_brokerage_allocated: Decimal,
    /// Both legs combined.
    pub brokerage_allocated: Decimal,
}

/// One disposal transaction's complete tax outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalEvent {
    pub event_key: String,
    pub ticker: Ticker,
    pub date: TradeDate,
    pub sell_tx_key: String,
    pub volume_sold: Decimal,
    pub total_pretax_gain: Decimal,
    pub total_taxable_gain: Decimal,
    /// Most recent acquisition first.
    pub fragments: Vec<GainFragment>,
}

impl DisposalEvent {
    /// Build the event for `sell` from its fragments; totals are exact sums.
    ///
    /// # Errors
    /// Returns `MalformedTransaction` if a total overflows the decimal range.
    pub fn from_fragments(
        sell: &Transaction,
        fragments: Vec<GainFragment>,
    ) -> Result<Self, DataError> {
        let overflow = || {
            DataError::malformed(
                &sell.ticker,
                format!("gain total overflow for disposal on {}", sell.date),
            )
        };
        let total_pretax_gain =
            Decimal::checked_sum(fragments.iter().map(|f| f.pretax_gain)).ok_or_else(overflow)?;
        let total_taxable_gain =
            Decimal::checked_sum(fragments.iter().map(|f| f.taxable_gain)).ok_or_else(overflow)?;
        let event_key = Self::compute_event_key(
            sell.tx_key(),
            &fragments,
            &total_pretax_gain,
            &total_taxable_gain,
        );

        Ok(DisposalEvent {
            event_key,
            ticker: sell.ticker.clone(),
            date: sell.date,
            sell_tx_key: sell.tx_key().to_string(),
            volume_sold: sell.volume(),
            total_pretax_gain,
            total_taxable_gain,
            fragments,
        })
    }

    fn compute_event_key(
        sell_tx_key: &str,
        fragments: &[GainFragment],
        total_pretax_gain: &Decimal,
        total_taxable_gain: &Decimal,
    ) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(sell_tx_key);
        for fragment in fragments {
            hasher.update(fragment.buy_tx_key.as_bytes());
            hasher.update(fragment.matched_volume.to_canonical_string());
        }
        hasher.update(total_pretax_gain.to_canonical_string());
        hasher.update(total_taxable_gain.to_canonical_string());
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    /// Number of buy lots that contributed to this disposal.
    pub fn lots_matched(&self) -> usize {
        self.fragments.len()
    }

    pub fn matched_volume(&self) -> Decimal {
        self.fragments.iter().map(|f| f.matched_volume).sum()
    }

    pub fn brokerage_allocated(&self) -> Decimal {
        self.fragments.iter().map(|f| f.brokerage_allocated).sum()
    }
}

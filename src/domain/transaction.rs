//! Transaction type representing a single ledger entry for one security.

use crate::domain::{Decimal, Side, Ticker, TradeDate};
use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// Largest volume, unit price or brokerage a ledger row may carry.
///
/// Keeps every product and total the engine forms inside the decimal range.
pub const MAX_TRANSACTION_AMOUNT: i64 = 1_000_000_000_000;

/// One acquisition or disposal of a security.
///
/// Immutable once built by the loader; the sign of `signed_volume` carries the
/// direction (positive = acquisition, negative = disposal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Stable content key for this transaction.
    pub tx_key: String,
    pub date: TradeDate,
    pub ticker: Ticker,
    pub signed_volume: Decimal,
    /// Price per unit excluding costs.
    pub unit_price: Decimal,
    /// Effective price per unit including brokerage.
    pub unit_price_with_costs: Decimal,
    pub brokerage: Decimal,
}

impl Transaction {
    pub fn new(
        date: TradeDate,
        ticker: Ticker,
        signed_volume: Decimal,
        unit_price: Decimal,
        unit_price_with_costs: Decimal,
        brokerage: Decimal,
    ) -> Self {
        let tx_key = Self::compute_tx_key(
            &ticker,
            date,
            &signed_volume,
            &unit_price,
            &unit_price_with_costs,
            &brokerage,
        );
        Transaction {
            tx_key,
            date,
            ticker,
            signed_volume,
            unit_price,
            unit_price_with_costs,
            brokerage,
        }
    }

    /// Hash of the canonical field values, so identical input rows always
    /// produce identical keys across runs.
    pub fn compute_tx_key(
        ticker: &Ticker,
        date: TradeDate,
        signed_volume: &Decimal,
        unit_price: &Decimal,
        unit_price_with_costs: &Decimal,
        brokerage: &Decimal,
    ) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(ticker.as_str());
        hasher.update(date.to_string());
        hasher.update(signed_volume.to_canonical_string());
        hasher.update(unit_price.to_canonical_string());
        hasher.update(unit_price_with_costs.to_canonical_string());
        hasher.update(brokerage.to_canonical_string());
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    pub fn tx_key(&self) -> &str {
        &self.tx_key
    }

    pub fn side(&self) -> Side {
        if self.signed_volume.is_positive() {
            Side::Acquisition
        } else {
            Side::Disposal
        }
    }

    pub fn is_acquisition(&self) -> bool {
        self.side() == Side::Acquisition
    }

    /// Unsigned volume.
    pub fn volume(&self) -> Decimal {
        self.signed_volume.abs()
    }

    /// Check the per-row invariants the matching engine relies on.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.signed_volume.is_zero() {
            return Err(DataError::malformed(
                &self.ticker,
                format!("zero volume on {}", self.date),
            ));
        }
        if self.unit_price.is_negative() || self.unit_price_with_costs.is_negative() {
            return Err(DataError::malformed(
                &self.ticker,
                format!("negative price on {}", self.date),
            ));
        }
        if self.brokerage.is_negative() {
            return Err(DataError::malformed(
                &self.ticker,
                format!("negative brokerage on {}", self.date),
            ));
        }
        let limit = Decimal::from_i64(MAX_TRANSACTION_AMOUNT);
        let amounts = [
            self.volume(),
            self.unit_price,
            self.unit_price_with_costs,
            self.brokerage,
        ];
        if amounts.iter().any(|amount| *amount > limit) {
            return Err(DataError::malformed(
                &self.ticker,
                format!("amount above {} on {}", limit, self.date),
            ));
        }
        Ok(())
    }
}

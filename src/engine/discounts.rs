//! Open lots approaching the long-term discount threshold.

use crate::domain::{BuyLot, Decimal, Ticker, TradeDate};
use serde::Serialize;

use super::TaxRules;

/// An open lot that would become discount-eligible if held a little longer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCandidate {
    pub ticker: Ticker,
    pub buy_date: TradeDate,
    pub buy_tx_key: String,
    pub remaining_volume: Decimal,
    pub remaining_cost: Decimal,
    /// First disposal date that qualifies for the discount.
    pub eligible_from: TradeDate,
    pub days_remaining: i64,
}

/// Open lots bought within the trailing `lookback_days` of `as_of` that are
/// not yet discount-eligible, soonest first.
pub fn upcoming_discounts<'a>(
    open_lots: impl IntoIterator<Item = &'a BuyLot>,
    rules: &TaxRules,
    as_of: TradeDate,
    lookback_days: u64,
) -> Vec<DiscountCandidate> {
    let earliest = as_of.checked_sub_days(lookback_days);

    let mut candidates: Vec<DiscountCandidate> = open_lots
        .into_iter()
        .filter(|lot| !lot.is_exhausted())
        .filter(|lot| earliest.map_or(true, |e| lot.date >= e))
        .filter_map(|lot| {
            let eligible_from = rules.discount_eligible_from(lot.date)?;
            if eligible_from <= as_of {
                return None;
            }
            Some(DiscountCandidate {
                ticker: lot.ticker.clone(),
                buy_date: lot.date,
                buy_tx_key: lot.buy_tx_key.clone(),
                remaining_volume: lot.remaining_volume,
                remaining_cost: lot.remaining_cost(),
                eligible_from,
                days_remaining: as_of.days_until(eligible_from),
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.eligible_from
            .cmp(&b.eligible_from)
            .then_with(|| a.ticker.cmp(&b.ticker))
            .then_with(|| a.buy_tx_key.cmp(&b.buy_tx_key))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Transaction;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn lot(ticker: &str, date: TradeDate, volume: &str) -> BuyLot {
        BuyLot::from_acquisition(&Transaction::new(
            date,
            Ticker::new(ticker),
            d(volume),
            d("10"),
            d("10"),
            Decimal::zero(),
        ))
    }

    fn date(y: i32, m: u32, day: u32) -> TradeDate {
        TradeDate::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_lists_lots_not_yet_eligible() {
        let lots = vec![
            lot("VAS", date(2021, 3, 1), "10"),
            lot("CBA", date(2021, 2, 1), "5"),
        ];
        let as_of = date(2021, 6, 1);

        let out = upcoming_discounts(&lots, &TaxRules::default(), as_of, 365);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].ticker.as_str(), "CBA");
        assert_eq!(out[0].eligible_from, date(2022, 2, 2));
        assert_eq!(out[1].ticker.as_str(), "VAS");
        assert_eq!(out[1].days_remaining, as_of.days_until(date(2022, 3, 2)));
        assert_eq!(out[1].remaining_cost, d("100"));
    }

    #[test]
    fn test_skips_already_eligible_and_out_of_lookback() {
        let lots = vec![
            lot("OLD", date(2019, 1, 1), "10"),
            lot("NEW", date(2021, 5, 1), "10"),
        ];
        let out = upcoming_discounts(&lots, &TaxRules::default(), date(2021, 6, 1), 365);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ticker.as_str(), "NEW");
    }

    #[test]
    fn test_empty_when_no_open_lots() {
        let lots: Vec<BuyLot> = Vec::new();
        assert!(upcoming_discounts(&lots, &TaxRules::default(), date(2021, 6, 1), 365).is_empty());
    }
}

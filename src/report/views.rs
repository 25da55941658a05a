//! Row types returned by event log queries.

use crate::domain::{Decimal, DisposalEvent, GainFragment, Ticker, TradeDate};
use serde::Serialize;

/// Per-ticker totals for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerSummary {
    pub ticker: Ticker,
    pub disposals: usize,
    pub volume_sold: Decimal,
    pub total_pretax_gain: Decimal,
    pub total_taxable_gain: Decimal,
}

impl TickerSummary {
    pub(crate) fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            disposals: 0,
            volume_sold: Decimal::zero(),
            total_pretax_gain: Decimal::zero(),
            total_taxable_gain: Decimal::zero(),
        }
    }

    pub(crate) fn add(&mut self, event: &DisposalEvent) {
        self.disposals += 1;
        self.volume_sold += event.volume_sold;
        self.total_pretax_gain += event.total_pretax_gain;
        self.total_taxable_gain += event.total_taxable_gain;
    }
}

/// One disposal in a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    pub event_key: String,
    pub ticker: Ticker,
    pub date: TradeDate,
    pub volume_sold: Decimal,
    pub total_pretax_gain: Decimal,
    pub total_taxable_gain: Decimal,
    /// Number of buy lots the disposal consumed.
    pub lots_matched: usize,
}

impl From<&DisposalEvent> for EventRow {
    fn from(event: &DisposalEvent) -> Self {
        Self {
            event_key: event.event_key.clone(),
            ticker: event.ticker.clone(),
            date: event.date,
            volume_sold: event.volume_sold,
            total_pretax_gain: event.total_pretax_gain,
            total_taxable_gain: event.total_taxable_gain,
            lots_matched: event.lots_matched(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PeriodRows {
    Summary(Vec<TickerSummary>),
    Events(Vec<EventRow>),
}

impl PeriodRows {
    pub fn len(&self) -> usize {
        match self {
            PeriodRows::Summary(rows) => rows.len(),
            PeriodRows::Events(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a period query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodView {
    pub start: TradeDate,
    pub end: TradeDate,
    pub summary: bool,
    pub rows: PeriodRows,
    pub total_pretax_gain: Decimal,
    pub total_taxable_gain: Decimal,
}

/// A gain fragment joined with its disposal's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub ticker: Ticker,
    pub sell_date: TradeDate,
    pub sell_tx_key: String,
    pub sell_volume: Decimal,
    pub sell_unit_price: Decimal,
    pub buy_date: TradeDate,
    pub buy_tx_key: String,
    pub buy_unit_cost: Decimal,
    pub matched_volume: Decimal,
    pub held_days: i64,
    pub discounted: bool,
    pub pretax_gain: Decimal,
    pub taxable_gain: Decimal,
    pub buy_brokerage_allocated: Decimal,
    pub sell_brokerage_allocated: Decimal,
}

impl DetailRow {
    pub(crate) fn new(event: &DisposalEvent, fragment: &GainFragment) -> Self {
        Self {
            ticker: fragment.ticker.clone(),
            sell_date: fragment.sell_date,
            sell_tx_key: fragment.sell_tx_key.clone(),
            sell_volume: event.volume_sold,
            sell_unit_price: fragment.sell_unit_price,
            buy_date: fragment.buy_date,
            buy_tx_key: fragment.buy_tx_key.clone(),
            buy_unit_cost: fragment.buy_unit_cost,
            matched_volume: fragment.matched_volume,
            held_days: fragment.held_days,
            discounted: fragment.discounted,
            pretax_gain: fragment.pretax_gain,
            taxable_gain: fragment.taxable_gain,
            buy_brokerage_allocated: fragment.buy_brokerage_allocated,
            sell_brokerage_allocated: fragment.sell_brokerage_allocated,
        }
    }
}

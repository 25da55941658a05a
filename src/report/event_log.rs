use std::cmp::Reverse;
use std::collections::BTreeMap;

use uuid::Uuid;

use crate::domain::{Decimal, DisposalEvent, FinancialYear, Period, Ticker, TradeDate};
use crate::error::QueryError;

use super::views::{DetailRow, EventRow, PeriodRows, PeriodView, TickerSummary};

/// Disposal events of one computation run.
///
/// Each run starts from a fresh log with its own `run_id`; parallel workers
/// fill separate logs that are merged once every ticker has finished.
#[derive(Debug, Clone)]
pub struct EventLog {
    run_id: Uuid,
    events: Vec<DisposalEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            events: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record(&mut self, event: DisposalEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = DisposalEvent>) {
        self.events.extend(events);
    }

    /// Append another log's events, keeping this log's run id.
    pub fn merge(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Drop all events and start a new run.
    pub fn reset(&mut self) {
        self.run_id = Uuid::new_v4();
        self.events.clear();
    }

    pub fn events(&self) -> &[DisposalEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events dated inside `period`, in recorded order.
    pub fn events_in<'a>(
        &'a self,
        period: &'a Period,
    ) -> impl Iterator<Item = &'a DisposalEvent> {
        self.events.iter().filter(|e| period.contains(e.date))
    }

    /// Disposals dated in `[start, end]`, either one row per disposal ordered
    /// by date or, with `summary`, one row per ticker.
    pub fn period_view(
        &self,
        start: TradeDate,
        end: TradeDate,
        summary: bool,
    ) -> Result<PeriodView, QueryError> {
        let period = Period::new(start, end)?;
        Ok(self.view(&period, summary))
    }

    pub fn financial_year_view(&self, fy: FinancialYear, summary: bool) -> PeriodView {
        self.view(&fy.period(), summary)
    }

    fn view(&self, period: &Period, summary: bool) -> PeriodView {
        let mut total_pretax_gain = Decimal::zero();
        let mut total_taxable_gain = Decimal::zero();
        for event in self.events_in(period) {
            total_pretax_gain += event.total_pretax_gain;
            total_taxable_gain += event.total_taxable_gain;
        }

        let rows = if summary {
            let mut by_ticker: BTreeMap<Ticker, TickerSummary> = BTreeMap::new();
            for event in self.events_in(period) {
                by_ticker
                    .entry(event.ticker.clone())
                    .or_insert_with(|| TickerSummary::empty(event.ticker.clone()))
                    .add(event);
            }
            PeriodRows::Summary(by_ticker.into_values().collect())
        } else {
            let mut rows: Vec<EventRow> = self.events_in(period).map(EventRow::from).collect();
            rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.ticker.cmp(&b.ticker)));
            PeriodRows::Events(rows)
        };

        PeriodView {
            start: period.start,
            end: period.end,
            summary,
            rows,
            total_pretax_gain,
            total_taxable_gain,
        }
    }

    /// Every fragment for `ticker`, ordered by sell date then buy date
    /// descending.
    pub fn detail_view(&self, ticker: &Ticker) -> Vec<DetailRow> {
        let mut rows: Vec<DetailRow> = self
            .events
            .iter()
            .filter(|e| &e.ticker == ticker)
            .flat_map(|e| e.fragments.iter().map(move |f| DetailRow::new(e, f)))
            .collect();
        rows.sort_by_key(|r| (r.sell_date, Reverse(r.buy_date)));
        rows
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GainFragment, Transaction};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn date(y: i32, m: u32, day: u32) -> TradeDate {
        TradeDate::from_ymd(y, m, day).unwrap()
    }

    fn fragment(sell: &Transaction, buy_date: TradeDate, volume: &str, gain: &str) -> GainFragment {
        GainFragment {
            ticker: sell.ticker.clone(),
            sell_date: sell.date,
            buy_date,
            sell_tx_key: sell.tx_key().to_string(),
            buy_tx_key: format!("hash:{}", buy_date),
            matched_volume: d(volume),
            buy_unit_cost: d("10"),
            sell_unit_price: d("11"),
            held_days: buy_date.days_until(sell.date),
            discounted: false,
            pretax_gain: d(gain),
            taxable_gain: d(gain),
            buy_brokerage_allocated: Decimal::zero(),
            sell_brokerage_allocated: Decimal::zero(),
            brokerage_allocated: Decimal::zero(),
        }
    }

    fn event(
        ticker: &str,
        sell_date: TradeDate,
        gains: &[(TradeDate, &str, &str)],
    ) -> DisposalEvent {
        let volume: Decimal = gains.iter().map(|(_, v, _)| d(v)).sum();
        let sell = Transaction::new(
            sell_date,
            Ticker::new(ticker),
            -volume,
            d("11"),
            d("11"),
            Decimal::zero(),
        );
        let fragments = gains
            .iter()
            .map(|(buy_date, v, g)| fragment(&sell, *buy_date, v, g))
            .collect();
        DisposalEvent::from_fragments(&sell, fragments).unwrap()
    }

    fn sample_log() -> EventLog {
        let mut log = EventLog::new();
        log.record(event("VAS", date(2020, 8, 1), &[(date(2020, 7, 1), "10", "10")]));
        log.record(event("VAS", date(2021, 2, 1), &[(date(2020, 7, 1), "5", "-3")]));
        log.record(event("CBA", date(2020, 9, 1), &[(date(2020, 7, 2), "2", "4")]));
        log.record(event("CBA", date(2021, 8, 1), &[(date(2020, 7, 2), "1", "100")]));
        log
    }

    #[test]
    fn test_period_view_detail_rows_in_date_order() {
        let log = sample_log();
        let view = log
            .period_view(date(2020, 7, 1), date(2021, 6, 30), false)
            .unwrap();

        match &view.rows {
            PeriodRows::Events(rows) => {
                let dates: Vec<TradeDate> = rows.iter().map(|r| r.date).collect();
                assert_eq!(dates, vec![date(2020, 8, 1), date(2020, 9, 1), date(2021, 2, 1)]);
            }
            PeriodRows::Summary(_) => panic!("expected event rows"),
        }
        assert_eq!(view.total_pretax_gain, d("11"));
    }

    #[test]
    fn test_period_view_summary_groups_by_ticker() {
        let log = sample_log();
        let view = log
            .period_view(date(2020, 7, 1), date(2021, 6, 30), true)
            .unwrap();

        match &view.rows {
            PeriodRows::Summary(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].ticker.as_str(), "CBA");
                assert_eq!(rows[0].total_taxable_gain, d("4"));
                assert_eq!(rows[1].ticker.as_str(), "VAS");
                assert_eq!(rows[1].disposals, 2);
                assert_eq!(rows[1].total_pretax_gain, d("7"));
                assert_eq!(rows[1].volume_sold, d("15"));
            }
            PeriodRows::Events(_) => panic!("expected summary rows"),
        }
        assert_eq!(view.total_taxable_gain, d("11"));
    }

    #[test]
    fn test_period_view_rejects_inverted_window() {
        let log = sample_log();
        let err = log
            .period_view(date(2021, 1, 1), date(2020, 1, 1), true)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_financial_year_view_matches_period_view() {
        let log = sample_log();
        let fy = FinancialYear::new(2022).unwrap();
        let via_fy = log.financial_year_view(fy, true);
        let via_period = log.period_view(fy.start(), fy.end(), true).unwrap();
        assert_eq!(via_fy, via_period);
        assert_eq!(via_fy.total_pretax_gain, d("100"));
    }

    #[test]
    fn test_empty_period_has_zero_totals() {
        let log = sample_log();
        let view = log
            .period_view(date(2016, 1, 1), date(2016, 12, 31), true)
            .unwrap();
        assert!(view.rows.is_empty());
        assert!(view.total_pretax_gain.is_zero());
    }

    #[test]
    fn test_detail_view_orders_by_sell_then_buy_desc() {
        let mut log = EventLog::new();
        log.record(event(
            "VAS",
            date(2021, 3, 1),
            &[(date(2021, 2, 1), "5", "1"), (date(2021, 1, 1), "5", "2")],
        ));
        log.record(event("VAS", date(2021, 1, 15), &[(date(2021, 1, 1), "1", "1")]));
        log.record(event("CBA", date(2021, 1, 15), &[(date(2021, 1, 1), "1", "1")]));

        let rows = log.detail_view(&Ticker::new("VAS"));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].sell_date, date(2021, 1, 15));
        assert_eq!(rows[1].buy_date, date(2021, 2, 1));
        assert_eq!(rows[2].buy_date, date(2021, 1, 1));
        assert_eq!(rows[1].sell_volume, d("10"));
    }

    #[test]
    fn test_detail_view_unknown_ticker_is_empty() {
        assert!(sample_log().detail_view(&Ticker::new("XYZ")).is_empty());
    }

    #[test]
    fn test_merge_and_reset() {
        let mut log = sample_log();
        let run_id = log.run_id();
        let mut other = EventLog::new();
        other.record(event("NAB", date(2021, 1, 1), &[(date(2020, 12, 1), "1", "1")]));

        log.merge(other);
        assert_eq!(log.len(), 5);
        assert_eq!(log.run_id(), run_id);

        log.reset();
        assert!(log.is_empty());
        assert_ne!(log.run_id(), run_id);
    }

    #[test]
    fn test_period_view_serializes_camel_case() {
        let view = sample_log()
            .period_view(date(2020, 7, 1), date(2021, 6, 30), true)
            .unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("totalTaxableGain").is_some());
        assert!(json["rows"][0].get("totalPretaxGain").is_some());
    }
}

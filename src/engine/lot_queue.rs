use crate::domain::{BuyLot, Decimal, Ticker};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotQueueError {
    #[error("disposal without matching acquisition")]
    Empty,
    #[error("cannot consume {requested} from a lot with {available} remaining")]
    Overdraw {
        requested: Decimal,
        available: Decimal,
    },
    #[error("lot rejected: {0}")]
    Rejected(String),
}

/// LIFO stack of open buy lots for a single security.
///
/// The top of the stack is the most recently pushed lot. A lot whose
/// remaining volume reaches zero stays on the stack until the next
/// [`peek_top`](LotQueue::peek_top), which discards it.
#[derive(Debug, Clone)]
pub struct LotQueue {
    ticker: Ticker,
    lots: Vec<BuyLot>,
}

impl LotQueue {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            lots: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Push a newly replayed acquisition onto the top of the stack.
    pub fn push(&mut self, lot: BuyLot) -> Result<(), LotQueueError> {
        if !lot.remaining_volume.is_positive() {
            return Err(LotQueueError::Rejected(format!(
                "lot from {} has no remaining volume",
                lot.date
            )));
        }
        if lot.ticker != self.ticker {
            return Err(LotQueueError::Rejected(format!(
                "lot for {} pushed onto {} queue",
                lot.ticker, self.ticker
            )));
        }
        self.lots.push(lot);
        Ok(())
    }

    /// Most recent lot with volume left, discarding exhausted lots above it.
    pub fn peek_top(&mut self) -> Result<&mut BuyLot, LotQueueError> {
        while self.lots.last().is_some_and(BuyLot::is_exhausted) {
            self.lots.pop();
        }
        self.lots.last_mut().ok_or(LotQueueError::Empty)
    }

    /// Reduce the top lot by `volume`. An emptied lot is not removed here.
    pub fn consume(&mut self, volume: Decimal) -> Result<(), LotQueueError> {
        let top = self.lots.last_mut().ok_or(LotQueueError::Empty)?;
        if volume > top.remaining_volume {
            return Err(LotQueueError::Overdraw {
                requested: volume,
                available: top.remaining_volume,
            });
        }
        top.reduce_volume(volume);
        Ok(())
    }

    /// Remove and return the top lot regardless of its remaining volume.
    pub fn pop_top(&mut self) -> Option<BuyLot> {
        self.lots.pop()
    }

    /// Open lots, oldest first.
    pub fn open_lots(&self) -> impl Iterator<Item = &BuyLot> {
        self.lots.iter().filter(|lot| !lot.is_exhausted())
    }

    pub fn open_volume(&self) -> Decimal {
        self.open_lots().map(|lot| lot.remaining_volume).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.open_lots().next().is_none()
    }

    pub fn into_open_lots(self) -> Vec<BuyLot> {
        self.lots
            .into_iter()
            .filter(|lot| !lot.is_exhausted())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TradeDate, Transaction};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn lot(day: u32, volume: &str) -> BuyLot {
        BuyLot::from_acquisition(&Transaction::new(
            TradeDate::from_ymd(2021, 5, day).unwrap(),
            Ticker::new("VAS"),
            d(volume),
            d("90"),
            d("90"),
            d("10"),
        ))
    }

    #[test]
    fn test_peek_top_is_last_pushed() {
        let mut queue = LotQueue::new(Ticker::new("VAS"));
        queue.push(lot(1, "10")).unwrap();
        queue.push(lot(2, "20")).unwrap();
        assert_eq!(queue.peek_top().unwrap().remaining_volume, d("20"));
        assert_eq!(queue.open_volume(), d("30"));
    }

    #[test]
    fn test_peek_top_on_empty_queue_errors() {
        let mut queue = LotQueue::new(Ticker::new("VAS"));
        assert_eq!(queue.peek_top().unwrap_err(), LotQueueError::Empty);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_consumed_lot_is_discarded_on_next_peek() {
        let mut queue = LotQueue::new(Ticker::new("VAS"));
        queue.push(lot(1, "10")).unwrap();
        queue.push(lot(2, "20")).unwrap();

        queue.consume(d("20")).unwrap();
        // Still physically present until the next peek.
        assert_eq!(queue.lots.len(), 2);
        assert_eq!(queue.open_lots().count(), 1);

        let top = queue.peek_top().unwrap();
        assert_eq!(top.date, TradeDate::from_ymd(2021, 5, 1).unwrap());
        assert_eq!(queue.lots.len(), 1);
    }

    #[test]
    fn test_consume_partial_keeps_lot_open() {
        let mut queue = LotQueue::new(Ticker::new("VAS"));
        queue.push(lot(1, "100")).unwrap();
        queue.consume(d("40")).unwrap();
        let top = queue.peek_top().unwrap();
        assert_eq!(top.remaining_volume, d("60"));
        assert_eq!(top.original_volume, d("100"));
    }

    #[test]
    fn test_consume_more_than_top_errors() {
        let mut queue = LotQueue::new(Ticker::new("VAS"));
        queue.push(lot(1, "10")).unwrap();
        let err = queue.consume(d("11")).unwrap_err();
        assert!(matches!(err, LotQueueError::Overdraw { .. }));
    }

    #[test]
    fn test_push_rejects_other_ticker() {
        let mut queue = LotQueue::new(Ticker::new("CBA"));
        assert!(matches!(
            queue.push(lot(1, "10")),
            Err(LotQueueError::Rejected(_))
        ));
    }

    #[test]
    fn test_into_open_lots_drops_exhausted() {
        let mut queue = LotQueue::new(Ticker::new("VAS"));
        queue.push(lot(1, "10")).unwrap();
        queue.push(lot(2, "5")).unwrap();
        queue.consume(d("5")).unwrap();
        let open = queue.into_open_lots();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].remaining_volume, d("10"));
    }
}

use crate::domain::{BuyLot, DisposalEvent, Side, Ticker, Transaction, TransactionOrderingKey};
use crate::error::DataError;

use super::gain_calculator::{DisposalLeg, GainCalculator, TaxRules};
use super::lot_queue::{LotQueue, LotQueueError};
use super::TickerOutcome;

/// Replay phase of a [`MatchingEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Waiting for the next transaction.
    #[default]
    Ready,
    /// Pushing an acquisition onto the lot queue.
    ReplayingBuy,
    /// Matching a disposal against the lot queue.
    ResolvingSell,
}

/// Replays one security's ordered transactions with LIFO lot matching.
///
/// Owns its lot queue for the duration of the replay. After an error the
/// engine must be discarded: lots consumed by the failed disposal are not
/// restored.
pub struct MatchingEngine {
    ticker: Ticker,
    state: EngineState,
    queue: LotQueue,
    calculator: GainCalculator,
    last_key: Option<TransactionOrderingKey>,

    // Outputs accumulated during processing.
    events: Vec<DisposalEvent>,
}

impl MatchingEngine {
    pub fn new(ticker: Ticker, rules: TaxRules) -> Self {
        Self {
            queue: LotQueue::new(ticker.clone()),
            ticker,
            state: EngineState::Ready,
            calculator: GainCalculator::new(rules),
            last_key: None,
            events: Vec::new(),
        }
    }

    /// Replay a full ledger for `ticker`, which must already be in replay order.
    pub fn replay(
        ticker: Ticker,
        transactions: &[Transaction],
        rules: TaxRules,
    ) -> Result<TickerOutcome, DataError> {
        let mut engine = Self::new(ticker, rules);
        for tx in transactions {
            engine.process_transaction(tx)?;
        }
        Ok(engine.into_outputs())
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn lot_queue(&self) -> &LotQueue {
        &self.queue
    }

    pub fn events(&self) -> &[DisposalEvent] {
        &self.events
    }

    /// Process a single transaction, updating the lot queue and emitting a
    /// [`DisposalEvent`] for every disposal.
    pub fn process_transaction(&mut self, tx: &Transaction) -> Result<(), DataError> {
        self.check_preconditions(tx)?;

        let result = match tx.side() {
            Side::Acquisition => {
                self.state = EngineState::ReplayingBuy;
                self.replay_acquisition(tx)
            }
            Side::Disposal => {
                self.state = EngineState::ResolvingSell;
                self.resolve_disposal(tx).map(|event| self.events.push(event))
            }
        };
        self.state = EngineState::Ready;
        result
    }

    fn check_preconditions(&mut self, tx: &Transaction) -> Result<(), DataError> {
        if tx.ticker != self.ticker {
            return Err(DataError::malformed(
                &self.ticker,
                format!("transaction for {} replayed on {}", tx.ticker, self.ticker),
            ));
        }
        tx.validate()?;

        let key = TransactionOrderingKey::from_transaction(tx);
        if let Some(last) = self.last_key {
            if key < last {
                return Err(DataError::malformed(
                    &self.ticker,
                    format!("{} {} is out of replay order", tx.side(), tx.date),
                ));
            }
        }
        self.last_key = Some(key);
        Ok(())
    }

    fn replay_acquisition(&mut self, tx: &Transaction) -> Result<(), DataError> {
        self.queue
            .push(BuyLot::from_acquisition(tx))
            .map_err(|e| DataError::malformed(&self.ticker, e.to_string()))
    }

    /// Match a disposal top-down against the lot queue until its volume is
    /// exhausted. Fragments come out most recent acquisition first.
    fn resolve_disposal(&mut self, tx: &Transaction) -> Result<DisposalEvent, DataError> {
        let mut sale = DisposalLeg::new(tx);
        let mut fragments = Vec::new();

        while sale.remaining_volume().is_positive() {
            let wanted = sale.remaining_volume();
            let lot = self.queue.peek_top().map_err(|_| DataError::UnmatchedDisposal {
                ticker: self.ticker.clone(),
                date: tx.date,
                excess_volume: wanted,
            })?;
            let available = lot.remaining_volume;

            if wanted < available {
                // Sale absorbed by this lot, which stays open.
                let fragment = self.calculator.compute(lot, &mut sale, wanted)?;
                self.queue.consume(wanted).map_err(|e| self.queue_error(e))?;
                fragments.push(fragment);
            } else {
                let fragment = self.calculator.compute(lot, &mut sale, available)?;
                self.queue
                    .consume(available)
                    .map_err(|e| self.queue_error(e))?;
                self.queue.pop_top();
                fragments.push(fragment);
            }
        }

        DisposalEvent::from_fragments(tx, fragments)
    }

    fn queue_error(&self, err: LotQueueError) -> DataError {
        DataError::malformed(&self.ticker, err.to_string())
    }

    /// Consume the engine, returning its events and still-open lots.
    pub fn into_outputs(self) -> TickerOutcome {
        TickerOutcome {
            ticker: self.ticker,
            events: self.events,
            open_lots: self.queue.into_open_lots(),
        }
    }
}

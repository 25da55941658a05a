//! Stable transaction ordering for deterministic replay.

use crate::domain::{TradeDate, Transaction};

/// Replay ordering key for transactions of one security.
///
/// Ordering: date -> acquisitions before disposals. Anything beyond that keeps
/// input order, so sorting must be stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionOrderingKey {
    pub date: TradeDate,
    pub side_rank: u8,
}

impl TransactionOrderingKey {
    pub fn from_transaction(tx: &Transaction) -> Self {
        TransactionOrderingKey {
            date: tx.date,
            side_rank: tx.side().replay_rank(),
        }
    }
}

/// Sort transactions into replay order. Stable for equal keys.
pub fn sort_transactions_deterministic(txs: &mut [Transaction]) {
    txs.sort_by_key(TransactionOrderingKey::from_transaction);
}

/// True if the slice is already in replay order.
pub fn is_replay_ordered(txs: &[Transaction]) -> bool {
    txs.windows(2).all(|pair| {
        TransactionOrderingKey::from_transaction(&pair[0])
            <= TransactionOrderingKey::from_transaction(&pair[1])
    })
}

//! Sequential and parallel compilation of a full ledger.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use super::{CompileError, CompileReport, TickerFailure};
use crate::config::CompileMode;
use crate::datasource::LedgerSource;
use crate::domain::{sort_transactions_deterministic, Ticker, Transaction};
use crate::engine::{MatchingEngine, TaxRules, TickerOutcome};
use crate::error::{AppError, DataError};
use crate::report::EventLog;

/// Compiler for whole-ledger runs.
pub struct Compiler;

impl Compiler {
    /// Split a ledger into per-ticker groups, each sorted into replay order.
    pub fn group_by_ticker(
        ledger: impl IntoIterator<Item = Transaction>,
    ) -> BTreeMap<Ticker, Vec<Transaction>> {
        let mut groups: BTreeMap<Ticker, Vec<Transaction>> = BTreeMap::new();
        for tx in ledger {
            groups.entry(tx.ticker.clone()).or_default().push(tx);
        }
        for txs in groups.values_mut() {
            sort_transactions_deterministic(txs);
        }
        groups
    }

    /// Replay every ticker in `ledger` on the calling thread.
    ///
    /// A ticker that fails to replay is reported in `failures` and contributes
    /// neither events nor open lots; the others are unaffected.
    pub fn compile(ledger: &[Transaction], rules: TaxRules) -> CompileReport {
        let outcomes = Self::group_by_ticker(ledger.iter().cloned())
            .into_iter()
            .map(|(ticker, txs)| {
                let result = replay_ticker(&ticker, &txs, rules);
                (ticker, result)
            })
            .collect();
        Self::assemble(outcomes, rules)
    }

    /// Replay each ticker on its own blocking task.
    ///
    /// Results are merged in ticker order, so the report carries the same
    /// events as [`Compiler::compile`] on the same ledger.
    ///
    /// # Errors
    /// Returns an error if a replay task panics or is cancelled
    pub async fn compile_parallel(
        ledger: Vec<Transaction>,
        rules: TaxRules,
    ) -> Result<CompileReport, CompileError> {
        let handles = Self::group_by_ticker(ledger)
            .into_iter()
            .map(|(ticker, txs)| {
                tokio::task::spawn_blocking(move || {
                    let result = replay_ticker(&ticker, &txs, rules);
                    (ticker, result)
                })
            });

        let outcomes = try_join_all(handles)
            .await
            .map_err(|e| CompileError::Worker(e.to_string()))?;
        Ok(Self::assemble(outcomes, rules))
    }

    /// Load the ledger from `source` and compile it in the given mode.
    pub async fn compile_source<S>(
        source: &S,
        rules: TaxRules,
        mode: CompileMode,
    ) -> Result<CompileReport, AppError>
    where
        S: LedgerSource + ?Sized,
    {
        let ledger = source.load_transactions().await?;
        debug!(transactions = ledger.len(), ?mode, "Loaded ledger");

        match mode {
            CompileMode::Sequential => Ok(Self::compile(&ledger, rules)),
            CompileMode::Parallel => Ok(Self::compile_parallel(ledger, rules).await?),
        }
    }

    fn assemble(
        outcomes: Vec<(Ticker, Result<TickerOutcome, DataError>)>,
        rules: TaxRules,
    ) -> CompileReport {
        let mut log = EventLog::new();
        let mut open_lots = BTreeMap::new();
        let mut failures = Vec::new();

        for (ticker, result) in outcomes {
            match result {
                Ok(outcome) => {
                    log.extend(outcome.events);
                    open_lots.insert(ticker, outcome.open_lots);
                }
                Err(error) => failures.push(TickerFailure { ticker, error }),
            }
        }

        info!(
            run_id = %log.run_id(),
            tickers = open_lots.len(),
            events = log.len(),
            failures = failures.len(),
            "Compilation complete"
        );

        CompileReport {
            log,
            open_lots,
            failures,
            rules,
        }
    }
}

fn replay_ticker(
    ticker: &Ticker,
    txs: &[Transaction],
    rules: TaxRules,
) -> Result<TickerOutcome, DataError> {
    let result = MatchingEngine::replay(ticker.clone(), txs, rules);
    match &result {
        Ok(outcome) => debug!(
            ticker = %ticker,
            transactions = txs.len(),
            events = outcome.events.len(),
            open_lots = outcome.open_lots.len(),
            "Replayed ticker"
        ),
        Err(DataError::UnmatchedDisposal {
            date,
            excess_volume,
            ..
        }) => warn!(
            ticker = %ticker,
            date = %date,
            excess = %excess_volume,
            "Disposal exceeds held volume, skipping ticker"
        ),
        Err(e) => warn!(ticker = %ticker, error = %e, "Aborted ticker replay"),
    }
    result
}

pub mod compile;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod report;

pub use compile::{CompileReport, Compiler, TickerFailure};
pub use config::{CompileMode, Config};
pub use datasource::{CsvLedgerSource, LedgerSource, LedgerSourceError, MockLedgerSource};
pub use domain::{
    BuyLot, Decimal, DisposalEvent, FinancialYear, GainFragment, Period, Side, Ticker, TradeDate,
    Transaction,
};
pub use engine::{LotQueue, MatchingEngine, TaxRules};
pub use error::{AppError, DataError, QueryError};
pub use report::{EventLog, PeriodView};

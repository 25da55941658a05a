use crate::compile::CompileError;
use crate::config::ConfigError;
use crate::datasource::LedgerSourceError;
use crate::domain::{Decimal, Ticker, TradeDate};
use thiserror::Error;

/// Ledger content that cannot be matched. Fatal for the affected ticker only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("unmatched disposal of {ticker} on {date}, excess volume {excess_volume}")]
    UnmatchedDisposal {
        ticker: Ticker,
        date: TradeDate,
        excess_volume: Decimal,
    },
    #[error("malformed transaction for {ticker}: {reason}")]
    MalformedTransaction { ticker: Ticker, reason: String },
}

impl DataError {
    pub fn ticker(&self) -> &Ticker {
        match self {
            DataError::UnmatchedDisposal { ticker, .. } => ticker,
            DataError::MalformedTransaction { ticker, .. } => ticker,
        }
    }

    pub fn malformed(ticker: &Ticker, reason: impl Into<String>) -> Self {
        DataError::MalformedTransaction {
            ticker: ticker.clone(),
            reason: reason.into(),
        }
    }
}

/// A rejected reporting query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid period: end {end} is before start {start}")]
    InvalidPeriod { start: TradeDate, end: TradeDate },
    #[error("financial year {year} out of bounds, must be within {min}..={max}")]
    YearOutOfBounds { year: i32, min: i32, max: i32 },
}

/// Errors that end a whole run. Per-ticker `DataError`s are reported, not
/// raised.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Ledger source error: {0}")]
    Source(#[from] LedgerSourceError),
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_unmatched_disposal_message_names_ticker_and_excess() {
        let err = DataError::UnmatchedDisposal {
            ticker: Ticker::new("VAS"),
            date: TradeDate::from_ymd(2021, 3, 4).unwrap(),
            excess_volume: Decimal::from_str("10").unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("VAS"));
        assert!(msg.contains("2021-03-04"));
        assert!(msg.contains("excess volume 10"));
        assert_eq!(err.ticker().as_str(), "VAS");
    }

    #[test]
    fn test_query_error_display() {
        let err = QueryError::YearOutOfBounds {
            year: 2010,
            min: 2015,
            max: 9999,
        };
        assert_eq!(
            err.to_string(),
            "financial year 2010 out of bounds, must be within 2015..=9999"
        );
    }

    #[test]
    fn test_app_error_from_query_error() {
        let err: AppError = QueryError::YearOutOfBounds {
            year: 2000,
            min: 2015,
            max: 9999,
        }
        .into();
        assert!(matches!(err, AppError::Query(_)));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let err: AppError = ConfigError::MissingEnv("LEDGER_PATH".to_string()).into();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required environment variable: LEDGER_PATH"
        );
    }
}

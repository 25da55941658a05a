//! Domain primitives: TradeDate, Ticker, Side.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar date of a trade (day precision).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeDate(pub NaiveDate);

impl TradeDate {
    pub fn new(date: NaiveDate) -> Self {
        TradeDate(date)
    }

    /// Today's date on the local clock.
    pub fn today() -> Self {
        TradeDate(Local::now().date_naive())
    }

    /// Build from year/month/day, returning None for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(TradeDate)
    }

    /// Parse `YYYY-MM-DD`, falling back to day-first `DD/MM/YYYY`.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
            .map(TradeDate)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Signed number of days from `self` to `later`.
    pub fn days_until(&self, later: TradeDate) -> i64 {
        (later.0 - self.0).num_days()
    }

    pub fn checked_add_days(&self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(TradeDate)
    }

    pub fn checked_sub_days(&self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(TradeDate)
    }
}

impl std::fmt::Display for TradeDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Security identifier (e.g. "VAS", "CBA").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticker(pub String);

impl Ticker {
    pub fn new(ticker: impl Into<String>) -> Self {
        Ticker(ticker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a ledger entry, derived from the sign of its volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Acquisition,
    Disposal,
}

impl Side {
    /// Same-day ordering rank: acquisitions replay before disposals.
    pub fn replay_rank(&self) -> u8 {
        match self {
            Side::Acquisition => 0,
            Side::Disposal => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Acquisition => write!(f, "acquisition"),
            Side::Disposal => write!(f, "disposal"),
        }
    }
}

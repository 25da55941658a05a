//! Reporting windows: inclusive date periods and July–June financial years.

use crate::domain::TradeDate;
use crate::error::QueryError;
use serde::Serialize;

/// Earliest financial year (by end year) a report may cover.
pub const MIN_FINANCIAL_YEAR: i32 = 2015;
pub const MAX_FINANCIAL_YEAR: i32 = 9999;

/// An inclusive `[start, end]` date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: TradeDate,
    pub end: TradeDate,
}

impl Period {
    /// # Errors
    /// `InvalidPeriod` if `end < start`; `YearOutOfBounds` if `start` falls in
    /// a financial year outside [`MIN_FINANCIAL_YEAR`]..=[`MAX_FINANCIAL_YEAR`].
    pub fn new(start: TradeDate, end: TradeDate) -> Result<Self, QueryError> {
        if end < start {
            return Err(QueryError::InvalidPeriod { start, end });
        }
        FinancialYear::containing(start)?;
        Ok(Period { start, end })
    }

    pub fn contains(&self, date: TradeDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A financial year running 1 July to 30 June, identified by its end year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FinancialYear {
    end_year: i32,
    start: TradeDate,
    end: TradeDate,
}

impl FinancialYear {
    pub fn new(end_year: i32) -> Result<Self, QueryError> {
        let out_of_bounds = QueryError::YearOutOfBounds {
            year: end_year,
            min: MIN_FINANCIAL_YEAR,
            max: MAX_FINANCIAL_YEAR,
        };
        if !(MIN_FINANCIAL_YEAR..=MAX_FINANCIAL_YEAR).contains(&end_year) {
            return Err(out_of_bounds);
        }
        let start = TradeDate::from_ymd(end_year - 1, 7, 1).ok_or(out_of_bounds.clone())?;
        let end = TradeDate::from_ymd(end_year, 6, 30).ok_or(out_of_bounds)?;
        Ok(FinancialYear {
            end_year,
            start,
            end,
        })
    }

    /// The financial year a date falls in; July onwards belongs to the next
    /// end year.
    pub fn containing(date: TradeDate) -> Result<Self, QueryError> {
        if date.month() > 6 {
            Self::new(date.year() + 1)
        } else {
            Self::new(date.year())
        }
    }

    /// Financial year of today's local date.
    pub fn current() -> Result<Self, QueryError> {
        Self::containing(TradeDate::today())
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn start(&self) -> TradeDate {
        self.start
    }

    pub fn end(&self) -> TradeDate {
        self.end
    }

    pub fn period(&self) -> Period {
        Period {
            start: self.start,
            end: self.end,
        }
    }

    /// e.g. `FY2020-2021`.
    pub fn label(&self) -> String {
        format!("FY{}-{}", self.end_year - 1, self.end_year)
    }
}

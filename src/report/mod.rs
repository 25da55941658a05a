//! Event log and derived reporting views.

pub mod event_log;
pub mod views;

pub use event_log::EventLog;
pub use views::{DetailRow, EventRow, PeriodRows, PeriodView, TickerSummary};

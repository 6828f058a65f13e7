//! Contact cadence and reporting engine.
//!
//! Given a snapshot of tracked companies, contact methods and the
//! communication log, answers two questions: when is each company's next
//! contact due (and is it on time, due today, or overdue), and what do the
//! frequency, overdue-trend and recent-activity reports look like.
//!
//! Every query is a pure function of its snapshot. Nothing is cached or
//! persisted, so callers refresh by calling again with newer data.

pub mod cadence;
pub mod calendar;
pub mod dashboard;
pub mod error;
pub mod intake;
pub mod reports;
pub mod state;
pub mod types;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use cadence::{resolve_all, resolve_cadence, CadenceState, CadenceStatus, Highlight, NextDue};
pub use error::CadenceError;
pub use reports::{
    build_activity_feed, build_frequency_table, build_overdue_trend, build_report, DateRange,
    ReportFilters, ReportRequest,
};
pub use state::{load_config, load_snapshot, parse_snapshot, Snapshot};
pub use types::{CommunicationRecord, EngineConfig, Entity, Method};

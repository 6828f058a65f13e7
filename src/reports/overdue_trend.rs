//! Overdue trend: how many entities were overdue on each of the last N days.
//!
//! Retrospective. Each day is judged only on contacts logged up to the end
//! of that day, so back-filling a later contact never rewrites history.
//! Highlight suppression is ignored here.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::cadence::{due_status, group_by_entity, CadenceStatus};
use crate::error::CadenceError;
use crate::state::Snapshot;
use crate::types::CommunicationRecord;
use crate::util::{end_of_day, local_date, trailing_days};

/// Longest accepted window, about a century of daily points.
pub const MAX_TREND_WINDOW_DAYS: i64 = 36_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub overdue: usize,
}

/// One point per day for the `window_days` days ending today, oldest first.
pub fn build_overdue_trend(
    snapshot: &Snapshot,
    window_days: i64,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<TrendPoint>, CadenceError> {
    if !(1..=MAX_TREND_WINDOW_DAYS).contains(&window_days) {
        return Err(CadenceError::InvalidWindow(window_days));
    }
    snapshot.validate()?;

    // Per-entity history sorted by (timestamp, id) so "latest as of D" is a
    // partition point instead of a rescan.
    let mut grouped = group_by_entity(&snapshot.communications);
    for records in grouped.values_mut() {
        records.sort_by(|a, b| a.recency_key().cmp(&b.recency_key()));
    }

    let today = local_date(now, tz);
    let points: Vec<TrendPoint> = trailing_days(today, window_days.unsigned_abs())
        .into_iter()
        .map(|date| {
            let cutoff = end_of_day(date, tz);
            let overdue = snapshot
                .entities
                .iter()
                .filter(|entity| {
                    let history = grouped
                        .get(entity.id.as_str())
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    let last = latest_before(history, cutoff);
                    let (_, status) = due_status(last, entity.interval_days, date, tz);
                    status == CadenceStatus::Overdue
                })
                .count();
            TrendPoint { date, overdue }
        })
        .collect();

    log::debug!(
        "reports: overdue trend over {} days for {} entities",
        points.len(),
        snapshot.entities.len()
    );
    Ok(points)
}

/// Latest record strictly before `cutoff` in a history sorted oldest first.
fn latest_before<'a>(
    sorted: &[&'a CommunicationRecord],
    cutoff: DateTime<Utc>,
) -> Option<&'a CommunicationRecord> {
    let idx = sorted.partition_point(|r| r.timestamp < cutoff);
    idx.checked_sub(1).map(|i| sorted[i])
}

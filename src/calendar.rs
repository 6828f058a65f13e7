//! Calendar day buckets for the week/month views.
//!
//! Only the bucketing lives here; laying the days out in a grid is the
//! renderer's job.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CadenceError;
use crate::reports::{ActivityEntry, DateRange};
use crate::state::Snapshot;
use crate::types::CommunicationRecord;
use crate::util::{day_range, local_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Week,
    Month,
}

impl CalendarView {
    /// Dates shown for `anchor`: Sunday through Saturday, or the whole month.
    pub fn span(&self, anchor: NaiveDate) -> DateRange {
        match self {
            CalendarView::Week => {
                let back = anchor.weekday().num_days_from_sunday() as u64;
                let from = anchor.checked_sub_days(Days::new(back)).unwrap_or(anchor);
                let to = from.checked_add_days(Days::new(6)).unwrap_or(from);
                DateRange { from, to }
            }
            CalendarView::Month => {
                let from = anchor.with_day(1).unwrap_or(anchor);
                let to = from
                    .checked_add_months(chrono::Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(anchor);
                DateRange { from, to }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Oldest first within the day.
    pub events: Vec<ActivityEntry>,
}

/// One bucket per date in `range`, empty days included.
pub fn communications_by_day(
    snapshot: &Snapshot,
    range: &DateRange,
    tz: &Tz,
) -> Result<Vec<DayBucket>, CadenceError> {
    range.check()?;
    snapshot.validate()?;

    let mut by_day: HashMap<NaiveDate, Vec<&CommunicationRecord>> = HashMap::new();
    for record in &snapshot.communications {
        let date = local_date(record.timestamp, tz);
        if range.contains(date) {
            by_day.entry(date).or_default().push(record);
        }
    }

    day_range(range.from, range.to)
        .into_iter()
        .map(|date| -> Result<DayBucket, CadenceError> {
            let mut records = by_day.remove(&date).unwrap_or_default();
            records.sort_by(|a, b| a.recency_key().cmp(&b.recency_key()));
            let events = records
                .into_iter()
                .map(|record| ActivityEntry::resolve(snapshot, record))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DayBucket { date, events })
        })
        .collect()
}

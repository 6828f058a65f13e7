//! Communication frequency: contacts per method within a date range.

use chrono_tz::Tz;
use serde::Serialize;

use super::{DateRange, ReportFilters};
use crate::error::CadenceError;
use crate::state::Snapshot;
use crate::types::CommunicationRecord;
use crate::util::local_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRow {
    pub method_id: String,
    pub method_name: String,
    pub count: usize,
}

/// One row per catalog method, in catalog order, zero-count rows included.
///
/// A record counts when its local calendar date is inside `range` and it
/// passes both filters.
pub fn build_frequency_table(
    snapshot: &Snapshot,
    filters: &ReportFilters,
    range: &DateRange,
    tz: &Tz,
) -> Result<Vec<FrequencyRow>, CadenceError> {
    range.check()?;
    snapshot.validate()?;
    filters.check(snapshot)?;

    let matches = |record: &CommunicationRecord| {
        filters.entity.as_deref().map_or(true, |id| record.entity_id == id)
            && filters.method.as_deref().map_or(true, |id| record.method_id == id)
            && range.contains(local_date(record.timestamp, tz))
    };

    let rows: Vec<FrequencyRow> = snapshot
        .methods
        .iter()
        .map(|method| FrequencyRow {
            method_id: method.id.clone(),
            method_name: method.name.clone(),
            count: snapshot
                .communications
                .iter()
                .filter(|c| c.method_id == method.id && matches(*c))
                .count(),
        })
        .collect();

    log::debug!(
        "reports: frequency table {}..{} counted {} communications",
        range.from,
        range.to,
        rows.iter().map(|r| r.count).sum::<usize>()
    );
    Ok(rows)
}

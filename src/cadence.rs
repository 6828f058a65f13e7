//! Per-entity contact cadence: last contact, next due date, expected method.
//!
//! Due state is always derived from the raw communication history. Nothing is
//! stored, so there is nothing to invalidate when a contact is logged.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::CadenceError;
use crate::state::{check_interval, Snapshot};
use crate::types::{CommunicationRecord, Entity, Method};
use crate::util::local_date;

/// Where an entity stands against its required contact interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceStatus {
    OnTime,
    DueToday,
    Overdue,
}

impl CadenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CadenceStatus::OnTime => "on_time",
            CadenceStatus::DueToday => "due_today",
            CadenceStatus::Overdue => "overdue",
        }
    }
}

/// Visual highlight for dashboards. Suppression only ever lands here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    None,
    DueToday,
    Overdue,
}

/// When the next contact is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum NextDue {
    /// Never contacted: due now, and already counted as past due.
    Immediately,
    On(DateTime<Utc>),
}

/// Derived cadence for one entity at one reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CadenceState {
    pub entity_id: String,
    pub last_contact: Option<CommunicationRecord>,
    pub next_due: NextDue,
    /// `None` only when the method catalog is empty.
    pub expected_next_method: Option<Method>,
    pub status: CadenceStatus,
    pub highlight_suppressed: bool,
}

impl CadenceState {
    /// Status to paint. Suppressed entities always render as on time.
    pub fn display_status(&self) -> CadenceStatus {
        if self.highlight_suppressed {
            CadenceStatus::OnTime
        } else {
            self.status
        }
    }

    pub fn highlight(&self) -> Highlight {
        match self.display_status() {
            CadenceStatus::OnTime => Highlight::None,
            CadenceStatus::DueToday => Highlight::DueToday,
            CadenceStatus::Overdue => Highlight::Overdue,
        }
    }
}

/// Methods ordered by sequence rank, for predicting the next method.
#[derive(Debug, Clone)]
pub struct MethodCatalog<'a> {
    ranked: Vec<&'a Method>,
}

impl<'a> MethodCatalog<'a> {
    pub fn new(methods: &'a [Method]) -> Result<Self, CadenceError> {
        let mut ranked: Vec<&Method> = methods.iter().collect();
        ranked.sort_by_key(|m| m.sequence_rank);
        if let Some(pair) = ranked
            .windows(2)
            .find(|w| w[0].sequence_rank == w[1].sequence_rank)
        {
            return Err(CadenceError::DuplicateSequenceRank {
                rank: pair[0].sequence_rank,
            });
        }
        Ok(Self { ranked })
    }

    pub fn get(&self, method_id: &str) -> Result<&'a Method, CadenceError> {
        self.ranked
            .iter()
            .copied()
            .find(|m| m.id == method_id)
            .ok_or_else(|| CadenceError::UnknownMethod(method_id.to_string()))
    }

    /// Lowest-ranked method: the opener for entities never contacted.
    pub fn first(&self) -> Option<&'a Method> {
        self.ranked.first().copied()
    }

    /// Next method in rank order, wrapping from the highest rank to the lowest.
    pub fn successor(&self, method_id: &str) -> Result<Option<&'a Method>, CadenceError> {
        let current = self.get(method_id)?;
        let next = self
            .ranked
            .iter()
            .copied()
            .find(|m| m.sequence_rank > current.sequence_rank)
            .or_else(|| self.first());
        Ok(next)
    }
}

/// Most recent record by timestamp; equal timestamps go to the greatest id.
pub fn latest_contact<'a, I>(records: I) -> Option<&'a CommunicationRecord>
where
    I: IntoIterator<Item = &'a CommunicationRecord>,
{
    records
        .into_iter()
        .max_by(|a, b| a.recency_key().cmp(&b.recency_key()))
}

/// Next due instant and its status against `today`.
///
/// The due day is the last contact's local date plus `interval_days`
/// calendar days; the status compares that day with `today`.
pub fn due_status(
    last_contact: Option<&CommunicationRecord>,
    interval_days: i64,
    today: NaiveDate,
    tz: &Tz,
) -> (NextDue, CadenceStatus) {
    let Some(last) = last_contact else {
        return (NextDue::Immediately, CadenceStatus::Overdue);
    };

    // Calendar days in the local zone, so a DST change never moves the due day.
    let days = Days::new(interval_days.max(0) as u64);
    let Some(due_date) = local_date(last.timestamp, tz).checked_add_days(days) else {
        return (NextDue::On(DateTime::<Utc>::MAX_UTC), CadenceStatus::OnTime);
    };
    let due = last
        .timestamp
        .with_timezone(tz)
        .naive_local()
        .checked_add_days(days)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        // Same wall-clock time falls in a DST gap on the due day.
        .or_else(|| {
            TimeDelta::try_days(interval_days)
                .and_then(|delta| last.timestamp.checked_add_signed(delta))
        })
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let status = if due_date < today {
        CadenceStatus::Overdue
    } else if due_date == today {
        CadenceStatus::DueToday
    } else {
        CadenceStatus::OnTime
    };
    (NextDue::On(due), status)
}

/// Records grouped by entity id, in log order.
pub fn group_by_entity(records: &[CommunicationRecord]) -> HashMap<&str, Vec<&CommunicationRecord>> {
    let mut grouped: HashMap<&str, Vec<&CommunicationRecord>> = HashMap::new();
    for record in records {
        grouped.entry(record.entity_id.as_str()).or_default().push(record);
    }
    grouped
}

/// Resolve one entity against an already-grouped slice of its records.
pub(crate) fn resolve_entity(
    entity: &Entity,
    records: &[&CommunicationRecord],
    catalog: &MethodCatalog<'_>,
    today: NaiveDate,
    tz: &Tz,
) -> Result<CadenceState, CadenceError> {
    check_interval(entity)?;
    for record in records {
        catalog.get(&record.method_id)?;
    }

    let last = latest_contact(records.iter().copied());
    let expected = match last {
        Some(record) => catalog.successor(&record.method_id)?,
        None => catalog.first(),
    };
    let (next_due, status) = due_status(last, entity.interval_days, today, tz);

    Ok(CadenceState {
        entity_id: entity.id.clone(),
        last_contact: last.cloned(),
        next_due,
        expected_next_method: expected.cloned(),
        status,
        highlight_suppressed: entity.highlight_suppressed,
    })
}

/// Cadence state of a single entity as of `now`.
pub fn resolve_cadence(
    snapshot: &Snapshot,
    entity_id: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<CadenceState, CadenceError> {
    let entity = snapshot.entity(entity_id)?;
    let catalog = MethodCatalog::new(&snapshot.methods)?;
    let records: Vec<&CommunicationRecord> = snapshot.communications_for(entity_id).collect();

    let state = resolve_entity(entity, &records, &catalog, local_date(now, tz), tz)?;
    log::debug!(
        "cadence: {} is {} ({} contacts)",
        entity_id,
        state.status.as_str(),
        records.len()
    );
    Ok(state)
}

/// Cadence state of every entity, in registry order.
pub fn resolve_all(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<CadenceState>, CadenceError> {
    snapshot.validate()?;
    let catalog = MethodCatalog::new(&snapshot.methods)?;
    let grouped = group_by_entity(&snapshot.communications);
    let today = local_date(now, tz);

    snapshot
        .entities
        .iter()
        .map(|entity| {
            let records = grouped.get(entity.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            resolve_entity(entity, records, &catalog, today, tz)
        })
        .collect()
}

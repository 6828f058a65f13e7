//! Company dashboard rows: recent contacts, next scheduled contact, highlight.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::cadence::{
    group_by_entity, resolve_entity, CadenceState, CadenceStatus, Highlight, MethodCatalog,
    NextDue,
};
use crate::error::CadenceError;
use crate::state::Snapshot;
use crate::types::CommunicationRecord;
use crate::util::local_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentContact {
    pub method_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextContact {
    pub method_name: Option<String>,
    pub due: NextDue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub entity_id: String,
    pub entity_name: String,
    /// Newest first.
    pub recent: Vec<RecentContact>,
    pub next_contact: NextContact,
    pub status: CadenceStatus,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueEntry {
    pub entity_id: String,
    pub entity_name: String,
    /// `None` when the entity has never been contacted.
    pub days_overdue: Option<i64>,
    pub expected_method_name: Option<String>,
}

/// Resolve every entity once and hand each state to `visit` with its history.
fn for_each_state<T>(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    tz: &Tz,
    mut visit: impl FnMut(&CadenceState, &mut Vec<&CommunicationRecord>) -> Result<Option<T>, CadenceError>,
) -> Result<Vec<T>, CadenceError> {
    snapshot.validate()?;
    let catalog = MethodCatalog::new(&snapshot.methods)?;
    let mut grouped = group_by_entity(&snapshot.communications);
    let today = local_date(now, tz);

    let mut out = Vec::new();
    for entity in &snapshot.entities {
        let mut history = grouped.remove(entity.id.as_str()).unwrap_or_default();
        let state = resolve_entity(entity, &history, &catalog, today, tz)?;
        if let Some(item) = visit(&state, &mut history)? {
            out.push(item);
        }
    }
    Ok(out)
}

/// One row per entity in registry order.
pub fn build_dashboard(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    tz: &Tz,
    history_count: usize,
) -> Result<Vec<DashboardRow>, CadenceError> {
    let rows = for_each_state(snapshot, now, tz, |state, history| {
        let entity = snapshot.entity(&state.entity_id)?;
        history.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));

        let recent = history
            .iter()
            .take(history_count)
            .map(|record| -> Result<RecentContact, CadenceError> {
                Ok(RecentContact {
                    method_name: snapshot.method(&record.method_id)?.name.clone(),
                    timestamp: record.timestamp,
                })
            })
            .collect::<Result<Vec<_>, CadenceError>>()?;

        Ok(Some(DashboardRow {
            entity_id: entity.id.clone(),
            entity_name: entity.name.clone(),
            recent,
            next_contact: NextContact {
                method_name: state.expected_next_method.as_ref().map(|m| m.name.clone()),
                due: state.next_due,
            },
            status: state.status,
            highlight: state.highlight(),
        }))
    })?;

    log::debug!("dashboard: built {} rows", rows.len());
    Ok(rows)
}

/// Entities whose computed status is overdue, suppressed or not.
pub fn overdue_entities(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<OverdueEntry>, CadenceError> {
    let today = local_date(now, tz);
    for_each_state(snapshot, now, tz, |state, _| {
        if state.status != CadenceStatus::Overdue {
            return Ok(None);
        }
        let entity = snapshot.entity(&state.entity_id)?;
        let days_overdue = match state.next_due {
            NextDue::Immediately => None,
            NextDue::On(due) => Some((today - local_date(due, tz)).num_days()),
        };
        Ok(Some(OverdueEntry {
            entity_id: entity.id.clone(),
            entity_name: entity.name.clone(),
            days_overdue,
            expected_method_name: state.expected_next_method.as_ref().map(|m| m.name.clone()),
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, comm, sample_snapshot};

    const UTC: Tz = chrono_tz::UTC;

    #[test]
    fn test_rows_in_registry_order_with_recent_history() {
        let rows = build_dashboard(&sample_snapshot(), at("2024-01-15T12:00:00Z"), &UTC, 5).unwrap();
        assert_eq!(rows.len(), 3);

        let acme = &rows[0];
        assert_eq!(acme.entity_name, "Acme Corp");
        let methods: Vec<&str> = acme.recent.iter().map(|r| r.method_name.as_str()).collect();
        assert_eq!(methods, vec!["Email", "Call"]);
        assert_eq!(acme.next_contact.method_name.as_deref(), Some("Visit"));
        assert_eq!(acme.next_contact.due, NextDue::On(at("2024-01-31T09:00:00Z")));
        assert_eq!(acme.status, CadenceStatus::OnTime);
        assert_eq!(acme.highlight, Highlight::None);

        let initech = &rows[2];
        assert!(initech.recent.is_empty());
        assert_eq!(initech.next_contact.due, NextDue::Immediately);
        assert_eq!(initech.highlight, Highlight::Overdue);
    }

    #[test]
    fn test_history_is_capped() {
        let mut snap = sample_snapshot();
        for i in 0..8 {
            snap.communications.push(comm(
                &format!("g{}", i),
                "globex",
                "email",
                &format!("2024-01-0{}T07:00:00Z", i + 1),
            ));
        }
        let rows = build_dashboard(&snap, at("2024-01-15T12:00:00Z"), &UTC, 5).unwrap();
        let globex = &rows[1];
        assert_eq!(globex.recent.len(), 5);
        assert_eq!(globex.recent[0].timestamp, at("2024-01-12T08:00:00Z"));
    }

    #[test]
    fn test_suppressed_row_keeps_status_but_drops_highlight() {
        let mut snap = sample_snapshot();
        snap.entities[1].highlight_suppressed = true;
        let rows = build_dashboard(&snap, at("2024-01-19T12:00:00Z"), &UTC, 5).unwrap();
        assert_eq!(rows[1].status, CadenceStatus::DueToday);
        assert_eq!(rows[1].highlight, Highlight::None);
    }

    #[test]
    fn test_overdue_entities_lists_days_overdue() {
        let mut snap = sample_snapshot();
        snap.entities[2].highlight_suppressed = true;
        let overdue = overdue_entities(&snap, at("2024-01-22T12:00:00Z"), &UTC).unwrap();

        let names: Vec<&str> = overdue.iter().map(|o| o.entity_name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Initech"]);
        assert_eq!(overdue[0].days_overdue, Some(3));
        assert_eq!(overdue[0].expected_method_name.as_deref(), Some("Email"));
        assert_eq!(overdue[1].days_overdue, None);
    }
}

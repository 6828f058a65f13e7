//! Recent-activity feed across all entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CadenceError;
use crate::state::Snapshot;
use crate::types::CommunicationRecord;

/// A logged contact with its entity and method names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub communication_id: String,
    pub timestamp: DateTime<Utc>,
    pub entity_id: String,
    pub entity_name: String,
    pub method_id: String,
    pub method_name: String,
    pub note: String,
}

impl ActivityEntry {
    pub(crate) fn resolve(
        snapshot: &Snapshot,
        record: &CommunicationRecord,
    ) -> Result<Self, CadenceError> {
        let entity = snapshot.entity(&record.entity_id)?;
        let method = snapshot.method(&record.method_id)?;
        Ok(Self {
            communication_id: record.id.clone(),
            timestamp: record.timestamp,
            entity_id: entity.id.clone(),
            entity_name: entity.name.clone(),
            method_id: method.id.clone(),
            method_name: method.name.clone(),
            note: record.note.clone(),
        })
    }
}

/// The `limit` most recent contacts, newest first.
///
/// Equal timestamps are ordered by record id, descending, the same key that
/// picks an entity's last contact.
pub fn build_activity_feed(
    snapshot: &Snapshot,
    limit: usize,
) -> Result<Vec<ActivityEntry>, CadenceError> {
    snapshot.validate()?;

    let mut records: Vec<&CommunicationRecord> = snapshot.communications.iter().collect();
    records.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));

    records
        .into_iter()
        .take(limit)
        .map(|record| ActivityEntry::resolve(snapshot, record))
        .collect()
}

//! Turning one "communication performed" entry into log records.
//!
//! The user logs a single contact against several selected companies at
//! once. This builds the records; appending them to the log is the caller's
//! job, the engine never writes.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::CadenceError;
use crate::state::Snapshot;
use crate::types::CommunicationRecord;

/// A contact as entered in the log form, before it is fanned out.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationDraft {
    pub method_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

/// One new record per selected entity, in selection order, duplicates collapsed.
pub fn expand_draft(
    draft: &CommunicationDraft,
    entity_ids: &[String],
    snapshot: &Snapshot,
) -> Result<Vec<CommunicationRecord>, CadenceError> {
    if entity_ids.is_empty() {
        return Err(CadenceError::EmptySelection);
    }
    snapshot.method(&draft.method_id)?;

    let mut seen: Vec<&str> = Vec::with_capacity(entity_ids.len());
    let mut records = Vec::with_capacity(entity_ids.len());
    for entity_id in entity_ids {
        if seen.contains(&entity_id.as_str()) {
            continue;
        }
        snapshot.entity(entity_id)?;
        seen.push(entity_id.as_str());

        records.push(CommunicationRecord {
            id: Uuid::new_v4().to_string(),
            entity_id: entity_id.clone(),
            method_id: draft.method_id.clone(),
            timestamp: draft.timestamp,
            note: draft.note.trim().to_string(),
        });
    }

    log::debug!(
        "intake: {} via {} for {} entities",
        draft.timestamp,
        draft.method_id,
        records.len()
    );
    Ok(records)
}

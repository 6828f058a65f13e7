//! Snapshot and configuration loading.
//!
//! A [`Snapshot`] is the only thing the engine ever reads: entities, methods
//! and communications captured together by the caller. Nothing here is cached
//! between queries.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CadenceError;
use crate::types::{CommunicationRecord, EngineConfig, Entity, Method};

/// Immutable point-in-time view of the registry, the catalog and the log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub communications: Vec<CommunicationRecord>,
}

impl Snapshot {
    pub fn entity(&self, id: &str) -> Result<&Entity, CadenceError> {
        self.entities
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| CadenceError::UnknownEntity(id.to_string()))
    }

    pub fn method(&self, id: &str) -> Result<&Method, CadenceError> {
        self.methods
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| CadenceError::UnknownMethod(id.to_string()))
    }

    /// Communications logged against one entity, in log order.
    pub fn communications_for<'a>(
        &'a self,
        entity_id: &'a str,
    ) -> impl Iterator<Item = &'a CommunicationRecord> + 'a {
        self.communications
            .iter()
            .filter(move |c| c.entity_id == entity_id)
    }

    /// Check the snapshot is internally consistent.
    ///
    /// Fails on the first problem found: non-positive interval, duplicate
    /// method rank, or a communication pointing at an unknown entity/method.
    pub fn validate(&self) -> Result<(), CadenceError> {
        for entity in &self.entities {
            check_interval(entity)?;
        }

        let mut ranks = HashSet::new();
        for method in &self.methods {
            if !ranks.insert(method.sequence_rank) {
                return Err(CadenceError::DuplicateSequenceRank {
                    rank: method.sequence_rank,
                });
            }
        }

        let entity_ids: HashSet<&str> = self.entities.iter().map(|e| e.id.as_str()).collect();
        let method_ids: HashSet<&str> = self.methods.iter().map(|m| m.id.as_str()).collect();
        for record in &self.communications {
            if !entity_ids.contains(record.entity_id.as_str()) {
                log::warn!(
                    "snapshot: communication {} references unknown entity {}",
                    record.id,
                    record.entity_id
                );
                return Err(CadenceError::UnknownEntity(record.entity_id.clone()));
            }
            if !method_ids.contains(record.method_id.as_str()) {
                log::warn!(
                    "snapshot: communication {} references unknown method {}",
                    record.id,
                    record.method_id
                );
                return Err(CadenceError::UnknownMethod(record.method_id.clone()));
            }
        }

        Ok(())
    }
}

/// Reject entities whose contact interval is not a positive number of days.
pub fn check_interval(entity: &Entity) -> Result<(), CadenceError> {
    if entity.interval_days <= 0 {
        return Err(CadenceError::InvalidInterval {
            entity_id: entity.id.clone(),
            interval_days: entity.interval_days,
        });
    }
    Ok(())
}

/// Load engine configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<EngineConfig, CadenceError> {
    if !path.exists() {
        return Err(CadenceError::ConfigurationError(format!(
            "Config file not found at {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&content)
        .map_err(|e| CadenceError::ConfigurationError(format!("Failed to parse config: {}", e)))?;

    // Validate the zone up front so queries never see a bad one
    config.tz()?;

    Ok(config)
}

/// Parse and validate a snapshot from its JSON form.
pub fn parse_snapshot(content: &str) -> Result<Snapshot, CadenceError> {
    let snapshot: Snapshot =
        serde_json::from_str(content).map_err(|e| CadenceError::SnapshotParse(e.to_string()))?;
    snapshot.validate()?;
    log::debug!(
        "snapshot: loaded {} entities, {} methods, {} communications",
        snapshot.entities.len(),
        snapshot.methods.len(),
        snapshot.communications.len()
    );
    Ok(snapshot)
}

/// Load and validate a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, CadenceError> {
    let content = fs::read_to_string(path)?;
    parse_snapshot(&content)
}

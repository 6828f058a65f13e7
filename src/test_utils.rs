//! Shared fixtures for unit tests.

use chrono::{DateTime, NaiveDate, Utc};

use crate::state::Snapshot;
use crate::types::{CommunicationRecord, Entity, Method};

pub fn at(iso: &str) -> DateTime<Utc> {
    iso.parse::<DateTime<Utc>>().expect("valid RFC 3339 timestamp")
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn entity(id: &str, name: &str, interval_days: i64) -> Entity {
    Entity {
        id: id.to_string(),
        name: name.to_string(),
        interval_days,
        highlight_suppressed: false,
    }
}

pub fn method(id: &str, name: &str, sequence_rank: i64) -> Method {
    Method {
        id: id.to_string(),
        name: name.to_string(),
        sequence_rank,
    }
}

pub fn comm(id: &str, entity_id: &str, method_id: &str, iso: &str) -> CommunicationRecord {
    CommunicationRecord {
        id: id.to_string(),
        entity_id: entity_id.to_string(),
        method_id: method_id.to_string(),
        timestamp: at(iso),
        note: String::new(),
    }
}

/// Three companies, three methods, four contacts.
///
/// - acme (30d): call 2023-12-15, email 2024-01-01
/// - globex (7d): visit 2024-01-10, call 2024-01-12
/// - initech (14d): never contacted
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        entities: vec![
            entity("acme", "Acme Corp", 30),
            entity("globex", "Globex", 7),
            entity("initech", "Initech", 14),
        ],
        methods: vec![
            method("call", "Call", 1),
            method("email", "Email", 2),
            method("visit", "Visit", 3),
        ],
        communications: vec![
            comm("c1", "acme", "call", "2023-12-15T10:00:00Z"),
            comm("c2", "acme", "email", "2024-01-01T09:00:00Z"),
            comm("c3", "globex", "visit", "2024-01-10T15:00:00Z"),
            comm("c4", "globex", "call", "2024-01-12T08:00:00Z"),
        ],
    }
}

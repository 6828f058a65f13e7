use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CadenceError;

/// Engine configuration, usually read from a `config.json` next to the host app.
///
/// Every field is optional in the file; missing fields fall back to the
/// defaults the report and dashboard screens were designed around.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// IANA zone used to decide which calendar day an instant falls on.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_activity_feed_limit")]
    pub activity_feed_limit: usize,
    #[serde(default = "default_trend_window_days")]
    pub trend_window_days: i64,
    /// Length of the default frequency-report range, ending today.
    #[serde(default = "default_report_lookback_days")]
    pub report_lookback_days: i64,
    #[serde(default = "default_dashboard_history_count")]
    pub dashboard_history_count: usize,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_activity_feed_limit() -> usize {
    10
}

fn default_trend_window_days() -> i64 {
    30
}

fn default_report_lookback_days() -> i64 {
    30
}

fn default_dashboard_history_count() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            activity_feed_limit: default_activity_feed_limit(),
            trend_window_days: default_trend_window_days(),
            report_lookback_days: default_report_lookback_days(),
            dashboard_history_count: default_dashboard_history_count(),
        }
    }
}

impl EngineConfig {
    /// Parse the configured time zone.
    pub fn tz(&self) -> Result<Tz, CadenceError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CadenceError::ConfigurationError(format!("Invalid timezone: {}", self.timezone)))
    }
}

// =============================================================================
// Reference data
// =============================================================================

/// A tracked organization that needs periodic contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Required contact interval in days. Must be positive.
    pub interval_days: i64,
    /// User override that hides the due/overdue highlight. Never affects status.
    #[serde(default)]
    pub highlight_suppressed: bool,
}

/// A contact method (call, email, visit...). Ranks define the cyclic rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub id: String,
    pub name: String,
    pub sequence_rank: i64,
}

/// A performed contact. Append-only in the communication log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationRecord {
    pub id: String,
    pub entity_id: String,
    pub method_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

impl CommunicationRecord {
    /// Ordering key shared by last-contact selection and the activity feed.
    ///
    /// Equal timestamps fall back to the record id so the choice never depends
    /// on the order the log handed records over.
    pub fn recency_key(&self) -> (DateTime<Utc>, &str) {
        (self.timestamp, self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.activity_feed_limit, 10);
        assert_eq!(config.trend_window_days, 30);
        assert_eq!(config.report_lookback_days, 30);
        assert_eq!(config.dashboard_history_count, 5);
    }

    #[test]
    fn test_config_invalid_timezone() {
        let config = EngineConfig {
            timezone: "Mars/Olympus".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.tz(),
            Err(CadenceError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_record_parses_offset_timestamp_as_instant() {
        let json = r#"{
            "id": "c1",
            "entityId": "acme",
            "methodId": "call",
            "timestamp": "2024-01-01T09:00:00-05:00"
        }"#;
        let record: CommunicationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp.to_rfc3339(), "2024-01-01T14:00:00+00:00");
        assert!(record.note.is_empty());
    }

    #[test]
    fn test_entity_camel_case_fields() {
        let json = r#"{"id":"acme","name":"Acme","intervalDays":14}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.interval_days, 14);
        assert!(!entity.highlight_suppressed);
    }
}

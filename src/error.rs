//! Error types for cadence and report queries
//!
//! Errors are classified by what the caller has to do about them:
//! - SnapshotInconsistency: the collaborator data disagrees with itself; re-fetch
//! - InvalidQuery: the caller passed malformed parameters; fix the request
//! - Environment: config or snapshot files could not be read

use chrono::NaiveDate;
use thiserror::Error;

/// Error types for engine queries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CadenceError {
    // Snapshot inconsistencies
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown communication method: {0}")]
    UnknownMethod(String),

    #[error("Entity {entity_id} has invalid contact interval {interval_days} (must be positive)")]
    InvalidInterval { entity_id: String, interval_days: i64 },

    #[error("Sequence rank {rank} is used by more than one method")]
    DuplicateSequenceRank { rank: i64 },

    // Malformed query parameters
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Invalid trend window: {0} days (must be 1 to 36600)")]
    InvalidWindow(i64),

    #[error("No entities selected")]
    EmptySelection,

    // Environment
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Failed to parse snapshot: {0}")]
    SnapshotParse(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl CadenceError {
    /// Returns true if the snapshot itself is inconsistent and must be re-fetched
    pub fn is_snapshot_inconsistency(&self) -> bool {
        matches!(
            self,
            CadenceError::UnknownEntity(_)
                | CadenceError::UnknownMethod(_)
                | CadenceError::InvalidInterval { .. }
                | CadenceError::DuplicateSequenceRank { .. }
        )
    }

    /// Returns true if the query parameters were malformed
    pub fn is_invalid_query(&self) -> bool {
        matches!(
            self,
            CadenceError::InvalidRange { .. }
                | CadenceError::InvalidWindow(_)
                | CadenceError::EmptySelection
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CadenceError::UnknownEntity(_) | CadenceError::UnknownMethod(_) => {
                "Reload companies, methods and communications together and try again."
            }
            CadenceError::InvalidInterval { .. } => {
                "Set a communication periodicity of at least one day for this company."
            }
            CadenceError::DuplicateSequenceRank { .. } => {
                "Give every communication method a distinct sequence number."
            }
            CadenceError::InvalidRange { .. } => "Pick a start date on or before the end date.",
            CadenceError::InvalidWindow(_) => "Use a trend window between 1 and 36600 days.",
            CadenceError::EmptySelection => "Select at least one company.",
            CadenceError::ConfigurationError(_) => "Check the engine configuration file.",
            CadenceError::SnapshotParse(_) => "Check the snapshot file format is correct.",
            CadenceError::IoError(_) => "Check file permissions and that the path exists.",
        }
    }
}

impl From<std::io::Error> for CadenceError {
    fn from(err: std::io::Error) -> Self {
        CadenceError::IoError(err.to_string())
    }
}

/// Serializable error representation for report callers
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_refetch: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    SnapshotInconsistency,
    InvalidQuery,
    Environment,
}

impl From<&CadenceError> for QueryError {
    fn from(err: &CadenceError) -> Self {
        let error_type = if err.is_snapshot_inconsistency() {
            ErrorType::SnapshotInconsistency
        } else if err.is_invalid_query() {
            ErrorType::InvalidQuery
        } else {
            ErrorType::Environment
        };

        QueryError {
            message: err.to_string(),
            error_type,
            can_refetch: err.is_snapshot_inconsistency(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

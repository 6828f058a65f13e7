//! Report aggregation over a snapshot.
//!
//! Three views share one set of inputs: the per-method frequency table, the
//! retrospective overdue trend, and the recent-activity feed. Every call
//! recomputes from the snapshot; refresh cadence belongs to the caller.

pub mod activity;
pub mod frequency;
pub mod overdue_trend;

pub use activity::{build_activity_feed, ActivityEntry};
pub use frequency::{build_frequency_table, FrequencyRow};
pub use overdue_trend::{build_overdue_trend, TrendPoint};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CadenceError;
use crate::state::Snapshot;
use crate::types::EngineConfig;
use crate::util::local_date;

/// Selector value meaning "no filter".
pub const FILTER_ALL: &str = "all";

/// Optional entity/method filters for the frequency table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

impl ReportFilters {
    /// Build filters from selector values, where `"all"` disables a filter.
    pub fn from_selection(entity: &str, method: &str) -> Self {
        let pick = |value: &str| {
            let value = value.trim();
            if value.is_empty() || value == FILTER_ALL {
                None
            } else {
                Some(value.to_string())
            }
        };
        Self {
            entity: pick(entity),
            method: pick(method),
        }
    }

    /// Filters must name ids that exist in the snapshot.
    pub fn check(&self, snapshot: &Snapshot) -> Result<(), CadenceError> {
        if let Some(ref entity_id) = self.entity {
            snapshot.entity(entity_id)?;
        }
        if let Some(ref method_id) = self.method {
            snapshot.method(method_id)?;
        }
        Ok(())
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, CadenceError> {
        let range = Self { from, to };
        range.check()?;
        Ok(range)
    }

    /// `days` back from `today` through `today`, like the report screen's default.
    pub fn trailing(today: NaiveDate, days: u64) -> Self {
        let from = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    pub fn check(&self) -> Result<(), CadenceError> {
        if self.from > self.to {
            return Err(CadenceError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// What a single report refresh should compute. Omitted values use config defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub filters: ReportFilters,
    #[serde(default)]
    pub range: Option<DateRange>,
    #[serde(default)]
    pub trend_window_days: Option<i64>,
    #[serde(default)]
    pub activity_limit: Option<usize>,
}

/// All report views for one snapshot at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub range: DateRange,
    pub frequency: Vec<FrequencyRow>,
    pub overdue_trend: Vec<TrendPoint>,
    pub activity: Vec<ActivityEntry>,
}

/// Compute every report view in one pass over the same snapshot.
pub fn build_report(
    snapshot: &Snapshot,
    request: &ReportRequest,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<Report, CadenceError> {
    let tz = config.tz()?;
    let today = local_date(now, &tz);
    let range = match request.range {
        Some(range) => range,
        None => DateRange::trailing(today, config.report_lookback_days.max(0) as u64),
    };
    let window = request.trend_window_days.unwrap_or(config.trend_window_days);
    let limit = request.activity_limit.unwrap_or(config.activity_feed_limit);

    let frequency = build_frequency_table(snapshot, &request.filters, &range, &tz)?;
    let overdue_trend = build_overdue_trend(snapshot, window, now, &tz)?;
    let activity = build_activity_feed(snapshot, limit)?;

    log::debug!(
        "reports: built report for {}..{} ({} methods, {} trend points, {} activity rows)",
        range.from,
        range.to,
        frequency.len(),
        overdue_trend.len(),
        activity.len()
    );

    Ok(Report {
        generated_at: now,
        range,
        frequency,
        overdue_trend,
        activity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, day, sample_snapshot};

    #[test]
    fn test_from_selection_all_means_no_filter() {
        let filters = ReportFilters::from_selection("all", "email");
        assert_eq!(filters.entity, None);
        assert_eq!(filters.method.as_deref(), Some("email"));
        assert_eq!(ReportFilters::from_selection("", " all "), ReportFilters::default());
    }

    #[test]
    fn test_filters_must_exist() {
        let snap = sample_snapshot();
        let filters = ReportFilters::from_selection("hooli", "all");
        assert_eq!(
            filters.check(&snap),
            Err(CadenceError::UnknownEntity("hooli".to_string()))
        );
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        let err = DateRange::new(day(2024, 2, 1), day(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, CadenceError::InvalidRange { .. }));
        assert!(DateRange::new(day(2024, 1, 1), day(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_trailing_range() {
        let range = DateRange::trailing(day(2024, 1, 31), 30);
        assert_eq!(range.from, day(2024, 1, 1));
        assert!(range.contains(day(2024, 1, 31)));
        assert!(!range.contains(day(2024, 2, 1)));
    }

    #[test]
    fn test_build_report_uses_config_defaults() {
        let config = EngineConfig {
            activity_feed_limit: 2,
            trend_window_days: 5,
            ..EngineConfig::default()
        };
        let now = at("2024-01-15T12:00:00Z");
        let report = build_report(&sample_snapshot(), &ReportRequest::default(), &config, now).unwrap();

        assert_eq!(report.range, DateRange::trailing(day(2024, 1, 15), 30));
        assert_eq!(report.frequency.len(), 3);
        assert_eq!(report.overdue_trend.len(), 5);
        assert_eq!(report.activity.len(), 2);
        assert_eq!(report.generated_at, now);
    }

    #[test]
    fn test_build_report_fails_whole_on_bad_window() {
        let request = ReportRequest {
            trend_window_days: Some(0),
            ..ReportRequest::default()
        };
        let result = build_report(
            &sample_snapshot(),
            &request,
            &EngineConfig::default(),
            at("2024-01-15T12:00:00Z"),
        );
        assert_eq!(result.unwrap_err(), CadenceError::InvalidWindow(0));
    }

    #[test]
    fn test_build_report_is_idempotent() {
        let snap = sample_snapshot();
        let config = EngineConfig::default();
        let now = at("2024-01-20T00:00:00Z");
        let request = ReportRequest::default();
        assert_eq!(
            build_report(&snap, &request, &config, now).unwrap(),
            build_report(&snap, &request, &config, now).unwrap()
        );
    }
}

use crate::utils::error::{Result, SyncError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::collections::HashMap;

/// One feed row keyed by header name. A `None` value means the row was too short to
/// reach that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub data: HashMap<String, Option<String>>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_csv(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let data = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), record.get(i).map(str::to_string)))
            .collect();
        Self { data }
    }

    pub fn with(mut self, field: &str, value: Option<&str>) -> Self {
        self.data
            .insert(field.to_string(), value.map(str::to_string));
        self
    }

    /// Absent and null are indistinguishable to callers.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|v| v.as_deref())
    }
}

/// A row projected onto the configured output columns. Never contains nulls.
pub type CleanRecord = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedRecord {
    pub timestamp: NaiveDateTime,
    pub sequence: u64,
    pub record: CleanRecord,
}

/// Filtered rows, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub rows: Vec<CleanRecord>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Inclusive `[cutoff, now]` range a run selects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub cutoff: NaiveDateTime,
    pub now: NaiveDateTime,
}

impl Window {
    /// Fails when `now - days` is outside the representable calendar.
    pub fn ending_at(now: NaiveDateTime, days: i64) -> Result<Self> {
        let cutoff = TimeDelta::try_days(days)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| SyncError::InvalidConfigValueError {
                field: "filter.window_days".to_string(),
                value: days.to_string(),
                reason: format!("window reaches past the earliest date from {}", now),
            })?;
        Ok(Self { cutoff, now })
    }

    /// First calendar day wholly inside the window. Rows carry midnight timestamps,
    /// so a cutoff later than midnight excludes its own date.
    pub fn first_full_day(&self) -> NaiveDate {
        let day = self.cutoff.date();
        if self.cutoff.time() == NaiveTime::MIN {
            day
        } else {
            day.succ_opt().unwrap_or(day)
        }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.cutoff <= timestamp && timestamp <= self.now
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRef {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub record_count: usize,
    pub destination: DestinationRef,
}

/// Result of trying to share a newly created destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGrant {
    Granted { identity: String },
    Failed { identity: String, reason: String },
    /// Destination already existed, or nobody is configured to share with.
    NotRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub destination: DestinationRef,
    pub created: bool,
    pub access: AccessGrant,
    pub rows_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent { recipient: String },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_from_short_csv_row() {
        let headers = csv::StringRecord::from(vec!["docket", "date", "carrier"]);
        let record = csv::StringRecord::from(vec!["D-1", "06/14/2024"]);

        let raw = RawRecord::from_csv(&headers, &record);

        assert_eq!(raw.get("docket"), Some("D-1"));
        assert_eq!(raw.get("date"), Some("06/14/2024"));
        assert_eq!(raw.get("carrier"), None);
        assert!(raw.data.contains_key("carrier"));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let window = Window::ending_at(now, 30).unwrap();

        assert_eq!(window.first_full_day(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(window.cutoff.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(window.contains(window.cutoff));
        assert!(window.contains(now));
        assert!(!window.contains(window.cutoff - chrono::Duration::seconds(1)));
        assert!(!window.contains(now + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_afternoon_run_starts_on_the_next_day() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let window = Window::ending_at(now, 30).unwrap();

        assert_eq!(window.cutoff.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(window.first_full_day(), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        let june_first = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(!window.contains(june_first));
    }

    #[test]
    fn test_oversized_window_is_an_error() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let err = Window::ending_at(now, 100_000_000).unwrap_err();

        assert!(matches!(err, SyncError::InvalidConfigValueError { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}

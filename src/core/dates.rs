use crate::domain::model::RawRecord;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// The only accepted date layout: month/day/four-digit year, no time.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateVerdict {
    Accepted(NaiveDateTime),
    MissingDate,
    Unparsable,
    FutureDate,
}

pub fn extract_date(raw: &RawRecord, field: &str, now: NaiveDateTime) -> DateVerdict {
    let value = raw.get(field).unwrap_or_default().trim();
    if value.is_empty() {
        return DateVerdict::MissingDate;
    }

    let Some(date) = parse_feed_date(value) else {
        return DateVerdict::Unparsable;
    };

    let timestamp = date.and_time(NaiveTime::MIN);
    if timestamp > now {
        return DateVerdict::FutureDate;
    }

    DateVerdict::Accepted(timestamp)
}

fn parse_feed_date(value: &str) -> Option<NaiveDate> {
    // chrono's %Y also takes signed and 5+ digit years
    let year = value.rsplit('/').next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

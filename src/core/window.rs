use crate::core::dates::{extract_date, DateVerdict};
use crate::core::normalize::normalize_row;
use crate::domain::model::{DatedRecord, RawRecord, ResultSet, Window};
use crate::utils::error::Result;
use chrono::NaiveDateTime;

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Per-reason tallies for one pass. Excluded rows are only ever counted, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub scanned: u64,
    pub kept: u64,
    pub missing_date: u64,
    pub unparsable_date: u64,
    pub future_date: u64,
    pub outside_window: u64,
    pub malformed_rows: u64,
}

impl FilterStats {
    pub fn excluded(&self) -> u64 {
        self.missing_date
            + self.unparsable_date
            + self.future_date
            + self.outside_window
            + self.malformed_rows
    }
}

/// Streaming window filter. Feed it rows with [`WindowFilter::push`], then call
/// [`WindowFilter::finish`] once the source is exhausted. Only in-window rows are held.
#[derive(Debug, Clone)]
pub struct WindowFilter {
    window: Window,
    date_field: String,
    columns: Vec<String>,
    kept: Vec<DatedRecord>,
    stats: FilterStats,
}

impl WindowFilter {
    pub fn new(
        now: NaiveDateTime,
        window_days: i64,
        date_field: &str,
        columns: &[String],
    ) -> Result<Self> {
        Ok(Self {
            window: Window::ending_at(now, window_days)?,
            date_field: date_field.to_string(),
            columns: columns.to_vec(),
            kept: Vec::new(),
            stats: FilterStats::default(),
        })
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }

    pub fn push(&mut self, raw: &RawRecord) -> DateVerdict {
        let sequence = self.stats.scanned;
        self.stats.scanned += 1;

        let verdict = extract_date(raw, &self.date_field, self.window.now);
        match verdict {
            DateVerdict::MissingDate => self.stats.missing_date += 1,
            DateVerdict::Unparsable => self.stats.unparsable_date += 1,
            DateVerdict::FutureDate => self.stats.future_date += 1,
            DateVerdict::Accepted(timestamp) if timestamp < self.window.cutoff => {
                self.stats.outside_window += 1;
            }
            DateVerdict::Accepted(timestamp) => {
                self.stats.kept += 1;
                self.kept.push(DatedRecord {
                    timestamp,
                    sequence,
                    record: normalize_row(raw, &self.columns),
                });
            }
        }
        verdict
    }

    /// Counts a feed line that could not be decoded into a record at all.
    pub fn skip_malformed(&mut self) {
        self.stats.scanned += 1;
        self.stats.malformed_rows += 1;
    }

    pub fn finish(self) -> (ResultSet, FilterStats) {
        let mut kept = self.kept;
        kept.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(a.sequence.cmp(&b.sequence))
        });

        let rows = kept.into_iter().map(|dated| dated.record).collect();
        (ResultSet { rows }, self.stats)
    }
}

/// Convenience driver for sources that already are iterators.
pub fn filter_window<I>(
    records: I,
    now: NaiveDateTime,
    window_days: i64,
    date_field: &str,
    columns: &[String],
) -> Result<(ResultSet, FilterStats)>
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut filter = WindowFilter::new(now, window_days, date_field, columns)?;
    for raw in records {
        filter.push(&raw);
    }
    Ok(filter.finish())
}

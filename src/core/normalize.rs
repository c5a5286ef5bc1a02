use crate::domain::model::{CleanRecord, RawRecord};

/// Projects `raw` onto `columns` in order. Missing and null values become `""`; present
/// values are copied verbatim.
pub fn normalize_row(raw: &RawRecord, columns: &[String]) -> CleanRecord {
    columns
        .iter()
        .map(|column| raw.get(column).unwrap_or_default().to_string())
        .collect()
}

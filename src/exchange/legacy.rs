//! Legacy deadline parsing
//!
//! Schema version 1 stored goal deadlines as display strings, either
//! `dd/MM/yyyy` or `yyyy/MM/dd` (the year-first form also appears with `-`
//! separators). Newer schemas store epoch milliseconds.

use chrono::{Duration, Local, LocalResult, NaiveDate, TimeZone};
use tracing::debug;

/// Parse a legacy deadline string into epoch milliseconds at the start of
/// that day in the local zone.
///
/// Blank or unparseable input yields `0`, meaning "no deadline".
pub fn parse_legacy_deadline(raw: &str) -> i64 {
    parse_legacy_deadline_in(raw, &Local)
}

/// Same as [`parse_legacy_deadline`] with an explicit time zone
pub fn parse_legacy_deadline_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> i64 {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return 0;
    }

    let parsed = if is_year_first(normalized) {
        NaiveDate::parse_from_str(&normalized.replace('-', "/"), "%Y/%m/%d")
    } else if is_day_first(normalized) {
        NaiveDate::parse_from_str(normalized, "%d/%m/%Y")
    } else {
        debug!("Legacy deadline '{}' is not in a known layout", normalized);
        return 0;
    };

    let date = match parsed {
        Ok(date) => date,
        Err(e) => {
            debug!("Unparseable legacy deadline '{}': {}", normalized, e);
            return 0;
        }
    };

    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return 0;
    };

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        // Midnight skipped by a DST jump; the day starts an hour later
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(0),
    }
}

/// Matches `\d{4}[/-]\d{2}[/-]\d{2}`
fn is_year_first(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    let is_sep = |b: u8| b == b'/' || b == b'-';
    bytes.iter().enumerate().all(|(i, &b)| match i {
        4 | 7 => is_sep(b),
        _ => b.is_ascii_digit(),
    })
}

/// Matches `\d{2}/\d{2}/\d{4}`
fn is_day_first(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, &b)| match i {
            2 | 5 => b == b'/',
            _ => b.is_ascii_digit(),
        })
}

//! Review timestamp formatting.

use chrono::{DateTime, Local, TimeZone};

/// Formats an epoch-millisecond timestamp as `YYYY-MM-DD` in the local time zone.
pub fn format_review_date(millis: i64) -> String {
    format_review_date_in(millis, &Local)
}

/// Formats an epoch-millisecond timestamp as `YYYY-MM-DD` in the given time zone.
///
/// Timestamps outside the representable calendar range produce an empty string.
pub fn format_review_date_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(tz).date_naive().format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

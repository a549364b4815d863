//! Timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current Unix time in whole seconds
pub fn unix_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Parse a loosely formatted calendar date.
///
/// Accepts RFC 3339 timestamps and the common date layouts that show up in
/// transcribed speech ("1990-04-12", "04/12/1990", "April 12, 1990",
/// "12 April 1990"). Returns `None` when nothing matches.
pub fn parse_loose_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    const FORMATS: [&str; 6] = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%d %B %Y",
        "%Y/%m/%d",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

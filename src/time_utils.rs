// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z`
/// suffix. The fixed width keeps string order chronological.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as an RFC3339 string.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Parse an RFC3339 timestamp (any offset) into UTC.
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Whether a string is a full RFC3339 timestamp.
pub fn is_valid_iso_timestamp(value: &str) -> bool {
    parse_rfc3339(value).is_some()
}

/// Which end of a day a bare date bound refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBound {
    Start,
    End,
}

/// Normalize a date filter into the stored timestamp format.
///
/// Accepts a full RFC3339 timestamp or a bare `YYYY-MM-DD` date, which is
/// expanded to the first or last millisecond of that day.
pub fn normalize_date_bound(value: &str, bound: DayBound) -> Option<String> {
    if let Some(ts) = parse_rfc3339(value) {
        return Some(format_utc_rfc3339(ts));
    }

    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    let time = match bound {
        DayBound::Start => date.and_hms_opt(0, 0, 0)?,
        DayBound::End => date.and_hms_milli_opt(23, 59, 59, 999)?,
    };
    Some(format_utc_rfc3339(time.and_utc()))
}

//! Date buckets and the canonical timestamp encoding
//!
//! Every daily query is partitioned by a `YYYY-MM-DD` date bucket that is
//! derived once, at write time, from the caller's local wall clock. Reads never
//! re-derive a date from a stored timestamp.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format string of a date bucket
pub const DATE_BUCKET_FORMAT: &str = "%Y-%m-%d";

/// Date bucket of a timestamp, in the time zone the timestamp carries
///
/// Pass a `DateTime<Local>` (or a `FixedOffset` captured from the caller) so
/// the bucket matches the caller's calendar day.
pub fn date_bucket<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

/// Render a date bucket exactly as it is stored
pub fn format_date_bucket(date: NaiveDate) -> String {
    date.format(DATE_BUCKET_FORMAT).to_string()
}

/// Parse a stored date bucket
pub fn parse_date_bucket(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_BUCKET_FORMAT)
}

/// Canonical persisted form of an instant: RFC 3339, UTC, nanoseconds, `Z`
///
/// Fixed width, so lexical comparison in SQL matches chronological order.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a persisted timestamp back into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

//! Time and timestamp helpers.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// UTC timestamp used for `since` values and refresh stamps.
pub type Timestamp = DateTime<Utc>;

/// Display format for absolute dates (`DD.MM.YYYY, HH:MM:SS`).
const ABSOLUTE_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse a relay-reported timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) and integer epoch
/// milliseconds, in that order.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

/// Render a timestamp as an absolute local date.
#[must_use]
pub fn format_absolute(ts: Timestamp) -> String {
    ts.with_timezone(&Local).format(ABSOLUTE_FORMAT).to_string()
}

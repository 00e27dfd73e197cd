//! Humanised display of byte counts, rates and ages.

use crate::time::{Timestamp, format_absolute, parse_timestamp};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const STEP: f64 = 1024.0;

/// Placeholder for absent values.
pub const PLACEHOLDER: &str = "—";

/// Format a byte quantity using binary scale steps.
///
/// Past the first step, values under 10 units keep one decimal unless they
/// round to a whole number; everything else is rounded to an integer.
#[must_use]
pub fn format_bytes(bytes: f64) -> String {
    let mut value = if bytes.is_finite() { bytes.max(0.0) } else { 0.0 };
    let mut unit = 0;
    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }

    let label = UNITS[unit];
    if unit > 0 && value < 10.0 {
        let rounded = (value * 10.0).round() / 10.0;
        if (rounded - rounded.trunc()).abs() < f64::EPSILON {
            format!("{rounded:.0} {label}")
        } else {
            format!("{rounded:.1} {label}")
        }
    } else {
        format!("{:.0} {label}", value.round())
    }
}

/// Format a cumulative byte counter.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_count(bytes: u64) -> String {
    format_bytes(bytes as f64)
}

/// Format an upload/download rate pair, e.g. `↑ 1.5 KB/s · ↓ 0 B/s`.
#[must_use]
pub fn format_rate(up: f64, down: f64) -> String {
    format!("↑ {}/s · ↓ {}/s", format_bytes(up), format_bytes(down))
}

/// Format the age of a relay-reported timestamp relative to `now`.
///
/// Missing values render as [`PLACEHOLDER`]; unparseable ones verbatim.
/// Ages of a day or more render as an absolute local date.
#[must_use]
pub fn format_age(since: Option<&str>, now: Timestamp) -> String {
    let Some(raw) = since else {
        return PLACEHOLDER.to_string();
    };
    let Some(ts) = parse_timestamp(raw) else {
        return raw.to_string();
    };

    let secs = (now - ts).num_seconds().max(0);
    match secs {
        0..60 => format!("{secs} сек"),
        60..3600 => format!("{} мин", secs / 60),
        3600..86400 => format!("{} ч", secs / 3600),
        _ => format_absolute(ts),
    }
}

/// Format a relay-reported timestamp as an absolute local date.
#[must_use]
pub fn format_since(since: Option<&str>) -> Option<String> {
    let raw = since?;
    Some(parse_timestamp(raw).map_or_else(|| raw.to_string(), format_absolute))
}

//! Wall-clock helpers.

use chrono::{SecondsFormat, TimeZone, Utc};

/// Current wall time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Renders epoch milliseconds as an ISO-8601 UTC instant with millisecond
/// precision and a trailing `Z`, or `None` when out of range.
#[must_use]
pub fn millis_to_iso(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

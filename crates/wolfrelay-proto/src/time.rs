//! Server-side timestamps.

use chrono::{SecondsFormat, Utc};

/// Current time as an RFC 3339 UTC string with millisecond precision,
/// e.g. `2024-05-01T12:00:00.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

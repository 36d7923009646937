//! Timestamp decoding
//!
//! Accepted encodings:
//!
//! - `{"seconds": .., "nanoseconds": ..}` (also `_seconds` / `_nanoseconds`)
//! - RFC 3339 strings, plain `YYYY-MM-DD` dates (read as UTC midnight) and
//!   naive date-times (read in the local zone)
//! - Integer or float epoch milliseconds

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::fields::as_i64;

/// Decode a stored timestamp, returning `None` for anything unreadable
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    parse_timestamp_in(value, &Local)
}

/// Decode a stored timestamp, reading offset-less date-times in `tz`
pub fn parse_timestamp_in<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(as_i64)
                .unwrap_or(0)
                .clamp(0, 999_999_999);
            DateTime::from_timestamp(seconds, nanos as u32)
        }
        Value::String(s) => parse_text(s.trim(), tz),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_text<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"));
    if let Ok(naive) = naive {
        // a wall time skipped by a DST jump has no local instant; keep it as UTC
        let local = tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc));
        return Some(local.unwrap_or_else(|| naive.and_utc()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Encode a timestamp in the `{seconds, nanoseconds}` form
pub fn timestamp_to_value(ts: DateTime<Utc>) -> Value {
    json!({
        "seconds": ts.timestamp(),
        "nanoseconds": ts.timestamp_subsec_nanos(),
    })
}

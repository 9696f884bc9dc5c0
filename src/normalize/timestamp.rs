//! Timestamp normalization
//!
//! Upstream deployments encode creation times inconsistently: epoch seconds,
//! epoch milliseconds, numeric strings, ISO-8601 strings, or nothing at all.
//! Every representation collapses to epoch milliseconds here, and the
//! function never fails - unparseable input degrades to the current instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Values below this are treated as epoch seconds, at or above as millis
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalize an arbitrary temporal representation to epoch milliseconds
pub fn normalize_timestamp(raw: Option<&Value>) -> i64 {
    match raw {
        None | Some(Value::Null) => now_millis(),
        Some(Value::Number(n)) => from_number(n),
        Some(Value::String(s)) => from_string(s),
        Some(_) => now_millis(),
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_number(n: &serde_json::Number) -> i64 {
    if let Some(i) = n.as_i64() {
        return scale_epoch(i);
    }
    if let Some(f) = n.as_f64() {
        if f.is_finite() {
            return if f < MILLIS_THRESHOLD as f64 {
                (f * 1000.0) as i64
            } else {
                f as i64
            };
        }
    }
    now_millis()
}

fn from_string(s: &str) -> i64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return now_millis();
    }
    if let Some(millis) = parse_date(trimmed) {
        return millis;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return scale_epoch(n);
    }
    now_millis()
}

/// Accepts RFC 3339, RFC 2822, and the common naive forms; naive values are
/// read as UTC.
fn parse_date(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    None
}

fn scale_epoch(n: i64) -> i64 {
    if n < MILLIS_THRESHOLD {
        n.saturating_mul(1000)
    } else {
        n
    }
}

//! Defensive field access for upstream payloads.
//!
//! Upstream APIs rename fields across versions and omit them without
//! notice. Normalizers read every field through these fallback chains so
//! a missing or null value becomes a default instead of an error.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Whether `row` carries a non-null value under `key`.
pub fn has_field(row: &Value, key: &str) -> bool {
    row.get(key).is_some_and(|value| !value.is_null())
}

/// First present, non-null value found under any of `keys`.
pub fn first_value<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| row.get(*key).filter(|value| !value.is_null()))
}

/// First string value found under any of `keys`.
pub fn first_text<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| row.get(*key).and_then(Value::as_str))
}

/// First count found under any of `keys`, defaulting to zero.
///
/// A key wins as soon as it is present and non-null, even when its value
/// is zero or not numeric. Fractional counts are floored, negative ones
/// clamped to zero.
pub fn first_count(row: &Value, keys: &[&str]) -> u64 {
    first_value(row, keys).map(to_count).unwrap_or(0)
}

fn to_count(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|float| float.max(0.0) as u64))
        .unwrap_or(0)
}

/// RFC 3339 timestamp under `key`, normalized to UTC.
pub fn datetime_field(row: &Value, key: &str) -> Option<DateTime<Utc>> {
    row.get(key)
        .and_then(Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|stamp| stamp.with_timezone(&Utc))
}

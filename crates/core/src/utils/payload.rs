//! Normalization of rows read back from the backend.
//!
//! Backend rows are untrusted, partially typed JSON objects. Numeric money
//! fields may be null, strings or floats; dates may carry a time suffix.
//! These helpers coerce them into the core's typed model before use.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::errors::{Result, ValidationError};
use crate::utils::calendar::parse_ymd;

/// Reads an integer cents field; missing, null or unparseable values become 0.
pub fn cents_field(row: &Value, key: &str) -> i64 {
    match row.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

/// Reads an optional small integer (day of month, installment number).
pub fn opt_u32_field(row: &Value, key: &str) -> Option<u32> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Reads an optional cents field, keeping `null` distinct from zero.
pub fn opt_cents_field(row: &Value, key: &str) -> Option<i64> {
    match row.get(key) {
        None | Some(Value::Null) => None,
        Some(_) => Some(cents_field(row, key)),
    }
}

/// Reads a string field; numbers are stringified, null/missing yields None.
pub fn opt_string_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub fn string_field(row: &Value, key: &str) -> Result<String> {
    opt_string_field(row, key).ok_or_else(|| ValidationError::MissingField(key.to_string()).into())
}

/// Reads a strict `YYYY-MM-DD` field.
pub fn ymd_field(row: &Value, key: &str) -> Result<NaiveDate> {
    let text = string_field(row, key)?;
    parse_ymd(&text)
}

/// Reads the date prefix of a date or timestamp field (`2026-03-01T10:00:00Z`).
pub fn ymd_prefix_field(row: &Value, key: &str) -> Option<NaiveDate> {
    let text = opt_string_field(row, key)?;
    text.get(..10).and_then(|prefix| parse_ymd(prefix).ok())
}

/// Reads a timestamp field, accepting RFC 3339 or naive ISO text.
pub fn opt_timestamp_field(row: &Value, key: &str) -> Option<NaiveDateTime> {
    let text = opt_string_field(row, key)?;
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(&text) {
        return Some(parsed.naive_utc());
    }
    NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

pub fn bool_field(row: &Value, key: &str) -> bool {
    row.get(key).and_then(Value::as_bool).unwrap_or(false)
}

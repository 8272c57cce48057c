//! Row parsing helpers.
//!
//! Rows are column-indexed `libsql::Row`s; these helpers convert TEXT columns
//! into typed values and accept both RFC 3339 and `SQLite`'s default datetime
//! format.

use chrono::{DateTime, Utc};

use crate::error::PersistenceError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `PersistenceError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, PersistenceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| PersistenceError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with the revu-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `PersistenceError::Query` if the string does not match any variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, PersistenceError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| PersistenceError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// # Errors
///
/// Returns `PersistenceError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, PersistenceError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse a JSON TEXT column into `T`.
///
/// # Errors
///
/// Returns `PersistenceError::Query` naming the column on invalid JSON.
pub fn parse_json<T: serde::de::DeserializeOwned>(
    s: &str,
    column: &str,
) -> Result<T, PersistenceError> {
    serde_json::from_str(s)
        .map_err(|e| PersistenceError::Query(format!("Invalid JSON in column '{column}': {e}")))
}

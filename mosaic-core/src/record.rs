//! Typed field extraction from snapshot records.
//!
//! Snapshot rows are plain JSON objects produced by the entity store's
//! projection. These helpers pull typed values out of a row and report
//! field-level mapping errors when the shape does not match.

use crate::MappingError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

fn field<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    match record.get(name) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn missing(name: &str) -> MappingError {
    MappingError::RequiredFieldMissing {
        field: name.to_string(),
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> MappingError {
    MappingError::InvalidValue {
        field: name.to_string(),
        reason: reason.into(),
    }
}

/// Extract a required string field.
pub fn require_str<'a>(record: &'a Value, name: &str) -> Result<&'a str, MappingError> {
    field(record, name)
        .ok_or_else(|| missing(name))?
        .as_str()
        .ok_or_else(|| invalid(name, "expected a string"))
}

/// Extract a required UUID field.
pub fn require_uuid(record: &Value, name: &str) -> Result<Uuid, MappingError> {
    let raw = require_str(record, name)?;
    Uuid::parse_str(raw).map_err(|e| invalid(name, format!("not a valid uuid: {}", e)))
}

/// Extract a required floating point field. Integers are widened.
pub fn require_f64(record: &Value, name: &str) -> Result<f64, MappingError> {
    field(record, name)
        .ok_or_else(|| missing(name))?
        .as_f64()
        .ok_or_else(|| invalid(name, "expected a number"))
}

/// Extract a required small unsigned integer field (e.g. display precision).
pub fn require_u16(record: &Value, name: &str) -> Result<u16, MappingError> {
    let raw = field(record, name)
        .ok_or_else(|| missing(name))?
        .as_i64()
        .ok_or_else(|| invalid(name, "expected an integer"))?;
    u16::try_from(raw).map_err(|_| invalid(name, "out of range"))
}

/// Extract an optional string field. Absent and null both map to `None`.
pub fn opt_str(record: &Value, name: &str) -> Result<Option<String>, MappingError> {
    match field(record, name) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(name, "expected a string or null")),
    }
}

/// Extract an optional UUID field.
pub fn opt_uuid(record: &Value, name: &str) -> Result<Option<Uuid>, MappingError> {
    match opt_str(record, name)? {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(&raw)
            .map(Some)
            .map_err(|e| invalid(name, format!("not a valid uuid: {}", e))),
    }
}

/// Extract an optional RFC 3339 timestamp field.
pub fn opt_timestamp(record: &Value, name: &str) -> Result<Option<DateTime<Utc>>, MappingError> {
    match opt_str(record, name)? {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| invalid(name, format!("not a valid timestamp: {}", e))),
    }
}

/// Extract an integer field, defaulting when absent or null.
pub fn int_or(record: &Value, name: &str, default: i32) -> Result<i32, MappingError> {
    match field(record, name) {
        None => Ok(default),
        Some(value) => {
            let raw = value
                .as_i64()
                .ok_or_else(|| invalid(name, "expected an integer"))?;
            i32::try_from(raw).map_err(|_| invalid(name, "out of range"))
        }
    }
}

/// Extract a boolean field, defaulting when absent or null.
pub fn bool_or(record: &Value, name: &str, default: bool) -> Result<bool, MappingError> {
    match field(record, name) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid(name, "expected a boolean")),
    }
}

/// Extract a list of UUIDs. Absent and null both map to an empty list.
pub fn uuid_list(record: &Value, name: &str) -> Result<Vec<Uuid>, MappingError> {
    let values = match field(record, name) {
        None => return Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .ok_or_else(|| invalid(name, "expected a list"))?,
    };

    values
        .iter()
        .map(|item| {
            let raw = item
                .as_str()
                .ok_or_else(|| invalid(name, "expected a list of uuid strings"))?;
            Uuid::parse_str(raw).map_err(|e| invalid(name, format!("not a valid uuid: {}", e)))
        })
        .collect()
}

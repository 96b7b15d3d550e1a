//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper reports failures as `invalid_request` errors whose `details`
//! name the offending field, a machine-readable code, and the rejected value.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::{AttendanceDay, AttendanceStatus, Error};

const MISSING_FIELD: &str = "missing_field";
const INVALID_UUID: &str = "invalid_uuid";
const INVALID_DATE: &str = "invalid_date";
const INVALID_STATUS: &str = "invalid_status";
const INVALID_BODY: &str = "invalid_body";

/// JSON name of a request field, as echoed in error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn reject(self, reason: &str, message: impl Into<String>) -> Error {
        Error::invalid_field(self.0, reason, message)
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field.reject(MISSING_FIELD, format!("missing required field: {field}"))
}

/// Unwrap an optional body field or report it missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Error for request bodies that fail to deserialise.
pub(crate) fn invalid_body_error(reason: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("request body is invalid: {reason}"))
        .with_detail("code", INVALID_BODY)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        field
            .reject(INVALID_UUID, format!("{field} must be a valid UUID"))
            .with_detail("value", value)
    })
}

pub(crate) fn parse_uuid_list(values: &[String], field: FieldName) -> Result<Vec<Uuid>, Error> {
    let mut ids = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let id = Uuid::parse_str(value.trim()).map_err(|_| {
            field
                .reject(INVALID_UUID, format!("{field} must contain valid UUIDs"))
                .with_detail("index", index)
                .with_detail("value", value.as_str())
        })?;
        ids.push(id);
    }
    Ok(ids)
}

pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<AttendanceStatus, Error> {
    value.trim().parse().map_err(|_| {
        field
            .reject(
                INVALID_STATUS,
                format!("{field} must be one of present, absent, late"),
            )
            .with_detail("value", value)
    })
}

/// Parse a calendar date or an RFC 3339 timestamp into a UTC instant.
///
/// Bare dates resolve to midnight UTC.
pub(crate) fn parse_instant(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field
                .reject(
                    INVALID_DATE,
                    format!("{field} must be a YYYY-MM-DD date or an RFC 3339 timestamp"),
                )
                .with_detail("value", value)
        })
}

pub(crate) fn parse_optional_instant(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value.map(|raw| parse_instant(raw, field)).transpose()
}

/// Parse a date filter bound, truncating timestamps to their UTC day.
pub(crate) fn parse_optional_day(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<AttendanceDay>, Error> {
    parse_optional_instant(value, field).map(|instant| instant.map(AttendanceDay::from_instant))
}

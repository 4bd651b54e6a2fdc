//! Field parsing shared by the request inputs
//!
//! Identifiers, timestamps and statuses arrive as strings so a bad value
//! becomes a 400 naming the field instead of a body rejection.

use chrono::{DateTime, Utc};
use shared::{parse_id, parse_optional_timestamp, parse_timestamp, OrderStatus};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub fn required_id(field: &str, raw: &str) -> AppResult<Uuid> {
    parse_id(raw).map_err(|msg| AppError::validation(field, msg))
}

/// Blank query parameters are treated as absent
pub fn optional_id(field: &str, raw: Option<&str>) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required_id(field, value).map(Some),
    }
}

pub fn required_timestamp(field: &str, raw: &str) -> AppResult<DateTime<Utc>> {
    parse_timestamp(raw).map_err(|msg| AppError::validation(field, msg))
}

pub fn optional_timestamp(field: &str, raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    parse_optional_timestamp(raw).map_err(|msg| AppError::validation(field, msg))
}

pub fn required_status(field: &str, raw: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(raw).map_err(|err| AppError::validation(field, err.to_string()))
}

pub fn optional_status(field: &str, raw: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required_status(field, value).map(Some),
    }
}

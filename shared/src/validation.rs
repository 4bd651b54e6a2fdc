//! Validation utilities for inventory requests
//!
//! Every check here runs before any mutation, so a failure has no side effects.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// ============================================================================
// Identifiers and dates
// ============================================================================

/// Parse a record identifier
pub fn parse_id(raw: &str) -> Result<Uuid, &'static str> {
    Uuid::parse_str(raw.trim()).map_err(|_| "Identifier is not a valid UUID")
}

/// Parse an RFC 3339 timestamp (fractional seconds allowed)
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, &'static str> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| "Timestamp must be in RFC 3339 format")
}

/// Parse an optional timestamp; absent or blank values yield `None`
pub fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, &'static str> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value).map(Some),
    }
}

// ============================================================================
// Quantities and amounts
// ============================================================================

/// Upper bound for any single quantity a caller may submit
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Line item quantities must be positive
pub fn validate_item_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Item quantity must be positive");
    }
    if quantity > MAX_QUANTITY {
        return Err("Item quantity is too large");
    }
    Ok(())
}

/// Stock levels may be zero but never negative
pub fn validate_stock_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Stock quantity cannot be negative");
    }
    if quantity > MAX_QUANTITY {
        return Err("Stock quantity is too large");
    }
    Ok(())
}

/// Prices and line totals cannot be negative
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Unit price times quantity, rejected if it overflows
pub fn line_total(unit_price: Decimal, quantity: i64) -> Result<Decimal, &'static str> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or("Line total is out of range")
}

/// Sum of amounts, `None` on overflow
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

/// A caller-supplied order total must match the sum of its line totals
pub fn validate_declared_total(declared: Option<Decimal>, computed: Decimal) -> Result<(), &'static str> {
    match declared {
        Some(total) if total != computed => Err("Total amount does not match the sum of line totals"),
        _ => Ok(()),
    }
}

//! Edge parsing from loose wire orders into [`RawTransaction`].
//!
//! An order that lacks its id, location or completion time is rejected as a
//! whole. A line item with an unusable quantity or price is rejected on its
//! own; its siblings still go through.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use salesdb_core::ValidationError;

use crate::types::{WireLineItem, WireModifier, WireOrder};

/// Placeholder order id used in errors for orders that carried none.
pub const MISSING_ORDER_ID: &str = "<missing>";

/// A completed order as extracted from Square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub order_id: String,
    /// Square location id.
    pub location_id: String,
    pub closed_at: DateTime<Utc>,
    pub line_items: Vec<RawLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLineItem {
    /// Zero-based position within the order.
    pub position: i32,
    pub name: String,
    /// Unit base price in cents.
    pub base_price_cents: i64,
    pub quantity: i64,
    pub variation_name: Option<String>,
    pub modifiers: Vec<RawModifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModifier {
    pub name: String,
    pub base_price_cents: i64,
}

/// An accepted order plus the line items that were rejected from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOrder {
    pub transaction: RawTransaction,
    pub rejected_items: Vec<ValidationError>,
}

/// Parses one wire order.
///
/// # Errors
///
/// Returns an order-scoped [`ValidationError`] when the id, location id or
/// `closed_at` is missing, or `closed_at` is not RFC 3339.
pub fn parse_order(order: WireOrder) -> Result<ParsedOrder, ValidationError> {
    let Some(order_id) = order.id.filter(|id| !id.trim().is_empty()) else {
        return Err(ValidationError::order(MISSING_ORDER_ID, "missing order id"));
    };

    let Some(location_id) = order.location_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ValidationError::order(order_id, "missing location_id"));
    };

    let Some(closed_at_raw) = order.closed_at else {
        return Err(ValidationError::order(order_id, "missing closed_at"));
    };
    let closed_at = match DateTime::parse_from_rfc3339(closed_at_raw.trim()) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            return Err(ValidationError::order(
                order_id,
                format!("unparseable closed_at \"{closed_at_raw}\": {e}"),
            ))
        }
    };

    let mut line_items = Vec::new();
    let mut rejected_items = Vec::new();
    for (idx, item) in order.line_items.unwrap_or_default().into_iter().enumerate() {
        let position = i32::try_from(idx).unwrap_or(i32::MAX);
        match parse_line_item(item, position) {
            Ok(line) => line_items.push(line),
            Err(reason) => {
                rejected_items.push(ValidationError::line_item(&order_id, position, reason));
            }
        }
    }

    Ok(ParsedOrder {
        transaction: RawTransaction {
            order_id,
            location_id,
            closed_at,
            line_items,
        },
        rejected_items,
    })
}

fn parse_line_item(item: WireLineItem, position: i32) -> Result<RawLineItem, String> {
    let quantity = match item.quantity.as_deref() {
        Some(raw) => parse_quantity(raw)?,
        None => return Err("missing quantity".to_owned()),
    };

    let Some(base_price_cents) = item.base_price_money.and_then(|m| m.amount) else {
        return Err("missing base_price_money.amount".to_owned());
    };

    Ok(RawLineItem {
        position,
        name: item.name.unwrap_or_default(),
        base_price_cents,
        quantity,
        variation_name: item.variation_name,
        modifiers: item
            .modifiers
            .unwrap_or_default()
            .into_iter()
            .map(parse_modifier)
            .collect(),
    })
}

/// Accepts `"3"` and `"3.000"`; rejects fractional and non-numeric values.
fn parse_quantity(raw: &str) -> Result<i64, String> {
    let trimmed = raw.trim();
    if let Ok(whole) = trimmed.parse::<i64>() {
        return Ok(whole);
    }
    let decimal =
        Decimal::from_str(trimmed).map_err(|_| format!("quantity \"{raw}\" is not a number"))?;
    if !decimal.fract().is_zero() {
        return Err(format!("quantity \"{raw}\" is not a whole number"));
    }
    decimal
        .to_i64()
        .ok_or_else(|| format!("quantity \"{raw}\" is out of range"))
}

fn parse_modifier(modifier: WireModifier) -> RawModifier {
    RawModifier {
        name: modifier.name.unwrap_or_default(),
        base_price_cents: modifier
            .base_price_money
            .and_then(|m| m.amount)
            .unwrap_or(0),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;

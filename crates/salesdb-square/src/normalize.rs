//! Transformation from [`RawTransaction`] to [`NormalizedSale`].
//!
//! One sale per line item. Faults are isolated to the line item they occur
//! in: a rejected item is recorded in [`TransformOutput::errors`] and the
//! rest of the order is still transformed.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use salesdb_core::{
    month_bucket, to_business_time, weekday_name, LocationResolver, NormalizedSale, RunError,
    ValidationError, NOT_APPLICABLE_CATEGORY,
};

use crate::parse::{RawLineItem, RawTransaction};

/// Per-run transformation settings.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub timezone: Tz,
    /// Lowercase substrings; a line item whose lowercased name contains any
    /// of them is skipped.
    pub ignored_items: Vec<String>,
    /// Skip line items whose base price is zero.
    pub skip_zero_price: bool,
}

impl TransformOptions {
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            ignored_items: Vec::new(),
            skip_zero_price: false,
        }
    }

    fn is_ignored(&self, item: &RawLineItem) -> bool {
        if self.skip_zero_price && item.base_price_cents == 0 {
            return true;
        }
        if self.ignored_items.is_empty() {
            return false;
        }
        let name = item.name.to_lowercase();
        self.ignored_items
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
    }
}

#[derive(Debug, Default)]
pub struct TransformOutput {
    pub sales: Vec<NormalizedSale>,
    pub errors: Vec<RunError>,
    /// Line items excluded by the ignore rules.
    pub skipped: usize,
}

impl TransformOutput {
    fn absorb(&mut self, other: TransformOutput) {
        self.sales.extend(other.sales);
        self.errors.extend(other.errors);
        self.skipped += other.skipped;
    }
}

/// Transforms every line item of one transaction.
pub fn transform_transaction<R: LocationResolver + ?Sized>(
    tx: &RawTransaction,
    resolver: &R,
    options: &TransformOptions,
) -> TransformOutput {
    let mut out = TransformOutput::default();
    let resolved = resolver.resolve(&tx.location_id);

    let local = to_business_time(tx.closed_at, options.timezone);
    let month = month_bucket(&local);
    let day_of_week = weekday_name(&local);

    for item in &tx.line_items {
        if options.is_ignored(item) {
            out.skipped += 1;
            continue;
        }

        let location_id = match &resolved {
            Ok(id) => *id,
            Err(unknown) => {
                out.errors.push(RunError::UnknownLocation {
                    order_id: tx.order_id.clone(),
                    position: item.position,
                    source: unknown.clone(),
                });
                continue;
            }
        };

        let (item_name, quantity) = match validate_line_item(&tx.order_id, item) {
            Ok(valid) => valid,
            Err(err) => {
                tracing::debug!(
                    order_id = %tx.order_id,
                    position = item.position,
                    error = %err,
                    "line item rejected"
                );
                out.errors.push(err.into());
                continue;
            }
        };

        out.sales.push(NormalizedSale {
            external_order_id: tx.order_id.clone(),
            line_item_position: item.position,
            item_name,
            sale_price: Decimal::new(item.base_price_cents, 2),
            quantity,
            sale_timestamp: local,
            month: month.clone(),
            day_of_week: day_of_week.clone(),
            item_category: category(item),
            location_id,
            external_location_id: tx.location_id.clone(),
            modifiers: revenue_modifiers(item),
        });
    }

    out
}

/// Transforms a whole extraction, preserving transaction and line order.
pub fn transform_all<R: LocationResolver + ?Sized>(
    transactions: &[RawTransaction],
    resolver: &R,
    options: &TransformOptions,
) -> TransformOutput {
    let mut out = TransformOutput::default();
    for tx in transactions {
        out.absorb(transform_transaction(tx, resolver, options));
    }
    out
}

fn validate_line_item(order_id: &str, item: &RawLineItem) -> Result<(String, i32), ValidationError> {
    if item.name.is_empty() {
        return Err(ValidationError::line_item(
            order_id,
            item.position,
            "item name is empty",
        ));
    }
    if item.quantity <= 0 {
        return Err(ValidationError::line_item(
            order_id,
            item.position,
            format!("quantity must be positive, got {}", item.quantity),
        ));
    }
    let Ok(quantity) = i32::try_from(item.quantity) else {
        return Err(ValidationError::line_item(
            order_id,
            item.position,
            format!("quantity {} is out of range", item.quantity),
        ));
    };
    if item.base_price_cents < 0 {
        return Err(ValidationError::line_item(
            order_id,
            item.position,
            format!("base price must not be negative, got {}", item.base_price_cents),
        ));
    }
    Ok((item.name.clone(), quantity))
}

fn category(item: &RawLineItem) -> String {
    item.variation_name
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_APPLICABLE_CATEGORY)
        .to_owned()
}

fn revenue_modifiers(item: &RawLineItem) -> String {
    item.modifiers
        .iter()
        .filter(|m| m.base_price_cents > 0 && !m.name.is_empty())
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

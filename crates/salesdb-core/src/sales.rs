use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category recorded for line items without a variation label.
pub const NOT_APPLICABLE_CATEGORY: &str = "N/A";

/// One sold line item, ready to be written to the `sales` table.
///
/// Identity is `(location_id, external_order_id, line_item_position)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSale {
    pub external_order_id: String,
    pub line_item_position: i32,
    pub item_name: String,
    /// Base price in major units. Tax, tip and service charges are excluded.
    pub sale_price: Decimal,
    pub quantity: i32,
    /// Completion time in the business zone.
    pub sale_timestamp: DateTime<FixedOffset>,
    /// `YYYY-MM` of `sale_timestamp`.
    pub month: String,
    pub day_of_week: String,
    pub item_category: String,
    pub location_id: i64,
    pub external_location_id: String,
    /// Names of priced modifiers, comma separated.
    pub modifiers: String,
}

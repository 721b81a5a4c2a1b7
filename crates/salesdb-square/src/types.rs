//! Square Orders API wire types for `POST /v2/orders/search`.
//!
//! Response types are deliberately loose: every field is optional and
//! absent arrays decode as `None`. Strict checks happen in
//! [`crate::parse`], where a bad order or line item can be rejected on its
//! own without failing the whole page.
//!
//! ### Money
//! `{"amount": 450, "currency": "USD"}`. `amount` is an integer in the
//! currency's smallest unit (cents).
//!
//! ### Quantity
//! Always a string, e.g. `"1"` or `"2.000"`. Weighted items can carry
//! fractional quantities such as `"0.5"`.
//!
//! ### Timestamps
//! RFC 3339 in UTC with millisecond precision, e.g.
//! `"2025-10-03T17:45:12.345Z"`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Request body for `POST /orders/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOrdersRequest {
    pub location_ids: Vec<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub query: SearchOrdersQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOrdersQuery {
    pub filter: SearchOrdersFilter,
    pub sort: SearchOrdersSort,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOrdersFilter {
    pub state_filter: StateFilter,
    pub date_time_filter: DateTimeFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateFilter {
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateTimeFilter {
    pub closed_at: TimeRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub start_at: String,
    pub end_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOrdersSort {
    pub sort_field: String,
    pub sort_order: String,
}

impl SearchOrdersRequest {
    /// Completed orders of one location closed within `[start, end]`,
    /// oldest first.
    #[must_use]
    pub fn completed_between(
        location_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
        cursor: Option<String>,
    ) -> Self {
        Self {
            location_ids: vec![location_id.to_owned()],
            limit,
            cursor,
            query: SearchOrdersQuery {
                filter: SearchOrdersFilter {
                    state_filter: StateFilter {
                        states: vec!["COMPLETED".to_owned()],
                    },
                    date_time_filter: DateTimeFilter {
                        closed_at: TimeRange {
                            start_at: start.to_rfc3339_opts(SecondsFormat::Millis, true),
                            end_at: end.to_rfc3339_opts(SecondsFormat::Millis, true),
                        },
                    },
                },
                sort: SearchOrdersSort {
                    sort_field: "CLOSED_AT".to_owned(),
                    sort_order: "ASC".to_owned(),
                },
            },
        }
    }
}

/// Response body of `POST /orders/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchOrdersResponse {
    pub orders: Option<Vec<WireOrder>>,
    /// Present while more pages remain.
    pub cursor: Option<String>,
    pub errors: Option<Vec<WireApiError>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireOrder {
    pub id: Option<String>,
    pub location_id: Option<String>,
    pub state: Option<String>,
    pub closed_at: Option<String>,
    pub line_items: Option<Vec<WireLineItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireLineItem {
    pub uid: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<String>,
    /// Variation label, e.g. `"Large"`; used as the item category.
    pub variation_name: Option<String>,
    pub base_price_money: Option<Money>,
    pub modifiers: Option<Vec<WireModifier>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireModifier {
    pub name: Option<String>,
    pub base_price_money: Option<Money>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Money {
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

/// Entry of the `errors` array Square returns with 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireApiError {
    pub category: Option<String>,
    pub code: Option<String>,
    pub detail: Option<String>,
}

impl WireApiError {
    /// `"CODE: detail"`, or whichever half is present.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.code, &self.detail) {
            (Some(code), Some(detail)) => format!("{code}: {detail}"),
            (Some(code), None) => code.clone(),
            (None, Some(detail)) => detail.clone(),
            (None, None) => self
                .category
                .clone()
                .unwrap_or_else(|| "unknown error".to_owned()),
        }
    }
}

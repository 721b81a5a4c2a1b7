//! Errors recorded during an ETL run.
//!
//! None of these abort a run on their own. They are collected into each
//! location's [`crate::RunResult`] and the location status is derived from
//! the counters that accompany them.

use thiserror::Error;

/// Where in an order a validation failure was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationScope {
    Order,
    /// Zero-based position of the line item within the order.
    LineItem(i32),
}

impl std::fmt::Display for ValidationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationScope::Order => write!(f, "order"),
            ValidationScope::LineItem(position) => write!(f, "line {position}"),
        }
    }
}

/// A record (order or line item) that could not be turned into a sale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {scope} in order {order_id}: {reason}")]
pub struct ValidationError {
    /// `"<missing>"` when the order itself carried no id.
    pub order_id: String,
    pub scope: ValidationScope,
    pub reason: String,
}

impl ValidationError {
    pub fn order(order_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            scope: ValidationScope::Order,
            reason: reason.into(),
        }
    }

    pub fn line_item(order_id: impl Into<String>, position: i32, reason: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            scope: ValidationScope::LineItem(position),
            reason: reason.into(),
        }
    }
}

/// An external location id with no matching row in the location registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown external location id '{external_location_id}'")]
pub struct UnknownLocation {
    pub external_location_id: String,
}

/// How an extraction gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFailureKind {
    /// Network or 5xx failures outlasted the retry budget.
    Transient,
    /// 429 responses outlasted the retry budget.
    RateLimited,
    /// Credentials or request rejected; never retried.
    Fatal,
}

impl std::fmt::Display for ExtractionFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionFailureKind::Transient => write!(f, "transient"),
            ExtractionFailureKind::RateLimited => write!(f, "rate limited"),
            ExtractionFailureKind::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("extraction failed ({kind}) after {attempts} attempt(s): {message}")]
    Extraction {
        kind: ExtractionFailureKind,
        attempts: u32,
        message: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("order {order_id} line {position}: {source}")]
    UnknownLocation {
        order_id: String,
        position: i32,
        source: UnknownLocation,
    },

    #[error("load batch {batch} ({rows} rows) rolled back: {cause}")]
    LoadBatch {
        batch: usize,
        rows: usize,
        cause: String,
    },

    #[error("run cancelled before the location finished")]
    Cancelled,
}

impl RunError {
    /// Row-scoped errors are absorbed into statistics and never change a
    /// location's status.
    #[must_use]
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            RunError::Validation(_) | RunError::UnknownLocation { .. }
        )
    }
}

//! Run parameters and per-location outcomes.

use serde::Serialize;

use crate::calendar::DateRange;
use crate::errors::RunError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Full,
    /// Caps each location's extraction at `max_orders` orders.
    Sample { max_orders: usize },
}

impl RunMode {
    #[must_use]
    pub fn order_cap(&self) -> Option<usize> {
        match self {
            RunMode::Full => None,
            RunMode::Sample { max_orders } => Some(*max_orders),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationScope {
    All,
    /// A single location by internal id.
    Only(i64),
}

/// Everything the orchestrator needs to know about one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub mode: RunMode,
    pub scope: LocationScope,
    pub range: DateRange,
    /// Extract and transform only; nothing is written.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    Success,
    Partial,
    Failed,
}

impl std::fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationStatus::Success => write!(f, "success"),
            LocationStatus::Partial => write!(f, "partial"),
            LocationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Overall outcome of a run across all locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

impl RunStatus {
    /// Success when every location succeeded; failed when none did (or
    /// there were no locations at all); partial otherwise.
    #[must_use]
    pub fn aggregate<'a>(results: impl IntoIterator<Item = &'a RunResult>) -> Self {
        let mut total = 0usize;
        let mut succeeded = 0usize;
        let mut any_progress = false;
        for result in results {
            total += 1;
            match result.status() {
                LocationStatus::Success => {
                    succeeded += 1;
                    any_progress = true;
                }
                LocationStatus::Partial => any_progress = true,
                LocationStatus::Failed => {}
            }
        }

        if total > 0 && succeeded == total {
            RunStatus::Success
        } else if any_progress {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self == RunStatus::Success
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Partial => write!(f, "partial"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Counters and errors for one location's pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub location_id: i64,
    pub location_name: String,
    pub orders_fetched: usize,
    pub sales_transformed: usize,
    pub sales_loaded: u64,
    /// Rows already present under the same natural key.
    pub duplicates: u64,
    /// Line items excluded by the ignore rules.
    pub skipped: usize,
    pub batches_attempted: usize,
    pub batches_failed: usize,
    pub extraction_failed: bool,
    pub cancelled: bool,
    pub errors: Vec<RunError>,
}

impl RunResult {
    #[must_use]
    pub fn new(location_id: i64, location_name: impl Into<String>) -> Self {
        Self {
            location_id,
            location_name: location_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn status(&self) -> LocationStatus {
        let committed = self.batches_attempted > self.batches_failed;

        if self.extraction_failed && self.orders_fetched == 0 {
            return LocationStatus::Failed;
        }
        if self.batches_attempted > 0 && self.batches_failed == self.batches_attempted {
            return LocationStatus::Failed;
        }
        if self.cancelled {
            return if committed {
                LocationStatus::Partial
            } else {
                LocationStatus::Failed
            };
        }
        if self.extraction_failed || self.batches_failed > 0 {
            return LocationStatus::Partial;
        }
        LocationStatus::Success
    }

    /// Validation and unknown-location errors.
    #[must_use]
    pub fn row_error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_row_scoped()).count()
    }
}

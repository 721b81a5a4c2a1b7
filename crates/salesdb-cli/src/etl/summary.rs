//! End-of-run report.

use std::fmt::Write as _;
use std::time::Duration;

use salesdb_core::{DateRange, RunResult, RunStatus};
use uuid::Uuid;

/// Errors listed per location; the rest are only counted.
const MAX_LISTED_ERRORS: usize = 10;

pub(crate) struct RunSummary {
    pub run_id: Uuid,
    pub range: DateRange,
    pub results: Vec<RunResult>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub(crate) fn new(
        run_id: Uuid,
        range: DateRange,
        results: Vec<RunResult>,
        elapsed: Duration,
    ) -> Self {
        Self {
            run_id,
            range,
            results,
            elapsed,
        }
    }

    pub(crate) fn status(&self) -> RunStatus {
        RunStatus::aggregate(&self.results)
    }

    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "run {} ({})", self.run_id, self.range);

        for r in &self.results {
            let _ = writeln!(
                out,
                "  {} [{}]: fetched {}, transformed {}, loaded {}, duplicates {}, skipped {}, errors {}",
                r.location_name,
                r.status(),
                r.orders_fetched,
                r.sales_transformed,
                r.sales_loaded,
                r.duplicates,
                r.skipped,
                r.errors.len(),
            );
            for err in r.errors.iter().take(MAX_LISTED_ERRORS) {
                let _ = writeln!(out, "    - {err}");
            }
            if r.errors.len() > MAX_LISTED_ERRORS {
                let _ = writeln!(
                    out,
                    "    ... and {} more",
                    r.errors.len() - MAX_LISTED_ERRORS
                );
            }
        }

        let loaded: u64 = self.results.iter().map(|r| r.sales_loaded).sum();
        let duplicates: u64 = self.results.iter().map(|r| r.duplicates).sum();
        let errors: usize = self.results.iter().map(|r| r.errors.len()).sum();
        let _ = writeln!(
            out,
            "status {}: {} locations, loaded {loaded}, duplicates {duplicates}, errors {errors}, elapsed {:.1}s",
            self.status(),
            self.results.len(),
            self.elapsed.as_secs_f64(),
        );
        out
    }
}

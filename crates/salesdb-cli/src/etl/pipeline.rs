//! Per-location extract → transform → load.

use futures::stream::{self, StreamExt};
use salesdb_core::{Location, LocationCache, RunConfig, RunError, RunResult};
use salesdb_square::{transform_all, OrderQuery, SquareClient, TransformOptions};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Shared, read-only state for every location of one run.
pub(crate) struct PipelineContext<'a> {
    pub pool: &'a PgPool,
    pub client: &'a SquareClient,
    pub cache: &'a LocationCache,
    pub options: &'a TransformOptions,
    pub run: &'a RunConfig,
    pub page_limit: u32,
    pub batch_size: usize,
    pub cancel: &'a CancellationToken,
}

/// Runs up to `max_concurrent` locations at once. Results come back sorted
/// by location id.
pub(crate) async fn run_locations(
    ctx: &PipelineContext<'_>,
    locations: &[Location],
    max_concurrent: usize,
) -> Vec<RunResult> {
    let mut results: Vec<RunResult> = stream::iter(locations)
        .map(|location| run_location(ctx, location))
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;
    results.sort_by_key(|r| r.location_id);
    results
}

/// One location's pipeline. Never fails; every problem lands in the
/// returned [`RunResult`].
pub(crate) async fn run_location(ctx: &PipelineContext<'_>, location: &Location) -> RunResult {
    let mut result = RunResult::new(location.id, location.name.clone());
    let (start, end) = ctx.run.range.to_utc_bounds(ctx.options.timezone);

    let query = OrderQuery {
        location_id: location.external_id.clone(),
        start,
        end,
        page_limit: ctx.page_limit,
        max_orders: ctx.run.mode.order_cap(),
    };
    let extraction = ctx.client.extract_orders(query, ctx.cancel).await;

    result.orders_fetched = extraction.orders_fetched;
    result
        .errors
        .extend(extraction.rejected.into_iter().map(RunError::from));
    if let Some(err) = extraction.error {
        if err.is_cancelled() {
            result.cancelled = true;
            result.errors.push(RunError::Cancelled);
        } else {
            result.extraction_failed = true;
            result.errors.push(RunError::Extraction {
                kind: err.kind(),
                attempts: err.attempts(),
                message: err.to_string(),
            });
        }
    }

    let transformed = transform_all(&extraction.transactions, ctx.cache, ctx.options);
    result.sales_transformed = transformed.sales.len();
    result.skipped = transformed.skipped;
    result.errors.extend(transformed.errors);

    if ctx.run.dry_run || transformed.sales.is_empty() {
        log_result(&result);
        return result;
    }

    let report = salesdb_db::load_sales(
        ctx.pool,
        ctx.cache,
        transformed.sales,
        ctx.batch_size,
        ctx.cancel,
    )
    .await;

    result.sales_loaded = report.inserted;
    result.duplicates = report.duplicates;
    result.batches_attempted = report.batches_attempted;
    result.batches_failed = report.batches_failed;
    result.errors.extend(report.errors);
    if report.cancelled && !result.cancelled {
        result.cancelled = true;
        result.errors.push(RunError::Cancelled);
    }

    log_result(&result);
    result
}

fn log_result(result: &RunResult) {
    tracing::info!(
        location = %result.location_name,
        status = %result.status(),
        fetched = result.orders_fetched,
        transformed = result.sales_transformed,
        loaded = result.sales_loaded,
        duplicates = result.duplicates,
        skipped = result.skipped,
        errors = result.errors.len(),
        "location finished"
    );
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

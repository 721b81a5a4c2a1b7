//! `etl` command: extract, transform and load every location in scope.
//!
//! Locations are processed through [`pipeline::run_locations`]; a failing
//! location is recorded in its `RunResult` and never aborts the others.

mod pipeline;
mod signal;
mod summary;

use std::time::Instant;

use chrono::NaiveDate;
use salesdb_core::{
    previous_month_range, today_in, AppConfig, DateRange, Location, LocationCache, LocationScope,
    RunConfig, RunMode, RunStatus,
};
use salesdb_square::{RetryPolicy, SquareClient, TransformOptions};
use tokio_util::sync::CancellationToken;

pub(crate) use pipeline::{run_locations, PipelineContext};
pub(crate) use summary::RunSummary;

/// Raw `etl` flags, before defaults from config are applied.
#[derive(Debug, Clone, Default)]
pub(crate) struct EtlArgs {
    pub sample: bool,
    pub location: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub dry_run: bool,
}

/// Picks the explicit range when both ends are given, otherwise the previous
/// calendar month relative to `today`.
pub(crate) fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> anyhow::Result<DateRange> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange::new(start, end)?),
        (None, None) => Ok(previous_month_range(today)),
        _ => anyhow::bail!("--start and --end must be given together"),
    }
}

pub(crate) fn build_run_config(
    config: &AppConfig,
    args: &EtlArgs,
    today: NaiveDate,
) -> anyhow::Result<RunConfig> {
    let mode = if args.sample {
        RunMode::Sample {
            max_orders: config.sample_order_limit,
        }
    } else {
        RunMode::Full
    };
    let scope = args.location.map_or(LocationScope::All, LocationScope::Only);

    Ok(RunConfig {
        mode,
        scope,
        range: resolve_range(args.start, args.end, today)?,
        dry_run: args.dry_run,
    })
}

pub(crate) fn transform_options(config: &AppConfig) -> TransformOptions {
    TransformOptions {
        timezone: config.business_timezone,
        ignored_items: config.ignored_items.clone(),
        skip_zero_price: config.skip_zero_price_items,
    }
}

/// Locations the run covers, in id order.
pub(crate) fn select_locations(
    cache: &LocationCache,
    scope: LocationScope,
) -> anyhow::Result<Vec<Location>> {
    match scope {
        LocationScope::All => Ok(cache.locations().into_iter().cloned().collect()),
        LocationScope::Only(id) => {
            let location = cache.get(id).ok_or_else(|| {
                anyhow::anyhow!("location {id} not found; run `salesdb-cli db seed`")
            })?;
            Ok(vec![location.clone()])
        }
    }
}

/// Runs the pipeline and prints the summary. Returns the overall status so
/// the caller can set the exit code.
pub(crate) async fn run_etl(config: &AppConfig, args: &EtlArgs) -> anyhow::Result<RunStatus> {
    let access_token = config.require_square_access_token()?;
    let run = build_run_config(config, args, today_in(config.business_timezone))?;
    let started = Instant::now();
    let run_id = uuid::Uuid::new_v4();

    let pool = crate::db::connect(config).await?;
    let cache = salesdb_db::load_location_cache(&pool).await?;
    let locations = select_locations(&cache, run.scope)?;
    if locations.is_empty() {
        tracing::warn!("no locations configured; run `salesdb-cli db seed`");
    }

    let client = SquareClient::new(
        &config.square_api_base_url,
        access_token,
        &config.square_api_version,
        config.square_request_timeout_secs,
        RetryPolicy {
            max_attempts: config.square_max_attempts,
            backoff_base_ms: config.square_backoff_base_ms,
        },
    )?;
    let options = transform_options(config);

    let cancel = CancellationToken::new();
    signal::cancel_on_shutdown(cancel.clone());
    signal::cancel_after(cancel.clone(), config.run_timeout_secs);

    tracing::info!(
        %run_id,
        range = %run.range,
        locations = locations.len(),
        sample = args.sample,
        dry_run = run.dry_run,
        "etl run started"
    );

    let ctx = PipelineContext {
        pool: &pool,
        client: &client,
        cache: &cache,
        options: &options,
        run: &run,
        page_limit: config.square_page_limit,
        batch_size: config.load_batch_size,
        cancel: &cancel,
    };
    let results = run_locations(&ctx, &locations, config.max_concurrent_locations).await;
    // Stops the timeout task once the run is over.
    cancel.cancel();

    let summary = RunSummary::new(run_id, run.range, results, started.elapsed());
    let status = summary.status();
    tracing::info!(%run_id, %status, "etl run finished");
    print!("{}", summary.render());

    Ok(status)
}

#[cfg(test)]
#[path = "etl_test.rs"]
mod tests;

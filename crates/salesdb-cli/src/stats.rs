//! Read-only reporting and the month purge.

use chrono::NaiveDate;
use salesdb_core::{to_business_time, AppConfig};

use crate::db::connect;

/// clap value parser for `YYYY-MM` month buckets.
pub(crate) fn parse_month_bucket(value: &str) -> Result<String, String> {
    let valid = value.len() == 7
        && NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok();
    if valid {
        Ok(value.to_string())
    } else {
        Err(format!("expected a month as YYYY-MM, got \"{value}\""))
    }
}

pub(crate) async fn run_stats(config: &AppConfig, location: Option<i64>) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let stats = salesdb_db::list_location_sales_stats(&pool, location).await?;

    if stats.is_empty() {
        match location {
            Some(id) => anyhow::bail!("location {id} not found"),
            None => {
                println!("no locations configured; run `salesdb-cli db seed`");
                return Ok(());
            }
        }
    }

    let tz = config.business_timezone;
    println!(
        "{:<6} {:<24} {:<16} {:>10}  {:<10}  {:<10}",
        "id", "name", "external id", "sales", "first", "last"
    );
    for row in &stats {
        let fmt_day = |ts: Option<chrono::DateTime<chrono::Utc>>| {
            ts.map_or_else(
                || "-".to_string(),
                |t| to_business_time(t, tz).date_naive().to_string(),
            )
        };
        println!(
            "{:<6} {:<24} {:<16} {:>10}  {:<10}  {:<10}",
            row.location_id,
            row.location_name,
            row.external_id,
            row.sale_count,
            fmt_day(row.first_sale),
            fmt_day(row.last_sale),
        );
    }
    Ok(())
}

/// Deletes one location's month, or reports what would go without `confirm`.
pub(crate) async fn run_purge(
    config: &AppConfig,
    location: i64,
    month: &str,
    confirm: bool,
) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let row = salesdb_db::get_location_by_id(&pool, location)
        .await?
        .ok_or_else(|| anyhow::anyhow!("location {location} not found"))?;

    if !confirm {
        let count = salesdb_db::count_sales_for_month(&pool, location, month).await?;
        println!(
            "would delete {count} sales for {} ({month}); rerun with --confirm",
            row.name
        );
        return Ok(());
    }

    let deleted = salesdb_db::delete_sales_for_month(&pool, location, month).await?;
    tracing::warn!(location, month, deleted, "sales purged");
    println!("deleted {deleted} sales for {} ({month})", row.name);
    Ok(())
}

//! Database operations for the partitioned `sales` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use salesdb_core::NormalizedSale;
use sqlx::{PgConnection, PgPool};

/// Per-location row count and sale time span.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationSalesStats {
    pub location_id: i64,
    pub location_name: String,
    pub external_id: String,
    pub sale_count: i64,
    pub first_sale: Option<DateTime<Utc>>,
    pub last_sale: Option<DateTime<Utc>>,
}

/// Insert one batch of sales, skipping rows whose natural key already exists.
///
/// Runs on the caller's connection so the caller owns the transaction
/// boundary. Returns the number of rows actually inserted; the difference
/// to `sales.len()` is the number of duplicates.
///
/// Uses a single `INSERT … SELECT * FROM UNNEST(…) ON CONFLICT DO NOTHING`
/// so the batch is written in one round-trip. Any constraint violation
/// other than the natural-key conflict fails the whole statement.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn insert_sales_batch(
    conn: &mut PgConnection,
    sales: &[NormalizedSale],
) -> Result<u64, sqlx::Error> {
    if sales.is_empty() {
        return Ok(0);
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let mut location_ids: Vec<i64> = Vec::with_capacity(sales.len());
    let mut order_ids: Vec<String> = Vec::with_capacity(sales.len());
    let mut positions: Vec<i32> = Vec::with_capacity(sales.len());
    let mut item_names: Vec<String> = Vec::with_capacity(sales.len());
    let mut prices: Vec<Decimal> = Vec::with_capacity(sales.len());
    let mut quantities: Vec<i32> = Vec::with_capacity(sales.len());
    let mut timestamps: Vec<DateTime<Utc>> = Vec::with_capacity(sales.len());
    let mut months: Vec<String> = Vec::with_capacity(sales.len());
    let mut weekdays: Vec<String> = Vec::with_capacity(sales.len());
    let mut categories: Vec<String> = Vec::with_capacity(sales.len());
    let mut modifiers: Vec<String> = Vec::with_capacity(sales.len());

    for sale in sales {
        location_ids.push(sale.location_id);
        order_ids.push(sale.external_order_id.clone());
        positions.push(sale.line_item_position);
        item_names.push(sale.item_name.clone());
        prices.push(sale.sale_price);
        quantities.push(sale.quantity);
        timestamps.push(sale.sale_timestamp.with_timezone(&Utc));
        months.push(sale.month.clone());
        weekdays.push(sale.day_of_week.clone());
        categories.push(sale.item_category.clone());
        modifiers.push(sale.modifiers.clone());
    }

    let result = sqlx::query(
        "INSERT INTO sales \
             (location_id, external_order_id, line_item_position, item_name, sale_price, \
              qty, sale_timestamp, month, day_of_week, item_category, modifiers) \
         SELECT * FROM UNNEST(\
              $1::int8[], $2::text[], $3::int4[], $4::text[], $5::numeric[], \
              $6::int4[], $7::timestamptz[], $8::text[], $9::text[], $10::text[], $11::text[]) \
         ON CONFLICT (location_id, external_order_id, line_item_position) DO NOTHING",
    )
    .bind(&location_ids)
    .bind(&order_ids)
    .bind(&positions)
    .bind(&item_names)
    .bind(&prices)
    .bind(&quantities)
    .bind(&timestamps)
    .bind(&months)
    .bind(&weekdays)
    .bind(&categories)
    .bind(&modifiers)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_sales_for_location(
    pool: &PgPool,
    location_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE location_id = $1")
        .bind(location_id)
        .fetch_one(pool)
        .await
}

/// Row counts and first/last sale per location, including locations with
/// no sales. Restricted to one location when `location_id` is given.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_location_sales_stats(
    pool: &PgPool,
    location_id: Option<i64>,
) -> Result<Vec<LocationSalesStats>, sqlx::Error> {
    sqlx::query_as::<_, LocationSalesStats>(
        "SELECT l.id AS location_id, \
                l.name AS location_name, \
                l.external_id, \
                COUNT(s.sale_id) AS sale_count, \
                MIN(s.sale_timestamp) AS first_sale, \
                MAX(s.sale_timestamp) AS last_sale \
         FROM locations l \
         LEFT JOIN sales s ON s.location_id = l.id \
         WHERE $1::int8 IS NULL OR l.id = $1 \
         GROUP BY l.id, l.name, l.external_id \
         ORDER BY l.id",
    )
    .bind(location_id)
    .fetch_all(pool)
    .await
}

/// Earliest and latest sale timestamp for a location, or `None` when it has
/// no sales.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_sales_date_range(
    pool: &PgPool,
    location_id: i64,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, sqlx::Error> {
    let row: (Option<DateTime<Utc>>, Option<DateTime<Utc>>) = sqlx::query_as(
        "SELECT MIN(sale_timestamp), MAX(sale_timestamp) \
         FROM sales \
         WHERE location_id = $1",
    )
    .bind(location_id)
    .fetch_one(pool)
    .await?;

    Ok(match row {
        (Some(first), Some(last)) => Some((first, last)),
        _ => None,
    })
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_sales_for_month(
    pool: &PgPool,
    location_id: i64,
    month: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sales WHERE location_id = $1 AND month = $2",
    )
    .bind(location_id)
    .bind(month)
    .fetch_one(pool)
    .await
}

/// Deletes one location's sales for one `YYYY-MM` bucket. Returns the
/// number of rows deleted.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn delete_sales_for_month(
    pool: &PgPool,
    location_id: i64,
    month: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sales WHERE location_id = $1 AND month = $2")
        .bind(location_id)
        .bind(month)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

//! Live integration tests for salesdb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/salesdb-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::DateTime;
use rust_decimal::Decimal;
use salesdb_core::{LocationConfig, NormalizedSale, RunError};
use salesdb_db::{
    count_sales_for_location, count_sales_for_month, delete_sales_for_month,
    get_location_by_external_id, get_location_by_id, get_sales_date_range,
    list_location_sales_stats, list_locations, load_location_cache, load_sales, run_migrations,
    seed_locations,
};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn location_config(name: &str, external_id: &str) -> LocationConfig {
    LocationConfig {
        name: name.to_string(),
        external_id: external_id.to_string(),
    }
}

/// Seed one location and return its generated `id`.
async fn seed_one(pool: &sqlx::PgPool, name: &str, external_id: &str) -> i64 {
    seed_locations(pool, &[location_config(name, external_id)])
        .await
        .expect("seed_locations failed");
    get_location_by_external_id(pool, external_id)
        .await
        .expect("get_location_by_external_id failed")
        .expect("seeded location should exist")
        .id
}

fn make_sale(
    location_id: i64,
    external_location_id: &str,
    order_id: &str,
    position: i32,
    sale_timestamp: &str,
) -> NormalizedSale {
    let ts = DateTime::parse_from_rfc3339(sale_timestamp).expect("valid timestamp");
    NormalizedSale {
        external_order_id: order_id.to_string(),
        line_item_position: position,
        item_name: "Latte".to_string(),
        sale_price: Decimal::new(525, 2),
        quantity: 1,
        sale_timestamp: ts,
        month: ts.format("%Y-%m").to_string(),
        day_of_week: ts.format("%A").to_string(),
        item_category: "Large".to_string(),
        location_id,
        external_location_id: external_location_id.to_string(),
        modifiers: String::new(),
    }
}

fn order_lines(location_id: i64, external_id: &str, order_id: &str, n: i32) -> Vec<NormalizedSale> {
    (0..n)
        .map(|p| make_sale(location_id, external_id, order_id, p, "2025-10-03T12:45:12-05:00"))
        .collect()
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn run_migrations_on_migrated_database_applies_nothing(pool: sqlx::PgPool) {
    let applied = run_migrations(&pool).await.expect("migrations should be a no-op");
    assert_eq!(applied, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn seed_locations_is_idempotent_and_updates_names(pool: sqlx::PgPool) {
    let first = seed_locations(
        &pool,
        &[
            location_config("Downtown", "LDOWN"),
            location_config("Northside", "LNORTH"),
        ],
    )
    .await
    .expect("first seed failed");
    assert_eq!(first, 2);

    let second = seed_locations(&pool, &[location_config("Downtown Cafe", "LDOWN")])
        .await
        .expect("second seed failed");
    assert_eq!(second, 1);

    let rows = list_locations(&pool).await.expect("list_locations failed");
    assert_eq!(rows.len(), 2, "re-seeding must not duplicate rows");

    let downtown = get_location_by_external_id(&pool, "LDOWN")
        .await
        .expect("query failed")
        .expect("LDOWN should exist");
    assert_eq!(downtown.name, "Downtown Cafe");

    let by_id = get_location_by_id(&pool, downtown.id)
        .await
        .expect("query failed")
        .expect("lookup by id should find the row");
    assert_eq!(by_id.external_id, "LDOWN");
}

#[sqlx::test(migrations = "../../migrations")]
async fn missing_locations_return_none(pool: sqlx::PgPool) {
    assert!(get_location_by_id(&pool, 9_999)
        .await
        .expect("query failed")
        .is_none());
    assert!(get_location_by_external_id(&pool, "LNOPE")
        .await
        .expect("query failed")
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn location_cache_resolves_seeded_ids(pool: sqlx::PgPool) {
    use salesdb_core::LocationResolver;

    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");

    assert_eq!(cache.locations().len(), 1);
    assert_eq!(cache.resolve("LDOWN").expect("should resolve"), id);
    assert!(cache.resolve("LOTHER").is_err());
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn load_sales_is_idempotent(pool: sqlx::PgPool) {
    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();

    let first = load_sales(&pool, &cache, order_lines(id, "LDOWN", "O1", 5), 2, &cancel).await;
    assert_eq!(first.inserted, 5);
    assert_eq!(first.duplicates, 0);
    assert_eq!(first.batches_attempted, 3);
    assert_eq!(first.batches_failed, 0);
    assert!(first.errors.is_empty());

    let second = load_sales(&pool, &cache, order_lines(id, "LDOWN", "O1", 5), 2, &cancel).await;
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, 5);

    let count = count_sales_for_location(&pool, id)
        .await
        .expect("count failed");
    assert_eq!(count, 5, "second load must not add rows");
}

#[sqlx::test(migrations = "../../migrations")]
async fn same_order_id_at_different_locations_is_not_a_duplicate(pool: sqlx::PgPool) {
    let downtown = seed_one(&pool, "Downtown", "LDOWN").await;
    let northside = seed_one(&pool, "Northside", "LNORTH").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();

    let mut rows = order_lines(downtown, "LDOWN", "SHARED", 2);
    rows.extend(order_lines(northside, "LNORTH", "SHARED", 2));

    let report = load_sales(&pool, &cache, rows, 100, &cancel).await;
    assert_eq!(report.inserted, 4);
    assert_eq!(report.duplicates, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn failing_batch_rolls_back_without_touching_other_batches(pool: sqlx::PgPool) {
    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();

    let mut rows = order_lines(id, "LDOWN", "O1", 4);
    // The table rejects a zero quantity, which fails the second batch of two.
    rows[3].quantity = 0;

    let report = load_sales(&pool, &cache, rows, 2, &cancel).await;
    assert_eq!(report.batches_attempted, 2);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors[0],
        RunError::LoadBatch { batch: 1, rows: 2, .. }
    ));

    let count = count_sales_for_location(&pool, id)
        .await
        .expect("count failed");
    assert_eq!(count, 2, "rows from the failed batch must not be persisted");
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_location_rows_are_excluded(pool: sqlx::PgPool) {
    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();

    let mut rows = order_lines(id, "LDOWN", "O1", 2);
    rows.push(make_sale(id, "LGHOST", "O2", 0, "2025-10-03T12:45:12-05:00"));

    let report = load_sales(&pool, &cache, rows, 10, &cancel).await;
    assert_eq!(report.inserted, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors[0],
        RunError::UnknownLocation { position: 0, .. }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn cancelled_load_writes_nothing(pool: sqlx::PgPool) {
    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = load_sales(&pool, &cache, order_lines(id, "LDOWN", "O1", 3), 1, &cancel).await;
    assert!(report.cancelled);
    assert_eq!(report.batches_attempted, 0);
    assert_eq!(report.inserted, 0);

    let count = count_sales_for_location(&pool, id)
        .await
        .expect("count failed");
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn stored_timestamp_keeps_the_instant(pool: sqlx::PgPool) {
    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();

    let sale = make_sale(id, "LDOWN", "O1", 0, "2025-10-03T12:45:12-05:00");
    let expected = sale.sale_timestamp.with_timezone(&chrono::Utc);
    load_sales(&pool, &cache, vec![sale], 10, &cancel).await;

    let (first, last) = get_sales_date_range(&pool, id)
        .await
        .expect("range query failed")
        .expect("range should exist after load");
    assert_eq!(first, expected);
    assert_eq!(last, expected);
}

// ---------------------------------------------------------------------------
// Reporting and purge
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn stats_include_locations_without_sales(pool: sqlx::PgPool) {
    let downtown = seed_one(&pool, "Downtown", "LDOWN").await;
    let northside = seed_one(&pool, "Northside", "LNORTH").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();

    load_sales(&pool, &cache, order_lines(downtown, "LDOWN", "O1", 3), 10, &cancel).await;

    let stats = list_location_sales_stats(&pool, None)
        .await
        .expect("stats query failed");
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].location_id, downtown);
    assert_eq!(stats[0].sale_count, 3);
    assert!(stats[0].first_sale.is_some());
    assert_eq!(stats[1].location_id, northside);
    assert_eq!(stats[1].sale_count, 0);
    assert!(stats[1].last_sale.is_none());

    let only = list_location_sales_stats(&pool, Some(northside))
        .await
        .expect("filtered stats query failed");
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].external_id, "LNORTH");
}

#[sqlx::test(migrations = "../../migrations")]
async fn date_range_is_none_for_empty_location(pool: sqlx::PgPool) {
    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let range = get_sales_date_range(&pool, id)
        .await
        .expect("range query failed");
    assert!(range.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_sales_for_month_only_touches_that_month(pool: sqlx::PgPool) {
    let id = seed_one(&pool, "Downtown", "LDOWN").await;
    let cache = load_location_cache(&pool).await.expect("cache load failed");
    let cancel = CancellationToken::new();

    let rows = vec![
        make_sale(id, "LDOWN", "O1", 0, "2025-09-30T20:00:00-05:00"),
        make_sale(id, "LDOWN", "O2", 0, "2025-10-01T09:00:00-05:00"),
        make_sale(id, "LDOWN", "O2", 1, "2025-10-01T09:00:00-05:00"),
    ];
    load_sales(&pool, &cache, rows, 10, &cancel).await;

    assert_eq!(
        count_sales_for_month(&pool, id, "2025-10")
            .await
            .expect("count failed"),
        2
    );

    let deleted = delete_sales_for_month(&pool, id, "2025-10")
        .await
        .expect("delete failed");
    assert_eq!(deleted, 2);
    assert_eq!(
        count_sales_for_location(&pool, id)
            .await
            .expect("count failed"),
        1
    );
}

//! Offline tests for salesdb-db pool configuration and row types.
//! These tests do not require a live database connection.

use salesdb_core::{AppConfig, Environment, Location};
use salesdb_db::{LoadReport, LocationRow, PoolConfig};
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        locations_path: PathBuf::from("./config/locations.yaml"),
        business_timezone: chrono_tz::America::Chicago,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        square_access_token: Some("token".to_string()),
        square_api_base_url: "https://connect.squareup.com/v2".to_string(),
        square_api_version: "2024-01-18".to_string(),
        square_request_timeout_secs: 30,
        square_page_limit: 500,
        square_max_attempts: 4,
        square_backoff_base_ms: 1000,
        max_concurrent_locations: 1,
        load_batch_size: 1000,
        sample_order_limit: 5,
        run_timeout_secs: 0,
        ignored_items: Vec::new(),
        skip_zero_price_items: false,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn location_row_converts_to_domain_location() {
    use chrono::Utc;

    let row = LocationRow {
        id: 3,
        name: "Airport".to_string(),
        external_id: "LAIRPORT".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let location = Location::from(row);
    assert_eq!(location.id, 3);
    assert_eq!(location.external_id, "LAIRPORT");
}

#[test]
fn empty_load_report_has_no_failures() {
    let report = LoadReport::default();
    assert_eq!(report.batches_failed, 0);
    assert!(!report.cancelled);
}

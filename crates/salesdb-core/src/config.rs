use crate::app_config::{AppConfig, Environment};
use crate::calendar::parse_timezone;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let square_access_token = require("SQUARE_ACCESS_TOKEN").ok();

    let env = parse_environment(&or_default("SALESDB_ENV", "development"))?;
    let log_level = or_default("SALESDB_LOG_LEVEL", "info");
    let locations_path = PathBuf::from(or_default(
        "SALESDB_LOCATIONS_PATH",
        "./config/locations.yaml",
    ));
    let business_timezone =
        parse_timezone(&or_default("SALESDB_BUSINESS_TIMEZONE", "America/Chicago"))?;

    let db_max_connections = parse_u32("SALESDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SALESDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SALESDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let square_api_base_url = or_default("SQUARE_API_BASE_URL", "https://connect.squareup.com/v2")
        .trim_end_matches('/')
        .to_string();
    let square_api_version = or_default("SQUARE_API_VERSION", "2024-01-18");
    let square_request_timeout_secs = parse_u64("SALESDB_SQUARE_REQUEST_TIMEOUT_SECS", "30")?;

    let square_page_limit = parse_u32("SALESDB_SQUARE_PAGE_LIMIT", "500")?;
    if !(1..=1000).contains(&square_page_limit) {
        return Err(invalid(
            "SALESDB_SQUARE_PAGE_LIMIT",
            format!("{square_page_limit} is outside 1..=1000"),
        ));
    }

    let square_max_attempts = parse_u32("SALESDB_SQUARE_MAX_ATTEMPTS", "4")?;
    if square_max_attempts == 0 {
        return Err(invalid(
            "SALESDB_SQUARE_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let square_backoff_base_ms = parse_u64("SALESDB_SQUARE_BACKOFF_BASE_MS", "1000")?;

    let max_concurrent_locations = parse_usize("SALESDB_MAX_CONCURRENT_LOCATIONS", "1")?;
    if max_concurrent_locations == 0 {
        return Err(invalid(
            "SALESDB_MAX_CONCURRENT_LOCATIONS",
            "must be at least 1".to_string(),
        ));
    }
    let load_batch_size = parse_usize("SALESDB_LOAD_BATCH_SIZE", "1000")?;
    if load_batch_size == 0 {
        return Err(invalid(
            "SALESDB_LOAD_BATCH_SIZE",
            "must be at least 1".to_string(),
        ));
    }
    let sample_order_limit = parse_usize("SALESDB_SAMPLE_ORDER_LIMIT", "5")?;
    if sample_order_limit == 0 {
        return Err(invalid(
            "SALESDB_SAMPLE_ORDER_LIMIT",
            "must be at least 1".to_string(),
        ));
    }
    let run_timeout_secs = parse_u64("SALESDB_RUN_TIMEOUT_SECS", "0")?;

    let ignored_items = parse_ignored_items(&or_default("SALESDB_IGNORED_ITEMS", ""));
    let skip_zero_price_items = parse_bool("SALESDB_SKIP_ZERO_PRICE_ITEMS", "false")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        locations_path,
        business_timezone,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        square_access_token,
        square_api_base_url,
        square_api_version,
        square_request_timeout_secs,
        square_page_limit,
        square_max_attempts,
        square_backoff_base_ms,
        max_concurrent_locations,
        load_batch_size,
        sample_order_limit,
        run_timeout_secs,
        ignored_items,
        skip_zero_price_items,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SALESDB_ENV".to_string(),
            reason: format!(
                "unknown environment '{other}'; expected development, test, or production"
            ),
        }),
    }
}

/// Split a comma-separated ignore list into lowercased, trimmed entries.
fn parse_ignored_items(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

use chrono_tz::Tz;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub locations_path: PathBuf,
    /// IANA zone every sale timestamp is converted into.
    pub business_timezone: Tz,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Only the `etl` command talks to Square; see [`AppConfig::require_square_access_token`].
    pub square_access_token: Option<String>,
    pub square_api_base_url: String,
    pub square_api_version: String,
    pub square_request_timeout_secs: u64,
    /// Orders requested per search page (Square accepts 1..=1000).
    pub square_page_limit: u32,
    /// Total attempts per page request, including the first one.
    pub square_max_attempts: u32,
    pub square_backoff_base_ms: u64,
    pub max_concurrent_locations: usize,
    pub load_batch_size: usize,
    pub sample_order_limit: usize,
    /// `0` disables the run-wide timeout.
    pub run_timeout_secs: u64,
    /// Lowercased substrings; line items whose name contains one are skipped.
    pub ignored_items: Vec<String>,
    pub skip_zero_price_items: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("locations_path", &self.locations_path)
            .field("business_timezone", &self.business_timezone)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("square_access_token", &"[redacted]")
            .field("square_api_base_url", &self.square_api_base_url)
            .field("square_api_version", &self.square_api_version)
            .field(
                "square_request_timeout_secs",
                &self.square_request_timeout_secs,
            )
            .field("square_page_limit", &self.square_page_limit)
            .field("square_max_attempts", &self.square_max_attempts)
            .field("square_backoff_base_ms", &self.square_backoff_base_ms)
            .field("max_concurrent_locations", &self.max_concurrent_locations)
            .field("load_batch_size", &self.load_batch_size)
            .field("sample_order_limit", &self.sample_order_limit)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("ignored_items", &self.ignored_items)
            .field("skip_zero_price_items", &self.skip_zero_price_items)
            .finish()
    }
}

impl AppConfig {
    /// The Square access token, for commands that call the Square API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `SQUARE_ACCESS_TOKEN` was
    /// unset or blank at load time.
    pub fn require_square_access_token(&self) -> Result<&str, ConfigError> {
        self.square_access_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SQUARE_ACCESS_TOKEN".to_string()))
    }
}

pub mod app_config;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod locations;
pub mod run;
pub mod sales;

pub use app_config::{AppConfig, Environment};
pub use calendar::{
    month_bucket, parse_timezone, previous_month_range, to_business_time, today_in, weekday_name,
    DateRange,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use errors::{
    ExtractionFailureKind, RunError, UnknownLocation, ValidationError, ValidationScope,
};
pub use locations::{
    load_locations, Location, LocationCache, LocationConfig, LocationResolver, LocationsFile,
};
pub use run::{LocationScope, LocationStatus, RunConfig, RunMode, RunResult, RunStatus};
pub use sales::{NormalizedSale, NOT_APPLICABLE_CATEGORY};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read locations file {path}: {source}")]
    LocationsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locations file: {0}")]
    LocationsFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

//! Business-local calendar helpers.
//!
//! Square reports every timestamp in UTC, while all analytical fields
//! (month bucket, weekday, reporting date ranges) are defined in the
//! business's own zone. These helpers are the only place where that
//! conversion happens.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Parses an IANA zone name such as `"America/Chicago"`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] (for `SALESDB_BUSINESS_TIMEZONE`)
/// when the name is not a known zone.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "SALESDB_BUSINESS_TIMEZONE".to_string(),
            reason: e.to_string(),
        })
}

/// Converts a UTC instant into the business zone, keeping the offset that
/// was in force at that instant.
#[must_use]
pub fn to_business_time(utc: DateTime<Utc>, tz: Tz) -> DateTime<FixedOffset> {
    utc.with_timezone(&tz).fixed_offset()
}

/// `YYYY-MM` of the local timestamp.
#[must_use]
pub fn month_bucket(local: &DateTime<FixedOffset>) -> String {
    local.format("%Y-%m").to_string()
}

/// Full English weekday name of the local timestamp, e.g. `"Thursday"`.
#[must_use]
pub fn weekday_name(local: &DateTime<FixedOffset>) -> String {
    local.format("%A").to_string()
}

/// Today's calendar date in the business zone.
#[must_use]
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Inclusive range of business-local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::Validation(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// UTC instants covering the whole range: local midnight of `start`
    /// through local 23:59:59.999 of `end`.
    #[must_use]
    pub fn to_utc_bounds(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start.and_time(NaiveTime::default());
        let end = self.end.and_time(
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default(),
        );
        (
            local_to_utc(tz, start, false),
            local_to_utc(tz, end, true),
        )
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// The calendar month before the one containing `today`.
#[must_use]
pub fn previous_month_range(today: NaiveDate) -> DateRange {
    let (year, month) = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today);
    let end = today
        .with_day(1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(today);
    DateRange { start, end }
}

/// Resolves a local wall-clock time to UTC. Ambiguous times (DST fall-back)
/// take the earlier instant for range starts and the later one for range
/// ends; times inside a spring-forward gap move one hour ahead.
fn local_to_utc(tz: Tz, local: NaiveDateTime, prefer_latest: bool) -> DateTime<Utc> {
    let mapped = tz.from_local_datetime(&local);
    let resolved = if prefer_latest {
        mapped.latest()
    } else {
        mapped.earliest()
    };
    match resolved {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            let shifted = local + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&local), |dt| dt.with_timezone(&Utc))
        }
    }
}

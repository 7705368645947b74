//! Timezone handling utilities
//!
//! The calendar feed is always rendered in UTC; the timeline groups videos by
//! day in the site timezone or one supplied by the caller.

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};

/// Timezone the site's audience lives in
pub const SITE_TIMEZONE: &str = "Asia/Tokyo";

/// Parse an IANA timezone string (e.g., "Asia/Tokyo", "Europe/London")
///
/// # Examples
///
/// ```
/// use shinju_core::timezone::parse_timezone;
///
/// let tz = parse_timezone("Asia/Tokyo").unwrap();
/// assert_eq!(tz.name(), "Asia/Tokyo");
/// ```
pub fn parse_timezone(tz_str: &str) -> CoreResult<Tz> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| CoreError::InvalidTimezone(tz_str.to_string()))
}

/// Validate that a timezone string is valid
pub fn validate_timezone(tz_str: &str) -> CoreResult<()> {
    parse_timezone(tz_str)?;
    Ok(())
}

/// Get the site's default timezone
pub fn default_timezone() -> Tz {
    Tz::Asia__Tokyo
}

/// Calendar day of an instant as observed in `tz`
pub fn local_date<Tz2: TimeZone, Tz3: TimeZone>(time: &DateTime<Tz2>, tz: &Tz3) -> NaiveDate {
    time.with_timezone(tz).date_naive()
}

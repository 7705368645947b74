//! Date helpers shared by the synthesizer and the ICS writer

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::Serialize;

/// Calendar date-time components `[year, month, day, hour, minute]`
///
/// Seconds are dropped: calendar feeds are published at minute granularity.
/// Serializes as a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DateArray(pub i32, pub u32, pub u32, pub u32, pub u32);

impl DateArray {
    pub fn year(&self) -> i32 {
        self.0
    }

    pub fn month(&self) -> u32 {
        self.1
    }

    pub fn day(&self) -> u32 {
        self.2
    }

    pub fn hour(&self) -> u32 {
        self.3
    }

    pub fn minute(&self) -> u32 {
        self.4
    }

    /// Format as an iCalendar UTC DATE-TIME (`YYYYMMDDTHHMM00Z`)
    ///
    /// Only meaningful when the components were taken in UTC.
    pub fn to_ical_utc(&self) -> String {
        format!(
            "{:04}{:02}{:02}T{:02}{:02}00Z",
            self.0, self.1, self.2, self.3, self.4
        )
    }
}

/// Split a date-time into its components in its own timezone
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use shinju_core::date::{DateArray, to_date_array};
///
/// let dt = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 30).unwrap();
/// assert_eq!(to_date_array(&dt), DateArray(2024, 1, 1, 10, 0));
/// ```
pub fn to_date_array<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateArray {
    DateArray(dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute())
}

/// The later of two instants
pub fn max<Tz: TimeZone>(a: DateTime<Tz>, b: DateTime<Tz>) -> DateTime<Tz> {
    if a >= b { a } else { b }
}

/// The earlier of two instants
pub fn min<Tz: TimeZone>(a: DateTime<Tz>, b: DateTime<Tz>) -> DateTime<Tz> {
    if a <= b { a } else { b }
}

//! Timestamp and local-day utilities
//!
//! Records carry UTC timestamps; every day boundary the analytics care about
//! is a local calendar day in the caller's time zone.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// Local calendar day of a UTC timestamp
pub fn local_day<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// True if both days fall in the same ISO week
pub fn same_iso_week(a: NaiveDate, b: NaiveDate) -> bool {
    a.iso_week() == b.iso_week()
}

/// Whole 24-hour periods between two timestamps (negative if `to` precedes `from`)
pub fn whole_days_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
    (*to - *from).num_days()
}

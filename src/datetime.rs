//! Clock abstraction and date/time formatting for filedrop.
//!
//! All "today" decisions go through a [`Clock`] so bucket selection can be
//! pinned in tests. Times are server local wall-clock time; no timezone
//! normalization is applied.

use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Bucket directory name format: two-digit month, day and year.
pub const BUCKET_FORMAT: &str = "%m-%d-%y";

/// Source of the current local date/time.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Clock backed by the server's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    /// Create a clock that always reports `at`.
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Format a date as a bucket name (e.g. `10-15-25`).
pub fn format_bucket(date: NaiveDate) -> String {
    date.format(BUCKET_FORMAT).to_string()
}

/// Format a local wall-clock time as ISO-8601 without offset.
pub fn format_naive(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Convert a filesystem timestamp to local time.
pub fn to_local(time: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(time)
}

/// Format a local timestamp as RFC 3339 (ISO-8601 with offset).
pub fn to_rfc3339(dt: &DateTime<Local>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}

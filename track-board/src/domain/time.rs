//! Calendar and clock handling.
//!
//! The board prints times like "6:45 PM" with no date attached. A record's
//! `day` is therefore stamped from the local calendar at scrape time, and the
//! two are only combined into a real timestamp when a record is persisted.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Zone used when none is configured (the station is in New York).
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Time formats accepted for the board's `time` column, tried in order.
///
/// The board has been seen printing both "6:45 PM" and "9:25PM"; `%H:%M`
/// covers 24-hour captures.
const TIME_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M"];

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The local calendar of the station: a timezone plus a clock.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use track_board::domain::{Calendar, FixedClock};
///
/// // 03:30 UTC is still the previous evening in New York.
/// let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 16, 3, 30, 0).unwrap());
/// let calendar = Calendar::with_clock(chrono_tz::America::New_York, clock);
/// assert_eq!(calendar.today(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Calendar {
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl Calendar {
    /// Create a calendar for `tz` backed by the system clock.
    pub fn new(tz: Tz) -> Self {
        Self::with_clock(tz, SystemClock)
    }

    /// Create a calendar for `tz` backed by a custom clock.
    pub fn with_clock(tz: Tz, clock: impl Clock + 'static) -> Self {
        Self {
            tz,
            clock: Arc::new(clock),
        }
    }

    /// Returns the configured timezone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Returns the current date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.tz).date_naive()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

/// A record's `day` and `time` could not be combined into a timestamp.
///
/// Non-fatal: the record is skipped and the rest of the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot combine {day} and {time:?} into a timestamp: {reason}")]
pub struct TimeParseWarning {
    pub day: NaiveDate,
    pub time: String,
    reason: &'static str,
}

impl TimeParseWarning {
    fn new(day: NaiveDate, time: &str, reason: &'static str) -> Self {
        Self {
            day,
            time: time.to_string(),
            reason,
        }
    }
}

/// Combine a board day and a printed board time into a local timestamp.
///
/// Ambiguous local times (the repeated hour when DST ends) resolve to the
/// earlier instant. Times that do not exist (the skipped hour when DST
/// starts) are rejected.
pub fn scheduled_at(day: NaiveDate, time: &str, tz: Tz) -> Result<DateTime<Tz>, TimeParseWarning> {
    let trimmed = time.trim();
    if trimmed.is_empty() {
        return Err(TimeParseWarning::new(day, time, "empty time"));
    }

    let local_time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| TimeParseWarning::new(day, time, "unrecognized time format"))?;

    tz.from_local_datetime(&day.and_time(local_time))
        .earliest()
        .ok_or_else(|| TimeParseWarning::new(day, time, "local time does not exist"))
}

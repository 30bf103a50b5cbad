//! Domain types for the track board scraper.
//!
//! Train records, schedule snapshots, and the local calendar used to date
//! them. Nothing in this module performs I/O.

mod time;
mod train;

pub use time::{
    Calendar, Clock, DEFAULT_TIMEZONE, FixedClock, SystemClock, TimeParseWarning, scheduled_at,
};
pub use train::{ScheduleBoard, Train, filter_with_tracks};

//! Persistence for tracked trains.
//!
//! Only trains with an assigned track are stored. Rows are keyed by
//! `(day, time, train_number)` so repeated scrapes update in place.

mod error;
mod sqlite;

pub use error::StoreError;
pub use sqlite::{StoreConfig, StoreSummary, TrainStore, database_exists};

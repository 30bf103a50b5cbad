//! Station board scraping.
//!
//! This module fetches the Moynihan Train Hall transportation page and turns
//! its Amtrak departures and arrivals tables into [`Train`] records.
//!
//! Key characteristics of the page:
//! - Each train is rendered as a header row (time, number, name) followed
//!   by a destination row (destination, status, track)
//! - Times are printed in 12-hour form with no date ("6:45 PM")
//! - Tracks are usually blank until shortly before boarding
//!
//! [`Train`]: crate::domain::Train

mod client;
mod error;
mod mock;
mod parse;
mod transport;


pub use client::{BoardConfig, BoardFetcher, DEFAULT_BOARD_URL, DEFAULT_REFERER, parse_page};
pub use error::FetchError;
pub use mock::{RecordedRequest, StaticTransport};
pub use parse::{parse_board, parse_board_on};
pub use transport::{HttpTransport, RawResponse, Transport};

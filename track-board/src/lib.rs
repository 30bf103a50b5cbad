//! Station track board scraper.
//!
//! Reads the live Amtrak departures and arrivals boards at Moynihan Train
//! Hall and records which track each train was assigned.

pub mod board;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod store;

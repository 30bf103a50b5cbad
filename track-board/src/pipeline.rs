//! One scrape run: fetch, keep tracked trains, persist.

use tracing::info;

use crate::board::{BoardFetcher, FetchError, Transport};
use crate::domain::filter_with_tracks;
use crate::store::{StoreError, TrainStore};

/// Errors that abort a scrape run.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one run saw and stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub departures: usize,
    pub arrivals: usize,
    /// Trains with an assigned track.
    pub tracked: usize,
    pub stored: usize,
    /// Tracked trains dropped because their time was unusable.
    pub skipped: usize,
}

/// Fetch the board once and upsert every train that has a track.
///
/// A fetch failure aborts before anything is written.
pub async fn scrape_and_store<T: Transport>(
    fetcher: &BoardFetcher<T>,
    store: &TrainStore,
) -> Result<RunSummary, ScrapeError> {
    let board = fetcher.fetch().await?;
    let tracked = filter_with_tracks(&board);

    let summary = store
        .upsert_all(&tracked, fetcher.calendar().tz())
        .await?;

    let run = RunSummary {
        departures: board.departures.len(),
        arrivals: board.arrivals.len(),
        tracked: tracked.len(),
        stored: summary.stored,
        skipped: summary.skipped,
    };

    info!(
        departures = run.departures,
        arrivals = run.arrivals,
        tracked = run.tracked,
        stored = run.stored,
        "Scrape complete"
    );

    Ok(run)
}

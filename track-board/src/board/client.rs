//! Station board fetcher.
//!
//! One GET of the transportation page, then the departures and arrivals
//! tables are located and parsed independently.

use std::sync::LazyLock;
use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::domain::{Calendar, ScheduleBoard};

use super::error::FetchError;
use super::parse::{parse_board, selector};
use super::transport::{HttpTransport, Transport};

/// Default page carrying both boards.
pub const DEFAULT_BOARD_URL: &str = "https://moynihantrainhall.nyc/transportation/";

/// Referer the site expects on board requests.
pub const DEFAULT_REFERER: &str = "https://moynihantrainhall.nyc/";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

static DEPARTURES_TABLE: LazyLock<Selector> =
    LazyLock::new(|| selector("table#amtrak-departures-target"));
static ARRIVALS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| selector("table#amtrak-arrivals-target"));

/// Configuration for the board fetcher.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Page to fetch
    pub url: String,
    /// Value sent in the `Referer` header
    pub referer: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BoardConfig {
    pub fn new() -> Self {
        Self {
            url: DEFAULT_BOARD_URL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom page URL (for testing).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the `Referer` header value.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches and parses the station's departures and arrivals boards.
#[derive(Debug, Clone)]
pub struct BoardFetcher<T = HttpTransport> {
    transport: T,
    config: BoardConfig,
    calendar: Calendar,
}

impl BoardFetcher<HttpTransport> {
    /// Create a fetcher that talks to the live site.
    pub fn new(config: BoardConfig, calendar: Calendar) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(transport, config, calendar))
    }
}

impl<T: Transport> BoardFetcher<T> {
    /// Create a fetcher over any transport.
    pub fn with_transport(transport: T, config: BoardConfig, calendar: Calendar) -> Self {
        Self {
            transport,
            config,
            calendar,
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Fetch one snapshot of both boards.
    ///
    /// A non-success status fails with [`FetchError::Status`] and the body is
    /// not parsed. Empty boards are a valid result.
    pub async fn fetch(&self) -> Result<ScheduleBoard, FetchError> {
        debug!(url = %self.config.url, "Fetching station board");

        let response = self
            .transport
            .get(&self.config.url, &self.config.referer)
            .await?;

        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let board = parse_page(&response.body, &self.calendar);

        info!(
            total = board.len(),
            departures = board.departures.len(),
            arrivals = board.arrivals.len(),
            "Parsed station board"
        );

        Ok(board)
    }
}

/// Parse both boards out of a full transportation page.
///
/// A missing table parses as an empty board.
pub fn parse_page(body: &str, calendar: &Calendar) -> ScheduleBoard {
    let document = Html::parse_document(body);
    let departures = table_markup(&document, &DEPARTURES_TABLE);
    let arrivals = table_markup(&document, &ARRIVALS_TABLE);

    ScheduleBoard::new(
        parse_board(&departures, calendar),
        parse_board(&arrivals, calendar),
    )
}

/// Outer HTML of the first element matching `table`, or "".
fn table_markup(document: &Html, table: &Selector) -> String {
    document
        .select(table)
        .next()
        .map(|el| el.html())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::StaticTransport;
    use crate::domain::FixedClock;
    use chrono::{NaiveDate, TimeZone, Utc};

    const PAGE: &str = include_str!("../../testdata/transportation.html");

    fn calendar() -> Calendar {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 23, 0, 0).unwrap());
        Calendar::with_clock(chrono_tz::America::New_York, clock)
    }

    fn fetcher(transport: StaticTransport) -> BoardFetcher<StaticTransport> {
        BoardFetcher::with_transport(transport, BoardConfig::default(), calendar())
    }

    #[test]
    fn config_builder() {
        let config = BoardConfig::new()
            .with_url("http://localhost:8080/board")
            .with_referer("http://localhost:8080/")
            .with_timeout(5);

        assert_eq!(config.url, "http://localhost:8080/board");
        assert_eq!(config.referer, "http://localhost:8080/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn config_defaults() {
        let config = BoardConfig::default();

        assert_eq!(config.url, DEFAULT_BOARD_URL);
        assert_eq!(config.referer, DEFAULT_REFERER);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        assert!(BoardFetcher::new(BoardConfig::default(), calendar()).is_ok());
    }

    #[tokio::test]
    async fn fetch_parses_both_boards() {
        let fetcher = fetcher(StaticTransport::ok(PAGE));

        let board = fetcher.fetch().await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(board.len(), 3);

        assert_eq!(board.departures.len(), 2);
        let first = &board.departures[0];
        assert_eq!(first.day, day);
        assert_eq!(first.time, "6:45 PM");
        assert_eq!(first.train_number, "241");
        assert_eq!(first.train_name, "Empire Service");
        assert_eq!(first.destination, "Albany-Rensselaer, NY");
        assert_eq!(first.status, "Second Boarding");
        assert_eq!(first.track, "6");

        let second = &board.departures[1];
        assert_eq!(second.time, "7:01 PM");
        assert_eq!(second.train_number, "57");
        assert_eq!(second.train_name, "Vermonter");
        assert_eq!(second.destination, "Washington, DC");
        assert_eq!(second.status, "On Time");
        assert_eq!(second.track, "");

        assert_eq!(board.arrivals.len(), 1);
        let arrival = &board.arrivals[0];
        assert_eq!(arrival.time, "7:02 PM");
        assert_eq!(arrival.train_number, "67");
        assert_eq!(arrival.train_name, "Northeast Regional");
        assert_eq!(arrival.destination, "Boston, MA");
        assert_eq!(arrival.status, "On Time");
        assert_eq!(arrival.track, "");
    }

    #[tokio::test]
    async fn fetch_sends_url_and_referer() {
        let transport = StaticTransport::ok(PAGE);
        let fetcher = fetcher(transport.clone());

        fetcher.fetch().await.unwrap();

        let seen = transport.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "https://moynihantrainhall.nyc/transportation/");
        assert_eq!(seen[0].referer, "https://moynihantrainhall.nyc/");
    }

    #[tokio::test]
    async fn not_found_is_a_fetch_error() {
        let fetcher = fetcher(StaticTransport::new(404, "Not Found"));

        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("Not Found"));
    }

    #[tokio::test]
    async fn error_body_is_not_parsed() {
        // A 500 whose body happens to contain a board must still fail.
        let fetcher = fetcher(StaticTransport::new(500, PAGE));
        assert!(fetcher.fetch().await.is_err());
    }

    #[tokio::test]
    async fn page_without_tables_is_an_empty_board() {
        let fetcher = fetcher(StaticTransport::ok("<html><body><p>No trains</p></body></html>"));

        let board = fetcher.fetch().await.unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn tables_are_located_independently() {
        let page = PAGE.replace("amtrak-departures-target", "something-else");

        let board = parse_page(&page, &calendar());
        assert!(board.departures.is_empty());
        assert_eq!(board.arrivals.len(), 1);
        assert_eq!(board.arrivals[0].train_number, "67");
    }
}

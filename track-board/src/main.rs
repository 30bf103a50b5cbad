use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use track_board::board::{
    BoardConfig, BoardFetcher, DEFAULT_BOARD_URL, FetchError, HttpTransport, RawResponse,
    StaticTransport, Transport,
};
use track_board::config::{DATABASE_ENV, TIMEZONE_ENV, parse_day, parse_timezone};
use track_board::domain::{Calendar, filter_with_tracks};
use track_board::pipeline::{ScrapeError, scrape_and_store};
use track_board::store::{StoreConfig, StoreError, TrainStore, database_exists};

#[derive(Parser, Debug)]
#[command(
    name = "track-board",
    version,
    about = "Record track assignments from the Moynihan Train Hall departure board"
)]
struct Cli {
    /// IANA timezone of the station, used to date each snapshot
    #[arg(
        long,
        global = true,
        env = TIMEZONE_ENV,
        default_value = "America/New_York",
        value_parser = parse_timezone
    )]
    tz: Tz,

    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the board and store every train that has a track
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// SQLite database file
        #[arg(long, env = DATABASE_ENV, default_value = "track_board.sqlite3")]
        db: PathBuf,
    },

    /// Fetch the board and print it as JSON without storing anything
    Dump {
        #[command(flatten)]
        source: SourceArgs,

        /// Print only trains with an assigned track
        #[arg(long)]
        tracked: bool,
    },

    /// Print the stored trains for one day
    Show {
        /// SQLite database file
        #[arg(long, env = DATABASE_ENV, default_value = "track_board.sqlite3")]
        db: PathBuf,

        /// Day to show (YYYY-MM-DD); defaults to today in --tz
        #[arg(long, value_parser = parse_day)]
        day: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Parse a saved copy of the page instead of fetching the live board
    #[arg(long, value_name = "PATH")]
    from_file: Option<PathBuf>,

    /// Page to fetch
    #[arg(long, default_value = DEFAULT_BOARD_URL)]
    url: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Live site or a captured page.
enum Source {
    Live(HttpTransport),
    Captured(StaticTransport),
}

impl Transport for Source {
    async fn get(&self, url: &str, referer: &str) -> Result<RawResponse, FetchError> {
        match self {
            Source::Live(transport) => transport.get(url, referer).await,
            Source::Captured(transport) => transport.get(url, referer).await,
        }
    }
}

impl SourceArgs {
    fn fetcher(&self, calendar: Calendar) -> Result<BoardFetcher<Source>, FetchError> {
        let config = BoardConfig::new().with_url(self.url.clone());

        let source = match &self.from_file {
            Some(path) => {
                info!(path = %path.display(), "Reading captured board page");
                Source::Captured(StaticTransport::from_file(path)?)
            }
            None => Source::Live(HttpTransport::new(config.timeout())?),
        };

        Ok(BoardFetcher::with_transport(source, config, calendar))
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so `dump` output stays valid JSON.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let calendar = Calendar::new(cli.tz);

    match cli.command {
        Command::Run { source, db } => {
            let fetcher = source.fetcher(calendar)?;

            if !database_exists(&db) {
                info!(path = %db.display(), "Creating new database");
            }
            let store = TrainStore::open(&StoreConfig::new(db)).await?;

            let run = scrape_and_store(&fetcher, &store).await?;
            store.close().await;

            println!(
                "Stored {} trains ({} departures, {} arrivals, {} tracked, {} skipped)",
                run.stored, run.departures, run.arrivals, run.tracked, run.skipped
            );
        }

        Command::Dump { source, tracked } => {
            let fetcher = source.fetcher(calendar)?;
            let board = fetcher.fetch().await?;

            let json = if tracked {
                serde_json::to_string_pretty(&filter_with_tracks(&board))?
            } else {
                serde_json::to_string_pretty(&board)?
            };
            println!("{json}");
        }

        Command::Show { db, day } => {
            let day = day.unwrap_or_else(|| calendar.today());
            let store = TrainStore::open(&StoreConfig::new(db)).await?;
            let trains = store.trains_on(day).await?;
            store.close().await;

            if trains.is_empty() {
                println!("No trains stored for {day}");
            }
            for train in trains {
                println!(
                    "{:>8}  {:>5}  {:<20}  {:<26}  track {:<4}  {}",
                    train.time,
                    train.train_number,
                    train.train_name,
                    train.destination,
                    train.track,
                    train.status
                );
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

//! SQLite-backed train store.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info, warn};

use crate::domain::{Train, scheduled_at};

use super::error::StoreError;

/// Default database file, relative to the working directory.
const DEFAULT_DB_PATH: &str = "track_board.sqlite3";

const CREATE_TRAINS: &str = r#"
    CREATE TABLE IF NOT EXISTS trains (
        day TEXT NOT NULL,
        time TEXT NOT NULL,
        train_number TEXT NOT NULL,
        train_name TEXT NOT NULL,
        destination TEXT NOT NULL,
        status TEXT NOT NULL,
        track TEXT NOT NULL,
        scheduled_at TEXT NOT NULL,
        PRIMARY KEY (day, time, train_number)
    );
"#;

const CREATE_SCHEDULED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS trains_scheduled_at ON trains (scheduled_at);";

const UPSERT_TRAIN: &str = r#"
    INSERT INTO trains (
        day, time, train_number, train_name, destination, status, track, scheduled_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (day, time, train_number) DO UPDATE SET
        train_name = excluded.train_name,
        destination = excluded.destination,
        status = excluded.status,
        track = excluded.track,
        scheduled_at = excluded.scheduled_at
"#;

const SELECT_DAY: &str = r#"
    SELECT day, time, train_number, train_name, destination, status, track
    FROM trains
    WHERE day = ?
    ORDER BY scheduled_at, train_number
"#;

type TrainRow = (String, String, String, String, String, String, String);

/// Configuration for the train store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}

/// Outcome of one upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    /// Records written (inserted or replaced).
    pub stored: usize,
    /// Records skipped because their time could not be used.
    pub skipped: usize,
}

/// Durable store of trains, keyed by `(day, time, train_number)`.
///
/// Writing the same key again replaces the previous row, so re-running a
/// scrape is idempotent.
#[derive(Debug, Clone)]
pub struct TrainStore {
    pool: SqlitePool,
}

impl TrainStore {
    /// Open the database at `config.path`, creating it and its parent
    /// directories if needed.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        debug!(path = %config.path.display(), "Opened train store");
        Self::with_pool(pool).await
    }

    /// A private in-memory database (for tests and dry runs).
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // The database lives only as long as its single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TRAINS).execute(&self.pool).await?;
        sqlx::query(CREATE_SCHEDULED_AT_INDEX)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Upsert `trains` in one transaction.
    ///
    /// Each record's `day` and `time` are combined in `tz` into the stored
    /// `scheduled_at` timestamp. Records whose time cannot be combined are
    /// logged and skipped; they never abort the batch.
    pub async fn upsert_all(&self, trains: &[Train], tz: Tz) -> Result<StoreSummary, StoreError> {
        let mut summary = StoreSummary::default();
        let mut tx = self.pool.begin().await?;

        for train in trains {
            let at = match scheduled_at(train.day, &train.time, tz) {
                Ok(at) => at,
                Err(warning) => {
                    warn!(
                        train_number = %train.train_number,
                        error = %warning,
                        "Skipping train with unusable time"
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            sqlx::query(UPSERT_TRAIN)
                .bind(train.day.to_string())
                .bind(train.time.as_str())
                .bind(train.train_number.as_str())
                .bind(train.train_name.as_str())
                .bind(train.destination.as_str())
                .bind(train.status.as_str())
                .bind(train.track.as_str())
                .bind(at.to_rfc3339())
                .execute(&mut *tx)
                .await?;

            summary.stored += 1;
        }

        tx.commit().await?;

        info!(
            stored = summary.stored,
            skipped = summary.skipped,
            "Upserted trains"
        );

        Ok(summary)
    }

    /// All stored trains for `day`, in scheduled order.
    pub async fn trains_on(&self, day: NaiveDate) -> Result<Vec<Train>, StoreError> {
        let rows: Vec<TrainRow> = sqlx::query_as(SELECT_DAY)
            .bind(day.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(train_from_row).collect()
    }

    /// Number of stored rows.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trains")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn train_from_row(row: TrainRow) -> Result<Train, StoreError> {
    let (day, time, train_number, train_name, destination, status, track) = row;

    let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| StoreError::Corrupt {
        message: format!("bad day {day:?}: {e}"),
    })?;

    Ok(Train {
        day,
        time,
        train_number,
        train_name,
        destination,
        status,
        track,
    })
}

/// Whether a database file already exists at `path`.
pub fn database_exists(path: &Path) -> bool {
    path.is_file()
}

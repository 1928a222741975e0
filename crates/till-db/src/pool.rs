//! # Database Handle
//!
//! Opens the SQLite pool and hands out repositories.
//!
//! ## Per-connection settings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Setting          File database        In-memory (tests)                │
//! │  ───────────────  ───────────────────  ──────────────────────────────   │
//! │  journal_mode     WAL                  MEMORY                           │
//! │  synchronous      NORMAL               NORMAL                           │
//! │  foreign_keys     ON                   ON                                │
//! │  busy_timeout     5 s (configurable)   5 s                               │
//! │  pool size        5 (configurable)     exactly 1                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Foreign keys are what make an unknown service id fail a checkout inside
//! its transaction. The busy timeout is what makes a second checkout wait
//! for the first one's write lock instead of failing with `SQLITE_BUSY`.
//!
//! An in-memory database lives inside its one connection, so the pool is
//! pinned to a single connection that is never recycled.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::articles::ArticleRepository;
use crate::repository::reports::SalesReportRepository;
use crate::repository::sales::SaleRepository;
use crate::repository::services::ServiceRepository;
use crate::repository::stock::StockLedger;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Memory,
}

/// How to open the database.
///
/// ```rust,ignore
/// let config = DbConfig::new("./till.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: Location,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long `acquire()` waits for a free connection.
    pub acquire_timeout: Duration,
    /// How long a statement waits on SQLite's write lock.
    pub busy_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: Location::File(path.into()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A private in-memory database, migrated on open.
    pub fn in_memory() -> Self {
        DbConfig {
            location: Location::Memory,
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new("")
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let (options, journal) = match &self.location {
            Location::Memory => (
                SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
                SqliteJournalMode::Memory,
            ),
            Location::File(path) => (
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true),
                SqliteJournalMode::Wal,
            ),
        };

        Ok(options
            .journal_mode(journal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(self.acquire_timeout);

        match self.location {
            // Dropping the only connection would drop the database with it
            Location::Memory => options.idle_timeout(None::<Duration>).max_lifetime(None::<Duration>),
            Location::File(_) => options.idle_timeout(Some(Duration::from_secs(600))),
        }
    }

    fn describe(&self) -> String {
        match &self.location {
            Location::Memory => "memory".to_string(),
            Location::File(path) => path.display().to_string(),
        }
    }
}

/// Shared database handle. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = %config.describe(), "Opening database");

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Opens a file database with default settings.
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Database::new(DbConfig::new(path.as_ref())).await
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn articles(&self) -> ArticleRepository {
        ArticleRepository::new(self.pool.clone())
    }

    pub fn services(&self) -> ServiceRepository {
        ServiceRepository::new(self.pool.clone())
    }

    /// The only writer of article quantities after creation.
    pub fn stock(&self) -> StockLedger {
        StockLedger::new(self.pool.clone())
    }

    /// Sale recorder and service use.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> SalesReportRepository {
        SalesReportRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections, then closes the pool.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// True when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

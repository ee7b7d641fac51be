//! SQLite connection pool for the folder store
//!
//! File databases run in WAL mode so `mailsync folders` can read while a
//! refresh writes. The schema is embedded in the binary and applied on every
//! open; every statement in it is idempotent.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::CacheError;

const SCHEMA: &str = include_str!("migrations/20261016_initial.sql");

/// Connections used for a database file
const FILE_CONNECTIONS: u32 = 5;

/// Time a writer waits for a concurrent writer before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the mailsync database
///
/// An in-memory database lives inside a single connection, so that mode
/// keeps the pool at one connection.
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Opens the database file at `db_path`, creating it and its parent
    /// directories when missing
    ///
    /// # Errors
    ///
    /// `CacheError::ConnectionFailed` when the file cannot be opened,
    /// `CacheError::MigrationFailed` when the schema cannot be applied.
    pub async fn new(db_path: &Path) -> Result<Self, CacheError> {
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                CacheError::ConnectionFailed(format!("{}: {}", dir.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let db = Self::open(options, FILE_CONNECTIONS, &db_path.display().to_string()).await?;
        tracing::info!(path = %db_path.display(), "Opened folder database");
        Ok(db)
    }

    /// Opens a private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| CacheError::ConnectionFailed(format!("in-memory database: {}", e)))?;
        Self::open(options, 1, ":memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for in-flight queries and closes every connection
    pub async fn close(self) {
        self.pool.close().await;
    }

    async fn open(
        options: SqliteConnectOptions,
        connections: u32,
        label: &str,
    ) -> Result<Self, CacheError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(connections)
            .connect_with(options)
            .await
            .map_err(|e| CacheError::ConnectionFailed(format!("{}: {}", label, e)))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| CacheError::MigrationFailed(format!("{}: {}", label, e)))?;

        tracing::debug!(database = label, connections, "Schema applied");
        Ok(Self { pool })
    }
}

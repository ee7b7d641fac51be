//! mailsync Cache - Local folder persistence
//!
//! Keeps, per account, the folder records the refresh maintains and the
//! extra strings it stores beside them (the mailbox state token).
//!
//! [`SqliteFolderStore`] is the SQLite implementation of the `IFolderStore`
//! port from `mailsync-core`. Several stores share one [`DatabasePool`];
//! rows are partitioned by account name.
//!
//! ```no_run
//! use std::path::Path;
//! use mailsync_cache::{DatabasePool, SqliteFolderStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let db = DatabasePool::new(Path::new("/var/lib/mailsync/mailsync.db")).await?;
//! let personal = SqliteFolderStore::new(db.pool().clone(), "personal");
//! let work = SqliteFolderStore::new(db.pool().clone(), "work");
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod store;

pub use pool::DatabasePool;
pub use store::SqliteFolderStore;

/// Failures of the SQLite folder store
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The database file could not be opened
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The embedded schema could not be applied
    #[error("Cannot apply schema: {0}")]
    MigrationFailed(String),

    /// A stored column holds a value the domain rejects
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}

//! SQLite implementation of IFolderStore
//!
//! One [`SqliteFolderStore`] serves one account: every query is filtered by
//! the account name given at construction.
//!
//! ## Type Mapping
//!
//! | Domain Type | SQL Type | Strategy                                         |
//! |-------------|----------|--------------------------------------------------|
//! | MailboxId   | TEXT     | `.as_str()` / `MailboxId::new()`                 |
//! | FolderKind  | TEXT     | `.as_str()` / `FromStr`                          |
//! | timestamps  | TEXT     | ISO 8601 via `to_rfc3339()`                      |

use std::collections::HashSet;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use mailsync_core::domain::{FolderKind, LocalFolder, MailboxId};
use mailsync_core::ports::IFolderStore;

use crate::CacheError;

/// SQLite-based folder store bound to a single account
pub struct SqliteFolderStore {
    pool: SqlitePool,
    account: String,
}

impl SqliteFolderStore {
    /// Creates a store for `account` on the given connection pool
    pub fn new(pool: SqlitePool, account: impl Into<String>) -> Self {
        Self {
            pool,
            account: account.into(),
        }
    }

    /// Name of the account this store is scoped to
    pub fn account(&self) -> &str {
        &self.account
    }
}

// ============================================================================
// Helper functions for type conversion
// ============================================================================

fn mailbox_id_from_string(value: String) -> Result<MailboxId, CacheError> {
    MailboxId::new(value).map_err(|e| CacheError::InvalidRow(e.to_string()))
}

fn folder_from_row(row: &SqliteRow) -> Result<LocalFolder, CacheError> {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let kind: String = row.get("kind");

    Ok(LocalFolder {
        id: mailbox_id_from_string(id)?,
        name,
        kind: kind
            .parse::<FolderKind>()
            .map_err(|e| CacheError::InvalidRow(e.to_string()))?,
    })
}

// ============================================================================
// IFolderStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IFolderStore for SqliteFolderStore {
    async fn get_folder_ids(&self) -> anyhow::Result<HashSet<MailboxId>> {
        let rows = sqlx::query("SELECT id FROM folders WHERE account = ?")
            .bind(&self.account)
            .fetch_all(&self.pool)
            .await?;

        let mut ids = HashSet::with_capacity(rows.len());
        for row in &rows {
            ids.insert(mailbox_id_from_string(row.get("id"))?);
        }
        Ok(ids)
    }

    async fn get_folders(&self) -> anyhow::Result<Vec<LocalFolder>> {
        let rows = sqlx::query(
            "SELECT id, name, kind FROM folders WHERE account = ? ORDER BY name, id",
        )
        .bind(&self.account)
        .fetch_all(&self.pool)
        .await?;

        let mut folders = Vec::with_capacity(rows.len());
        for row in &rows {
            folders.push(folder_from_row(row)?);
        }
        Ok(folders)
    }

    async fn create_folders(&self, folders: &[LocalFolder]) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for folder in folders {
            sqlx::query(
                "INSERT INTO folders (account, id, name, kind, updated_at) \
                 VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT(account, id) DO UPDATE SET \
                 name = excluded.name, kind = excluded.kind, updated_at = excluded.updated_at",
            )
            .bind(&self.account)
            .bind(folder.id.as_str())
            .bind(&folder.name)
            .bind(folder.kind.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::trace!(account = %self.account, count = folders.len(), "Created folders");
        Ok(())
    }

    async fn change_folder(
        &self,
        id: &MailboxId,
        name: &str,
        kind: FolderKind,
    ) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE folders SET name = ?, kind = ?, updated_at = ? WHERE account = ? AND id = ?",
        )
        .bind(name)
        .bind(kind.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(&self.account)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(account = %self.account, folder_id = %id, "Change for unknown folder ignored");
        } else {
            tracing::trace!(account = %self.account, folder_id = %id, "Changed folder");
        }
        Ok(())
    }

    async fn delete_folders(&self, ids: &HashSet<MailboxId>) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        for id in ids {
            sqlx::query("DELETE FROM folders WHERE account = ? AND id = ?")
                .bind(&self.account)
                .bind(id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::trace!(account = %self.account, count = ids.len(), "Deleted folders");
        Ok(())
    }

    async fn get_extra_string(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM extra_strings WHERE account = ? AND key = ?")
            .bind(&self.account)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn set_extra_string(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO extra_strings (account, key, value, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&self.account)
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(account = %self.account, key, "Stored extra string");
        Ok(())
    }
}

//! Folder store port (driven/secondary port)
//!
//! This module defines the interface for the local folder list and the
//! small key-value "extra" storage that holds per-account sync state.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, in-memory, ...) and the refresh use case never branches on them.
//! - A store instance is bound to one account; callers never pass an
//!   account identifier.

use std::collections::HashSet;

use crate::domain::{FolderKind, LocalFolder, MailboxId};

/// Port trait for local folder persistence
///
/// ## Implementation Notes
///
/// - Every call must be atomic and durable when it returns: the refresh
///   use case advances the sync state only after the folder operations of
///   the same batch returned successfully.
/// - `create_folders` and `delete_folders` receive whole batches so the
///   implementation can wrap them in a single transaction.
#[async_trait::async_trait]
pub trait IFolderStore: Send + Sync {
    /// Returns the identifiers of every stored folder
    async fn get_folder_ids(&self) -> anyhow::Result<HashSet<MailboxId>>;

    /// Returns every stored folder record
    async fn get_folders(&self) -> anyhow::Result<Vec<LocalFolder>>;

    /// Inserts new folder records
    async fn create_folders(&self, folders: &[LocalFolder]) -> anyhow::Result<()>;

    /// Updates name and kind of an existing folder record
    async fn change_folder(&self, id: &MailboxId, name: &str, kind: FolderKind)
        -> anyhow::Result<()>;

    /// Removes folder records; unknown identifiers are ignored
    async fn delete_folders(&self, ids: &HashSet<MailboxId>) -> anyhow::Result<()>;

    /// Reads a value from the extra key-value storage
    async fn get_extra_string(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Writes a value to the extra key-value storage (insert or replace)
    async fn set_extra_string(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

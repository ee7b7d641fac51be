//! Folder refresh use case
//!
//! Keeps the local folder list of one account aligned with the server.
//!
//! A refresh starts from the persisted state token:
//! - no token: fetch the full mailbox list and diff it against local storage
//! - token present: page through the server's change log until it reports no
//!   further changes, falling back to a full fetch when the server can no
//!   longer compute changes from the stored token
//!
//! The token is written only after the folder changes it covers have been
//! stored. An interrupted refresh therefore re-applies at most one batch,
//! and every operation below tolerates being applied twice.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::refresh_error::RefreshError;
use crate::{
    domain::{LocalFolder, MailboxId, SyncState, SyncStateToken, MAILBOX_STATE_KEY},
    ports::{IFolderStore, IMailboxProtocol, MailboxChanges},
};

/// Upper bound on change requests issued by a single refresh
pub const DEFAULT_MAX_DELTA_ROUNDS: u32 = 100;

/// How a refresh brought the local folders up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Full mailbox list fetched and diffed
    Full,
    /// Change log replayed from the stored token
    Delta,
    /// Change log rejected the stored token; full list fetched instead
    FallbackToFull,
}

impl std::fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RefreshMode::Full => "full",
            RefreshMode::Delta => "delta",
            RefreshMode::FallbackToFull => "fallback to full",
        };
        f.write_str(label)
    }
}

/// Outcome of a successful refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub mode: RefreshMode,
    pub folders_created: u32,
    pub folders_updated: u32,
    pub folders_deleted: u32,
    /// Number of change requests sent (0 for a plain full fetch)
    pub delta_rounds: u32,
    /// Token persisted at the end of the refresh
    pub state: SyncStateToken,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Default)]
struct ApplyStats {
    created: u32,
    updated: u32,
    deleted: u32,
}

/// Use case that refreshes the folder list of one account
pub struct RefreshFoldersUseCase {
    protocol: Arc<dyn IMailboxProtocol + Send + Sync>,
    folder_store: Arc<dyn IFolderStore + Send + Sync>,
    max_delta_rounds: u32,
}

impl RefreshFoldersUseCase {
    /// Creates a new RefreshFoldersUseCase
    ///
    /// # Arguments
    ///
    /// * `protocol` - Client for the account's mail server
    /// * `folder_store` - Local folder storage bound to the same account
    pub fn new(
        protocol: Arc<dyn IMailboxProtocol + Send + Sync>,
        folder_store: Arc<dyn IFolderStore + Send + Sync>,
    ) -> Self {
        Self {
            protocol,
            folder_store,
            max_delta_rounds: DEFAULT_MAX_DELTA_ROUNDS,
        }
    }

    /// Overrides the maximum number of change requests per refresh
    pub fn with_max_delta_rounds(mut self, rounds: u32) -> Self {
        self.max_delta_rounds = rounds.max(1);
        self
    }

    /// Brings the local folder list up to date with the server
    ///
    /// Chooses between a full fetch and a delta replay based on the stored
    /// state token. A server that cannot compute changes triggers a full
    /// fetch transparently.
    ///
    /// # Errors
    ///
    /// Every failure is returned as a classified [`RefreshError`]. The stored
    /// token is never advanced past changes that were not persisted.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<RefreshSummary, RefreshError> {
        self.run(false).await
    }

    /// Discards the stored token and fetches the full mailbox list
    #[tracing::instrument(skip(self))]
    pub async fn refresh_full(&self) -> Result<RefreshSummary, RefreshError> {
        self.run(true).await
    }

    async fn run(&self, force_full: bool) -> Result<RefreshSummary, RefreshError> {
        let start = Instant::now();

        match self.sync_folders(force_full).await {
            Ok((mode, state, stats, delta_rounds)) => {
                let summary = RefreshSummary {
                    mode,
                    folders_created: stats.created,
                    folders_updated: stats.updated,
                    folders_deleted: stats.deleted,
                    delta_rounds,
                    state,
                    completed_at: Utc::now(),
                    duration_ms: start.elapsed().as_millis() as u64,
                };
                info!(
                    mode = %summary.mode,
                    created = summary.folders_created,
                    updated = summary.folders_updated,
                    deleted = summary.folders_deleted,
                    rounds = summary.delta_rounds,
                    duration_ms = summary.duration_ms,
                    "Folder refresh completed"
                );
                Ok(summary)
            }
            Err(err) => {
                let err = RefreshError::classify(err);
                error!(error = %err, retryable = err.is_retryable(), "Folder refresh failed");
                Err(err)
            }
        }
    }

    async fn sync_folders(
        &self,
        force_full: bool,
    ) -> Result<(RefreshMode, SyncStateToken, ApplyStats, u32)> {
        let mut stats = ApplyStats::default();

        let state = if force_full {
            SyncState::Uninitialized
        } else {
            let stored = self
                .folder_store
                .get_extra_string(MAILBOX_STATE_KEY)
                .await
                .context("Failed to read stored mailbox state")?;
            SyncState::from_stored(stored)
        };

        match state {
            SyncState::Uninitialized => {
                info!("Starting full folder fetch");
                let token = self.full_fetch(&mut stats).await?;
                Ok((RefreshMode::Full, token, stats, 0))
            }
            SyncState::SyncedAt(token) => {
                info!(state = %token, "Starting delta folder fetch");
                self.delta_fetch_loop(token, &mut stats)
                    .await
                    .map(|(mode, token, rounds)| (mode, token, stats, rounds))
            }
        }
    }

    /// Replaces the local folder list with the server's full list
    async fn full_fetch(&self, stats: &mut ApplyStats) -> Result<SyncStateToken> {
        let snapshot = self.protocol.get_all_mailboxes().await?;

        let local: HashMap<MailboxId, LocalFolder> = self
            .folder_store
            .get_folders()
            .await
            .context("Failed to load local folders")?
            .into_iter()
            .map(|folder| (folder.id.clone(), folder))
            .collect();

        let mut remote_ids = HashSet::with_capacity(snapshot.folders.len());
        let mut to_create = Vec::new();

        for remote in &snapshot.folders {
            if !remote_ids.insert(remote.id.clone()) {
                warn!(id = %remote.id, "Duplicate mailbox in server response, ignoring");
                continue;
            }

            match local.get(&remote.id) {
                Some(existing) if existing.matches(remote) => {}
                Some(_) => {
                    debug!(id = %remote.id, name = %remote.name, kind = %remote.kind(), "Updating folder");
                    self.folder_store
                        .change_folder(&remote.id, &remote.name, remote.kind())
                        .await
                        .with_context(|| format!("Failed to update folder {}", remote.id))?;
                    stats.updated += 1;
                }
                None => to_create.push(remote.to_local()),
            }
        }

        if !to_create.is_empty() {
            self.folder_store
                .create_folders(&to_create)
                .await
                .context("Failed to create folders")?;
            stats.created += to_create.len() as u32;
        }

        let to_delete: HashSet<MailboxId> = local
            .into_keys()
            .filter(|id| !remote_ids.contains(id))
            .collect();

        if !to_delete.is_empty() {
            self.folder_store
                .delete_folders(&to_delete)
                .await
                .context("Failed to delete folders")?;
            stats.deleted += to_delete.len() as u32;
        }

        debug!(
            remote = remote_ids.len(),
            created = to_create.len(),
            deleted = to_delete.len(),
            "Full folder fetch applied"
        );

        self.save_state(&snapshot.state).await?;
        Ok(snapshot.state)
    }

    /// Replays the server's change log starting at `since`
    async fn delta_fetch_loop(
        &self,
        since: SyncStateToken,
        stats: &mut ApplyStats,
    ) -> Result<(RefreshMode, SyncStateToken, u32)> {
        let mut current = since;

        for round in 1..=self.max_delta_rounds {
            let changes = match self.protocol.get_mailbox_changes(&current).await {
                Ok(changes) => changes,
                Err(err) if err.is_cannot_calculate_changes() => {
                    warn!(state = %current, "Server cannot calculate changes, performing full resync");
                    let token = self.full_fetch(stats).await?;
                    return Ok((RefreshMode::FallbackToFull, token, round));
                }
                Err(err) => return Err(err.into()),
            };

            debug!(
                round,
                created = changes.delta.created.len(),
                changed = changes.delta.changed.len(),
                destroyed = changes.delta.destroyed.len(),
                has_more = changes.delta.has_more,
                "Received mailbox changes"
            );

            self.apply_changes(&changes, stats).await?;

            let MailboxChanges { delta, .. } = changes;
            self.save_state(&delta.new_state).await?;

            if !delta.has_more {
                return Ok((RefreshMode::Delta, delta.new_state, round));
            }

            if delta.new_state == current {
                warn!(state = %current, "Server reported more changes without advancing state");
                return Err(RefreshError::ProtocolAnomaly { rounds: round }.into());
            }

            current = delta.new_state;
        }

        warn!(
            rounds = self.max_delta_rounds,
            "Server still reports more changes after the round limit"
        );
        Err(RefreshError::ProtocolAnomaly {
            rounds: self.max_delta_rounds,
        }
        .into())
    }

    /// Applies one batch of changes to local storage
    ///
    /// Details of created and changed ids are upserted against what is stored
    /// locally; destroyed ids and ids the server could not hydrate are
    /// removed if present.
    async fn apply_changes(&self, changes: &MailboxChanges, stats: &mut ApplyStats) -> Result<()> {
        let local_ids = self
            .folder_store
            .get_folder_ids()
            .await
            .context("Failed to load local folder ids")?;

        let mut to_create: Vec<LocalFolder> = Vec::new();
        let mut seen = HashSet::new();

        for remote in changes.created.iter().chain(changes.changed.iter()) {
            if !seen.insert(remote.id.clone()) {
                continue;
            }

            if local_ids.contains(&remote.id) {
                self.folder_store
                    .change_folder(&remote.id, &remote.name, remote.kind())
                    .await
                    .with_context(|| format!("Failed to update folder {}", remote.id))?;
                stats.updated += 1;
            } else {
                to_create.push(remote.to_local());
            }
        }

        if !to_create.is_empty() {
            self.folder_store
                .create_folders(&to_create)
                .await
                .context("Failed to create folders")?;
            stats.created += to_create.len() as u32;
        }

        let to_delete: HashSet<MailboxId> = changes
            .delta
            .destroyed
            .iter()
            .chain(changes.not_found.iter())
            .filter(|id| local_ids.contains(*id) || seen.contains(*id))
            .cloned()
            .collect();

        if !to_delete.is_empty() {
            self.folder_store
                .delete_folders(&to_delete)
                .await
                .context("Failed to delete folders")?;
            stats.deleted += to_delete.len() as u32;
        }

        Ok(())
    }

    async fn save_state(&self, token: &SyncStateToken) -> Result<()> {
        self.folder_store
            .set_extra_string(MAILBOX_STATE_KEY, token.as_str())
            .await
            .context("Failed to persist mailbox state")
    }
}

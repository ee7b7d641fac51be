//! Folders command - List locally stored folders
//!
//! Reads the SQLite database only; no request is sent to the server.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use tracing::info;

use mailsync_cache::{DatabasePool, SqliteFolderStore};
use mailsync_core::domain::{LocalFolder, SyncState, MAILBOX_STATE_KEY};
use mailsync_core::ports::IFolderStore;

use super::{select_accounts, CommandContext};
use crate::output::{plural, OutputFormatter};

#[derive(Debug, Args)]
pub struct FoldersCommand {
    /// Only list folders of this account
    #[arg(long)]
    pub account: Option<String>,
}

/// Stored folders and sync state of one account
#[derive(Debug)]
pub struct FolderListing {
    pub account: String,
    pub state: SyncState,
    pub folders: Vec<LocalFolder>,
}

impl FolderListing {
    pub async fn load(store: &SqliteFolderStore) -> Result<Self> {
        let account = store.account();
        let folders = store
            .get_folders()
            .await
            .with_context(|| format!("Failed to read folders of account '{}'", account))?;
        let stored = store
            .get_extra_string(MAILBOX_STATE_KEY)
            .await
            .with_context(|| format!("Failed to read sync state of account '{}'", account))?;

        Ok(Self {
            account: account.to_string(),
            state: SyncState::from_stored(stored),
            folders,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "account": self.account,
            "state": self.state.token().map(|t| t.as_str()),
            "folders": self.folders.iter().map(|f| json!({
                "id": f.id.as_str(),
                "name": f.name,
                "kind": f.kind.as_str(),
            })).collect::<Vec<_>>(),
        })
    }

    fn print(&self, formatter: &dyn OutputFormatter) {
        let heading = match self.state.token() {
            Some(token) => format!(
                "{}: {} (state {})",
                self.account,
                plural(self.folders.len(), "folder"),
                token
            ),
            None => format!("{}: never synchronized", self.account),
        };
        formatter.success(&heading);

        for folder in &self.folders {
            formatter.info(&format!(
                "{:<8} {}  [{}]",
                folder.kind.as_str(),
                folder.name,
                folder.id
            ));
        }
    }
}

impl FoldersCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;
        let accounts = select_accounts(&config, self.account.as_deref())?;

        let db = DatabasePool::new(&config.storage.database)
            .await
            .context("Failed to open database")?;

        info!(database = %config.storage.database.display(), "Listing stored folders");

        let mut listings = Vec::with_capacity(accounts.len());
        for account in accounts {
            let store = SqliteFolderStore::new(db.pool().clone(), account.name.clone());
            listings.push(FolderListing::load(&store).await?);
        }

        if ctx.format.is_json() {
            let accounts: Vec<_> = listings.iter().map(FolderListing::to_json).collect();
            formatter.print_json(&json!({ "accounts": accounts }));
        } else {
            for listing in &listings {
                listing.print(formatter.as_ref());
            }
        }

        Ok(())
    }
}

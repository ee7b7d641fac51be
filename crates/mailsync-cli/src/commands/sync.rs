//! Sync command - Refresh folder lists from the server
//!
//! Provides the `mailsync sync` CLI command which:
//! 1. Loads configuration and opens the database
//! 2. Builds a JMAP provider and a folder store per selected account
//! 3. Runs one refresh task per account concurrently
//! 4. Reports each account's summary or classified failure

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use mailsync_cache::{DatabasePool, SqliteFolderStore};
use mailsync_core::config::{AccountConfig, Config};
use mailsync_core::usecases::{RefreshError, RefreshFoldersUseCase, RefreshSummary};
use mailsync_jmap::{client::JmapClient, provider::JmapMailboxProvider};

use super::{select_accounts, CommandContext};
use crate::output::{format_duration_ms, plural, OutputFormatter};

/// Sync command with clap options
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Only refresh this account
    #[arg(long)]
    pub account: Option<String>,

    /// Ignore the stored state token and refetch the full folder list
    #[arg(long)]
    pub full: bool,
}

/// Result of refreshing one account
#[derive(Debug)]
pub enum AccountOutcome {
    Synced(RefreshSummary),
    Failed {
        message: String,
        retryable: bool,
        authentication_failed: bool,
    },
}

impl AccountOutcome {
    fn from_refresh(result: Result<RefreshSummary, RefreshError>) -> Self {
        match result {
            Ok(summary) => AccountOutcome::Synced(summary),
            Err(err) => AccountOutcome::Failed {
                retryable: err.is_retryable(),
                authentication_failed: err.is_authentication_failure(),
                message: err.to_string(),
            },
        }
    }

    /// Failure that happened before any request was sent
    fn not_started(err: anyhow::Error) -> Self {
        AccountOutcome::Failed {
            message: format!("{:#}", err),
            retryable: false,
            authentication_failed: false,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AccountOutcome::Failed { .. })
    }

    pub fn to_json(&self, account: &str) -> Result<serde_json::Value> {
        Ok(match self {
            AccountOutcome::Synced(summary) => serde_json::json!({
                "account": account,
                "success": true,
                "summary": serde_json::to_value(summary)
                    .context("Failed to serialize refresh summary")?,
            }),
            AccountOutcome::Failed {
                message,
                retryable,
                authentication_failed,
            } => serde_json::json!({
                "account": account,
                "success": false,
                "error": message,
                "retryable": retryable,
                "authentication_failed": authentication_failed,
            }),
        })
    }
}

enum RefreshTask {
    Running(JoinHandle<Result<RefreshSummary, RefreshError>>),
    NotStarted(anyhow::Error),
}

impl SyncCommand {
    /// Execute the sync command
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;
        let accounts = select_accounts(&config, self.account.as_deref())?;

        let db = DatabasePool::new(&config.storage.database)
            .await
            .context("Failed to open database")?;

        info!(
            database = %config.storage.database.display(),
            accounts = accounts.len(),
            full = self.full,
            "Starting folder sync"
        );
        if self.full {
            formatter.info("Full refresh requested - ignoring stored state tokens");
        }

        let mut tasks = Vec::with_capacity(accounts.len());
        for account in accounts {
            let task = match build_use_case(account, &config, &db) {
                Ok(use_case) => {
                    let full = self.full;
                    RefreshTask::Running(tokio::spawn(async move {
                        if full {
                            use_case.refresh_full().await
                        } else {
                            use_case.refresh().await
                        }
                    }))
                }
                Err(e) => RefreshTask::NotStarted(e),
            };
            tasks.push((account.name.clone(), task));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (name, task) in tasks {
            let outcome = match task {
                RefreshTask::Running(handle) => match handle.await {
                    Ok(result) => AccountOutcome::from_refresh(result),
                    Err(join_err) => AccountOutcome::not_started(
                        anyhow::Error::new(join_err).context("Refresh task aborted"),
                    ),
                },
                RefreshTask::NotStarted(e) => AccountOutcome::not_started(e),
            };
            if let AccountOutcome::Failed { message, .. } = &outcome {
                warn!(account = %name, error = %message, "Folder sync failed");
            }
            outcomes.push((name, outcome));
        }

        report(formatter.as_ref(), ctx.format.is_json(), &outcomes)?;

        let failed = outcomes.iter().filter(|(_, o)| o.is_failure()).count();
        if failed > 0 {
            bail!("{} failed to sync", plural(failed, "account"));
        }
        Ok(())
    }
}

/// Wires the JMAP provider and the SQLite store for one account
fn build_use_case(
    account: &AccountConfig,
    config: &Config,
    db: &DatabasePool,
) -> Result<RefreshFoldersUseCase> {
    let token = account.resolve_token()?;

    let client = JmapClient::new(account.api_url.clone(), token);
    let provider = JmapMailboxProvider::new(client, account.account_id.clone())
        .with_max_changes(config.sync.max_changes);
    let store = SqliteFolderStore::new(db.pool().clone(), account.name.clone());

    Ok(
        RefreshFoldersUseCase::new(Arc::new(provider), Arc::new(store))
            .with_max_delta_rounds(config.sync.max_delta_rounds),
    )
}

/// One line per count that changed, for human output
fn describe_summary(summary: &RefreshSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.folders_created > 0 {
        lines.push(format!("Created: {}", plural(summary.folders_created as usize, "folder")));
    }
    if summary.folders_updated > 0 {
        lines.push(format!("Updated: {}", plural(summary.folders_updated as usize, "folder")));
    }
    if summary.folders_deleted > 0 {
        lines.push(format!("Deleted: {}", plural(summary.folders_deleted as usize, "folder")));
    }
    if summary.delta_rounds > 0 {
        lines.push(format!("Rounds:  {}", summary.delta_rounds));
    }
    lines.push(format!("State:   {}", summary.state));
    lines
}

fn report(
    formatter: &dyn OutputFormatter,
    json: bool,
    outcomes: &[(String, AccountOutcome)],
) -> Result<()> {
    if json {
        let accounts = outcomes
            .iter()
            .map(|(name, outcome)| outcome.to_json(name))
            .collect::<Result<Vec<_>>>()?;
        formatter.print_json(&serde_json::json!({ "accounts": accounts }));
        return Ok(());
    }

    for (name, outcome) in outcomes {
        match outcome {
            AccountOutcome::Synced(summary) => {
                let changed =
                    summary.folders_created + summary.folders_updated + summary.folders_deleted;
                if changed == 0 {
                    formatter.success(&format!("{}: already up to date", name));
                } else {
                    formatter.success(&format!(
                        "{}: {} refresh completed in {}",
                        name,
                        summary.mode,
                        format_duration_ms(summary.duration_ms)
                    ));
                }
                for line in describe_summary(summary) {
                    formatter.info(&line);
                }
            }
            AccountOutcome::Failed {
                message,
                retryable,
                authentication_failed,
            } => {
                formatter.error(&format!("{}: {}", name, message));
                if *authentication_failed {
                    formatter.info("Check the access token configured for this account");
                } else if *retryable {
                    formatter.info("The server is temporarily unavailable; try again later");
                }
            }
        }
    }
    Ok(())
}

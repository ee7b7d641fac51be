//! CLI subcommands

use std::path::PathBuf;

use anyhow::{bail, Result};

use mailsync_core::config::{AccountConfig, Config};

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

pub mod config;
pub mod folders;
pub mod sync;

/// Options shared by every subcommand
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config_path: PathBuf,
}

impl CommandContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    /// Loads the configuration file, or defaults if it does not exist
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_config(&self) -> Result<Config> {
        if self.config_path.exists() {
            Config::load(&self.config_path)
        } else {
            Ok(Config::default())
        }
    }
}

/// Resolves `--account`: the named account, or every configured one
pub fn select_accounts<'a>(
    config: &'a Config,
    name: Option<&str>,
) -> Result<Vec<&'a AccountConfig>> {
    if config.accounts.is_empty() {
        bail!("No accounts configured. Run 'mailsync config init' to create a configuration.");
    }

    match name {
        Some(name) => match config.account(name) {
            Some(account) => Ok(vec![account]),
            None => bail!("Unknown account '{}'", name),
        },
        None => Ok(config.accounts.iter().collect()),
    }
}

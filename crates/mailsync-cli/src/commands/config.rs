//! Config command - View and manage mailsync configuration
//!
//! Provides the `mailsync config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports errors
//! 3. Writes a starter configuration file

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use mailsync_core::config::{Config, ConfigBuilder};

use super::CommandContext;
use crate::output::plural;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Validate => self.execute_validate(ctx),
            ConfigCommand::Init { force } => self.execute_init(ctx, *force),
        }
    }

    fn execute_show(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
            formatter.info("");
            for line in config.to_yaml()?.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    fn execute_validate(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let path = &ctx.config_path;

        if !path.exists() {
            if ctx.format.is_json() {
                formatter.print_json(&serde_json::json!({
                    "valid": false,
                    "config_path": path.display().to_string(),
                    "errors": ["Configuration file not found"],
                }));
            } else {
                formatter.error(&format!("Configuration file not found at {}", path.display()));
                formatter.info("Run 'mailsync config init' to create one.");
            }
            return Ok(());
        }

        let config = match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                if ctx.format.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": path.display().to_string(),
                        "errors": [format!("{:#}", e)],
                    }));
                } else {
                    formatter.error(&format!("{:#}", e));
                }
                return Ok(());
            }
        };

        info!(config_path = %path.display(), "Validating configuration");

        let errors = config.validate();

        if ctx.format.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", path.display()));
            formatter.info(&format!("Accounts: {}", config.accounts.len()));
        } else {
            formatter.error(&format!("Configuration has {}:", plural(errors.len(), "error")));
            formatter.info(&format!("File: {}", path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }

    fn execute_init(&self, ctx: &CommandContext, force: bool) -> Result<()> {
        let formatter = ctx.formatter();

        write_starter_config(&ctx.config_path, force)?;
        info!(config_path = %ctx.config_path.display(), "Wrote starter configuration");

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "config_path": ctx.config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Created {}", ctx.config_path.display()));
            formatter.info("Edit the account entry, then export the token variable it names.");
        }
        Ok(())
    }
}

/// Configuration written by `mailsync config init`
fn starter_config() -> Config {
    ConfigBuilder::new()
        .account(
            "personal",
            "https://jmap.example.com/jmap/api/",
            "your-account-id",
            "MAILSYNC_PERSONAL_TOKEN",
        )
        .build()
}

fn write_starter_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
    }

    let yaml = starter_config().to_yaml()?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_config_is_valid() {
        let errors = starter_config().validate();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_init_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mailsync").join("config.yaml");

        write_starter_config(&path, false).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].token_env, "MAILSYNC_PERSONAL_TOKEN");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logging:\n  level: debug\n").unwrap();

        let err = write_starter_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "logging:\n  level: debug\n"
        );

        write_starter_config(&path, true).unwrap();
        assert_eq!(Config::load(&path).unwrap().accounts.len(), 1);
    }
}

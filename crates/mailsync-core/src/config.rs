//! Configuration module for mailsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::usecases::DEFAULT_MAX_DELTA_ROUNDS;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for mailsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub accounts: Vec<AccountConfig>,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// A mail account reachable over JMAP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Local label, unique across the file.
    pub name: String,
    /// JMAP API endpoint that receives method-call batches.
    pub api_url: String,
    /// JMAP account id used in every method call.
    pub account_id: String,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
}

/// Folder synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum `Mailbox/changes` round trips in one refresh.
    pub max_delta_rounds: u32,
    /// Optional `maxChanges` hint sent with every changes request.
    pub max_changes: Option<u32>,
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub database: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/mailsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mailsync")
            .join("config.yaml")
    }

    /// Serialize the configuration back to YAML.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration")
    }

    /// Look up an account by its `name`.
    pub fn account(&self, name: &str) -> Option<&AccountConfig> {
        self.accounts.iter().find(|a| a.name == name)
    }
}

impl AccountConfig {
    /// Read the bearer token from the environment variable named by `token_env`.
    pub fn resolve_token(&self) -> anyhow::Result<String> {
        let token = std::env::var(&self.token_env).with_context(|| {
            format!(
                "Environment variable {} is not set (token for account '{}')",
                self.token_env, self.name
            )
        })?;
        if token.trim().is_empty() {
            anyhow::bail!(
                "Environment variable {} is empty (token for account '{}')",
                self.token_env,
                self.name
            );
        }
        Ok(token)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_delta_rounds: DEFAULT_MAX_DELTA_ROUNDS,
            max_changes: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("mailsync")
                .join("mailsync.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.max_delta_rounds"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- accounts ---
        let mut seen_names = std::collections::HashSet::new();
        for (index, account) in self.accounts.iter().enumerate() {
            let prefix = format!("accounts[{index}]");

            if account.name.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("{prefix}.name"),
                    message: "must not be empty".into(),
                });
            } else if !seen_names.insert(account.name.as_str()) {
                errors.push(ValidationError {
                    field: format!("{prefix}.name"),
                    message: format!("duplicate account name '{}'", account.name),
                });
            }

            if !(account.api_url.starts_with("https://") || account.api_url.starts_with("http://"))
            {
                errors.push(ValidationError {
                    field: format!("{prefix}.api_url"),
                    message: format!("must be an http(s) URL, got '{}'", account.api_url),
                });
            }

            if account.account_id.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("{prefix}.account_id"),
                    message: "must not be empty".into(),
                });
            }

            if account.token_env.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("{prefix}.token_env"),
                    message: "must name an environment variable".into(),
                });
            }
        }

        // --- sync ---
        if self.sync.max_delta_rounds == 0 {
            errors.push(ValidationError {
                field: "sync.max_delta_rounds".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.max_changes == Some(0) {
            errors.push(ValidationError {
                field: "sync.max_changes".into(),
                message: "must be greater than 0 when set".into(),
            });
        }

        // --- storage ---
        if self.storage.database.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.database".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use mailsync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .account("work", "https://jmap.example.com/api/", "u1234", "WORK_TOKEN")
///     .sync_max_delta_rounds(50)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- accounts ---

    pub fn account(
        mut self,
        name: impl Into<String>,
        api_url: impl Into<String>,
        account_id: impl Into<String>,
        token_env: impl Into<String>,
    ) -> Self {
        self.config.accounts.push(AccountConfig {
            name: name.into(),
            api_url: api_url.into(),
            account_id: account_id.into(),
            token_env: token_env.into(),
        });
        self
    }

    // --- sync ---

    pub fn sync_max_delta_rounds(mut self, rounds: u32) -> Self {
        self.config.sync.max_delta_rounds = rounds;
        self
    }

    pub fn sync_max_changes(mut self, max_changes: u32) -> Self {
        self.config.sync.max_changes = Some(max_changes);
        self
    }

    // --- storage ---

    pub fn storage_database(mut self, path: PathBuf) -> Self {
        self.config.storage.database = path;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

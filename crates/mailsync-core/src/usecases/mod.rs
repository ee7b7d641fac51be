//! Use cases (application services)
//!
//! Use cases orchestrate domain types through the ports; they hold no I/O
//! of their own.

pub mod refresh_error;
pub mod refresh_folders;

pub use refresh_error::RefreshError;
pub use refresh_folders::{
    RefreshFoldersUseCase, RefreshMode, RefreshSummary, DEFAULT_MAX_DELTA_ROUNDS,
};

//! Domain entities and business logic
//!
//! This module contains the core domain types for mailsync:
//! - Newtypes for mailbox identifiers and sync state tokens
//! - Folder types (remote snapshot, local record, role and kind)
//! - The sync state machine (uninitialized vs. synced at a token)
//! - Domain-specific error types

pub mod errors;
pub mod folder;
pub mod newtypes;
pub mod sync_state;

// Re-export commonly used types
pub use errors::DomainError;
pub use folder::{FolderKind, LocalFolder, MailboxRole, RemoteFolder};
pub use newtypes::{MailboxId, SyncStateToken};
pub use sync_state::{SyncState, MAILBOX_STATE_KEY};

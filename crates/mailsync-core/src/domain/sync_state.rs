//! Folder sync state machine
//!
//! Whether an account was ever synchronized is decided solely by the presence
//! of a persisted state token. The two states are modelled explicitly so the
//! transitions (first sync, delta sync, fallback to full resync) are visible
//! in the type system instead of hiding behind an `Option<String>` check.

use super::newtypes::SyncStateToken;

/// Extra-string key under which the mailbox state token is persisted
pub const MAILBOX_STATE_KEY: &str = "jmapState";

/// Synchronization state of an account's folder list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// No token stored; the next refresh must fetch the full folder list
    Uninitialized,
    /// Local folders reflect the server as of this token
    SyncedAt(SyncStateToken),
}

impl SyncState {
    /// Builds the state from the raw value read from storage
    ///
    /// An empty stored value cannot be sent back to the server, so it is
    /// treated the same as a missing one.
    pub fn from_stored(value: Option<String>) -> Self {
        match value.map(SyncStateToken::new) {
            Some(Ok(token)) => SyncState::SyncedAt(token),
            Some(Err(_)) | None => SyncState::Uninitialized,
        }
    }

    /// Returns the token if the account was synchronized before
    pub fn token(&self) -> Option<&SyncStateToken> {
        match self {
            SyncState::Uninitialized => None,
            SyncState::SyncedAt(token) => Some(token),
        }
    }

    /// Returns true once a token has been stored
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncState::SyncedAt(_))
    }
}

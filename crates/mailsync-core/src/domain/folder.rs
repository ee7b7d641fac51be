//! Folder domain types
//!
//! A folder exists in two shapes:
//! - [`RemoteFolder`] - immutable snapshot of a mailbox as reported by the server
//! - [`LocalFolder`] - the record kept by the local folder store
//!
//! The server tags special-purpose mailboxes with a [`MailboxRole`]; the local
//! side only knows the derived [`FolderKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{errors::DomainError, newtypes::MailboxId};

/// Role assigned by the server to a special-purpose mailbox
///
/// Roles come from an IANA registry that servers may extend, so unknown
/// values are preserved in [`MailboxRole::Other`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxRole {
    Inbox,
    Archive,
    Drafts,
    Sent,
    Trash,
    /// Registered as `junk`; some servers still send `spam`
    Junk,
    Other(String),
}

impl MailboxRole {
    /// Returns the wire representation of the role
    pub fn as_str(&self) -> &str {
        match self {
            MailboxRole::Inbox => "inbox",
            MailboxRole::Archive => "archive",
            MailboxRole::Drafts => "drafts",
            MailboxRole::Sent => "sent",
            MailboxRole::Trash => "trash",
            MailboxRole::Junk => "junk",
            MailboxRole::Other(role) => role,
        }
    }
}

impl From<&str> for MailboxRole {
    fn from(role: &str) -> Self {
        match role.to_ascii_lowercase().as_str() {
            "inbox" => MailboxRole::Inbox,
            "archive" => MailboxRole::Archive,
            "drafts" => MailboxRole::Drafts,
            "sent" => MailboxRole::Sent,
            "trash" => MailboxRole::Trash,
            "junk" | "spam" => MailboxRole::Junk,
            _ => MailboxRole::Other(role.to_string()),
        }
    }
}

impl fmt::Display for MailboxRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local classification of a folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderKind {
    Inbox,
    Archive,
    Drafts,
    Sent,
    Trash,
    Spam,
    /// Any folder without a special purpose
    #[default]
    Regular,
}

impl FolderKind {
    /// Derives the folder kind from an optional server role
    ///
    /// Total over every input: absent and unrecognized roles map to
    /// [`FolderKind::Regular`].
    pub fn from_role(role: Option<&MailboxRole>) -> Self {
        match role {
            Some(MailboxRole::Inbox) => FolderKind::Inbox,
            Some(MailboxRole::Archive) => FolderKind::Archive,
            Some(MailboxRole::Drafts) => FolderKind::Drafts,
            Some(MailboxRole::Sent) => FolderKind::Sent,
            Some(MailboxRole::Trash) => FolderKind::Trash,
            Some(MailboxRole::Junk) => FolderKind::Spam,
            Some(MailboxRole::Other(_)) | None => FolderKind::Regular,
        }
    }

    /// Returns the storage representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderKind::Inbox => "inbox",
            FolderKind::Archive => "archive",
            FolderKind::Drafts => "drafts",
            FolderKind::Sent => "sent",
            FolderKind::Trash => "trash",
            FolderKind::Spam => "spam",
            FolderKind::Regular => "regular",
        }
    }
}

impl fmt::Display for FolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FolderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(FolderKind::Inbox),
            "archive" => Ok(FolderKind::Archive),
            "drafts" => Ok(FolderKind::Drafts),
            "sent" => Ok(FolderKind::Sent),
            "trash" => Ok(FolderKind::Trash),
            "spam" => Ok(FolderKind::Spam),
            "regular" => Ok(FolderKind::Regular),
            other => Err(DomainError::ValidationFailed(format!(
                "Unknown folder kind: {other}"
            ))),
        }
    }
}

/// Mailbox as reported by the server in a single response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    pub id: MailboxId,
    pub name: String,
    pub role: Option<MailboxRole>,
}

impl RemoteFolder {
    pub fn new(id: MailboxId, name: impl Into<String>, role: Option<MailboxRole>) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    /// Local kind derived from the server role
    pub fn kind(&self) -> FolderKind {
        FolderKind::from_role(self.role.as_ref())
    }

    /// Builds the local record this snapshot should materialize as
    pub fn to_local(&self) -> LocalFolder {
        LocalFolder {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind(),
        }
    }
}

/// Folder record owned by the local folder store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFolder {
    pub id: MailboxId,
    pub name: String,
    pub kind: FolderKind,
}

impl LocalFolder {
    /// Returns true if this record already reflects the given snapshot
    pub fn matches(&self, remote: &RemoteFolder) -> bool {
        self.id == remote.id && self.name == remote.name && self.kind == remote.kind()
    }
}

//! Mailbox protocol port (driven/secondary port)
//!
//! This module defines the interface for reading the folder (mailbox) list
//! from the remote mail server. The primary implementation targets JMAP
//! (RFC 8620/8621), but nothing here depends on the wire format.
//!
//! ## Design Notes
//!
//! - Unlike the storage port, this port returns a typed [`ProtocolError`]:
//!   the refresh use case must tell "cannot calculate changes" apart from
//!   every other failure, and the driver classifies the rest.
//! - [`IMailboxProtocol::get_mailbox_changes`] is ONE round trip. The
//!   implementation must hydrate created and changed ids from the same
//!   server snapshot that produced the change list.

use thiserror::Error;

use crate::domain::{MailboxId, RemoteFolder, SyncStateToken};

// ============================================================================
// Method error types
// ============================================================================

/// Machine-readable type of a method-level error
///
/// Servers may add error types at any time, so this is a small set of the
/// values the engine knows about plus [`MethodErrorType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodErrorType {
    /// The server cannot compute changes from the given state
    CannotCalculateChanges,
    /// Temporary unavailability; the same call may succeed later
    ServerUnavailable,
    ServerFail,
    UnknownMethod,
    InvalidArguments,
    InvalidResultReference,
    Forbidden,
    AccountNotFound,
    RequestTooLarge,
    Other(String),
}

impl MethodErrorType {
    /// Returns the wire representation of the error type
    pub fn as_str(&self) -> &str {
        match self {
            MethodErrorType::CannotCalculateChanges => "cannotCalculateChanges",
            MethodErrorType::ServerUnavailable => "serverUnavailable",
            MethodErrorType::ServerFail => "serverFail",
            MethodErrorType::UnknownMethod => "unknownMethod",
            MethodErrorType::InvalidArguments => "invalidArguments",
            MethodErrorType::InvalidResultReference => "invalidResultReference",
            MethodErrorType::Forbidden => "forbidden",
            MethodErrorType::AccountNotFound => "accountNotFound",
            MethodErrorType::RequestTooLarge => "requestTooLarge",
            MethodErrorType::Other(value) => value,
        }
    }

    /// Returns false only for errors that are expected to go away on retry
    pub fn is_permanent(&self) -> bool {
        !matches!(self, MethodErrorType::ServerUnavailable)
    }
}

impl From<&str> for MethodErrorType {
    fn from(value: &str) -> Self {
        match value {
            "cannotCalculateChanges" => MethodErrorType::CannotCalculateChanges,
            "serverUnavailable" => MethodErrorType::ServerUnavailable,
            "serverFail" => MethodErrorType::ServerFail,
            "unknownMethod" => MethodErrorType::UnknownMethod,
            "invalidArguments" => MethodErrorType::InvalidArguments,
            "invalidResultReference" => MethodErrorType::InvalidResultReference,
            "forbidden" => MethodErrorType::Forbidden,
            "accountNotFound" => MethodErrorType::AccountNotFound,
            "requestTooLarge" => MethodErrorType::RequestTooLarge,
            other => MethodErrorType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for MethodErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ProtocolError
// ============================================================================

/// Failures reported by a protocol client
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Credentials were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session or API resource is no longer valid
    #[error("Invalid session resource: {0}")]
    InvalidSession(String),

    /// The server rejected the request as a whole
    #[error("Error response: {0}")]
    ErrorResponse(String),

    /// An individual method call inside the request failed
    #[error("Method error {error_type}: {}", .description.as_deref().unwrap_or("no description"))]
    MethodError {
        error_type: MethodErrorType,
        description: Option<String>,
    },

    /// Anything else (transport, malformed payload, ...)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProtocolError {
    /// Builds a method error from its wire type
    pub fn method(error_type: impl Into<String>, description: Option<String>) -> Self {
        let error_type: String = error_type.into();
        ProtocolError::MethodError {
            error_type: MethodErrorType::from(error_type.as_str()),
            description,
        }
    }

    /// Returns true if the server cannot compute a delta from the given state
    pub fn is_cannot_calculate_changes(&self) -> bool {
        matches!(
            self,
            ProtocolError::MethodError {
                error_type: MethodErrorType::CannotCalculateChanges,
                ..
            }
        )
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// The complete remote folder list together with the state it reflects
#[derive(Debug, Clone)]
pub struct MailboxSnapshot {
    pub folders: Vec<RemoteFolder>,
    pub state: SyncStateToken,
}

/// Identifiers that changed since a given state
#[derive(Debug, Clone)]
pub struct DeltaBatch {
    pub created: Vec<MailboxId>,
    pub changed: Vec<MailboxId>,
    pub destroyed: Vec<MailboxId>,
    /// State to resume from on the next request
    pub new_state: SyncStateToken,
    /// The server holds further changes past `new_state`
    pub has_more: bool,
}

/// One consistent delta round trip: the change list and the hydrated details
#[derive(Debug, Clone)]
pub struct MailboxChanges {
    pub delta: DeltaBatch,
    /// Details of `delta.created`
    pub created: Vec<RemoteFolder>,
    /// Details of `delta.changed`
    pub changed: Vec<RemoteFolder>,
    /// Ids from `created`/`changed` the server no longer knows about
    pub not_found: Vec<MailboxId>,
}

// ============================================================================
// IMailboxProtocol trait
// ============================================================================

/// Port trait for reading the remote folder list
///
/// ## Implementation Notes
///
/// - Transport retries and timeouts belong to the implementation.
/// - Authentication is assumed to be in place; rejected credentials are
///   reported as [`ProtocolError::Unauthorized`].
#[async_trait::async_trait]
pub trait IMailboxProtocol: Send + Sync {
    /// Fetches every mailbox of the account in a single round trip
    async fn get_all_mailboxes(&self) -> Result<MailboxSnapshot, ProtocolError>;

    /// Fetches the changes since `since` and the details of created and
    /// changed mailboxes in a single batched request
    async fn get_mailbox_changes(
        &self,
        since: &SyncStateToken,
    ) -> Result<MailboxChanges, ProtocolError>;
}

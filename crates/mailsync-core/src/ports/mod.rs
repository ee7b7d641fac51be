//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the core depends on, but whose implementations
//! live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IMailboxProtocol`] - Remote folder list (JMAP `Mailbox/get`, `Mailbox/changes`)
//! - [`IFolderStore`] - Local folder records and per-account extra state

pub mod folder_store;
pub mod mailbox_protocol;

pub use folder_store::IFolderStore;
pub use mailbox_protocol::{
    DeltaBatch, IMailboxProtocol, MailboxChanges, MailboxSnapshot, MethodErrorType, ProtocolError,
};

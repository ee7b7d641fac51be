//! mailsync Core - Folder synchronization logic
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `RemoteFolder`, `LocalFolder`, `FolderKind`, `SyncState`
//! - **Use cases** - `RefreshFoldersUseCase` (full fetch, delta loop, error translation)
//! - **Port definitions** - Traits for adapters: `IMailboxProtocol`, `IFolderStore`
//!
//! # Architecture
//!
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement
//! (`mailsync-jmap` for the protocol, `mailsync-cache` for storage).
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;

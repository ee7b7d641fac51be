//! JMAP Mailbox types (RFC 8621 section 2)
//!
//! Only the properties the folder list needs are requested: `id`, `name`
//! and `role`.

use mailsync_core::{
    domain::{MailboxId, MailboxRole, RemoteFolder, SyncStateToken},
    ports::{DeltaBatch, MailboxChanges, MailboxSnapshot},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::JmapError;

pub const MAILBOX_GET: &str = "Mailbox/get";
pub const MAILBOX_CHANGES: &str = "Mailbox/changes";

/// Properties requested with every `Mailbox/get`
pub const MAILBOX_PROPERTIES: [&str; 3] = ["id", "name", "role"];

// ============================================================================
// JMAP response types (JSON deserialization)
// ============================================================================

/// A Mailbox object restricted to the requested properties
#[derive(Debug, Clone, Deserialize)]
pub struct JmapMailbox {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub role: Option<String>,
}

/// Arguments of a `Mailbox/get` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxGetResponse {
    pub account_id: Option<String>,
    pub state: String,
    #[serde(default)]
    pub list: Vec<JmapMailbox>,
    #[serde(default)]
    pub not_found: Vec<String>,
}

/// Arguments of a `Mailbox/changes` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxChangesResponse {
    pub account_id: Option<String>,
    pub old_state: String,
    pub new_state: String,
    #[serde(default)]
    pub has_more_changes: bool,
    #[serde(default)]
    pub created: Vec<String>,
    #[serde(default)]
    pub updated: Vec<String>,
    #[serde(default)]
    pub destroyed: Vec<String>,
}

// ============================================================================
// Request arguments
// ============================================================================

/// Arguments for fetching every mailbox of the account
pub fn get_all_arguments(account_id: &str) -> Value {
    json!({
        "accountId": account_id,
        "ids": null,
        "properties": MAILBOX_PROPERTIES,
    })
}

/// Arguments for `Mailbox/changes` since `since_state`
pub fn changes_arguments(account_id: &str, since_state: &str, max_changes: Option<u32>) -> Value {
    let mut arguments = json!({
        "accountId": account_id,
        "sinceState": since_state,
    });
    if let Some(max_changes) = max_changes {
        arguments["maxChanges"] = json!(max_changes);
    }
    arguments
}

/// Arguments for a `Mailbox/get` whose ids come from an earlier call
pub fn get_referenced_arguments(account_id: &str, ids: Value) -> Value {
    json!({
        "accountId": account_id,
        "#ids": ids,
        "properties": MAILBOX_PROPERTIES,
    })
}

// ============================================================================
// MailboxParser - converts wire types to domain types
// ============================================================================

/// Converts JMAP mailbox responses into domain values
pub struct MailboxParser;

impl MailboxParser {
    /// Converts a single mailbox, validating its id
    pub fn parse_mailbox(mailbox: JmapMailbox) -> Result<RemoteFolder, JmapError> {
        let id = Self::parse_id(mailbox.id)?;
        let role = mailbox.role.as_deref().map(MailboxRole::from);
        Ok(RemoteFolder::new(id, mailbox.name, role))
    }

    /// Converts a full `Mailbox/get` response
    pub fn parse_snapshot(response: MailboxGetResponse) -> Result<MailboxSnapshot, JmapError> {
        let state = Self::parse_state(response.state)?;
        let folders = response
            .list
            .into_iter()
            .map(Self::parse_mailbox)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MailboxSnapshot { folders, state })
    }

    /// Combines a `Mailbox/changes` response with the two hydration responses
    pub fn parse_changes(
        changes: MailboxChangesResponse,
        created: MailboxGetResponse,
        updated: MailboxGetResponse,
    ) -> Result<MailboxChanges, JmapError> {
        let delta = DeltaBatch {
            created: Self::parse_ids(changes.created)?,
            changed: Self::parse_ids(changes.updated)?,
            destroyed: Self::parse_ids(changes.destroyed)?,
            new_state: Self::parse_state(changes.new_state)?,
            has_more: changes.has_more_changes,
        };

        let mut not_found = Self::parse_ids(created.not_found)?;
        not_found.extend(Self::parse_ids(updated.not_found)?);

        Ok(MailboxChanges {
            delta,
            created: created
                .list
                .into_iter()
                .map(Self::parse_mailbox)
                .collect::<Result<Vec<_>, _>>()?,
            changed: updated
                .list
                .into_iter()
                .map(Self::parse_mailbox)
                .collect::<Result<Vec<_>, _>>()?,
            not_found,
        })
    }

    fn parse_id(id: String) -> Result<MailboxId, JmapError> {
        MailboxId::new(id).map_err(|e| JmapError::InvalidResponse(e.to_string()))
    }

    fn parse_ids(ids: Vec<String>) -> Result<Vec<MailboxId>, JmapError> {
        ids.into_iter().map(Self::parse_id).collect()
    }

    fn parse_state(state: String) -> Result<SyncStateToken, JmapError> {
        SyncStateToken::new(state).map_err(|e| JmapError::InvalidResponse(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

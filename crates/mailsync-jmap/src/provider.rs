//! JmapMailboxProvider - IMailboxProtocol implementation for JMAP
//!
//! Wraps a [`JmapClient`] bound to one account and builds the requests the
//! folder refresh needs:
//!
//! - full fetch: a single `Mailbox/get` with `ids: null`
//! - delta fetch: `Mailbox/changes` followed by two `Mailbox/get` calls that
//!   reference its `/created` and `/updated` results, all in one request, so
//!   the hydrated details come from the same server state as the change list

use async_trait::async_trait;
use mailsync_core::{
    domain::SyncStateToken,
    ports::{IMailboxProtocol, MailboxChanges, MailboxSnapshot, ProtocolError},
};
use tracing::{debug, warn};

use crate::{
    client::JmapClient,
    mailbox::{
        changes_arguments, get_all_arguments, get_referenced_arguments, MailboxChangesResponse,
        MailboxGetResponse, MailboxParser, MAILBOX_CHANGES, MAILBOX_GET,
    },
    request::{RequestBuilder, ResultReference},
    JmapError,
};

/// JMAP adapter for the mailbox protocol port
pub struct JmapMailboxProvider {
    client: JmapClient,
    account_id: String,
    max_changes: Option<u32>,
}

impl JmapMailboxProvider {
    /// Creates a provider for `account_id` using the given client
    pub fn new(client: JmapClient, account_id: impl Into<String>) -> Self {
        Self {
            client,
            account_id: account_id.into(),
            max_changes: None,
        }
    }

    /// Sends `maxChanges` with every `Mailbox/changes` call
    pub fn with_max_changes(mut self, max_changes: Option<u32>) -> Self {
        self.max_changes = max_changes;
        self
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn fetch_all(&self) -> Result<MailboxSnapshot, JmapError> {
        let mut builder = RequestBuilder::new();
        let get = builder.call(MAILBOX_GET, get_all_arguments(&self.account_id));

        let response = self.client.send(&builder.build()).await?;
        let mailboxes: MailboxGetResponse = response.method_response(&get, MAILBOX_GET)?;

        debug!(
            mailboxes = mailboxes.list.len(),
            state = %mailboxes.state,
            "Received mailbox list"
        );

        MailboxParser::parse_snapshot(mailboxes)
    }

    async fn fetch_changes(&self, since: &SyncStateToken) -> Result<MailboxChanges, JmapError> {
        let mut builder = RequestBuilder::new();
        let changes_call = builder.call(
            MAILBOX_CHANGES,
            changes_arguments(&self.account_id, since.as_str(), self.max_changes),
        );
        let created_call = builder.call(
            MAILBOX_GET,
            get_referenced_arguments(
                &self.account_id,
                reference(&changes_call, "/created"),
            ),
        );
        let updated_call = builder.call(
            MAILBOX_GET,
            get_referenced_arguments(
                &self.account_id,
                reference(&changes_call, "/updated"),
            ),
        );

        let response = self.client.send(&builder.build()).await?;

        // A failed changes call also fails both references; report the
        // changes error itself.
        let changes: MailboxChangesResponse =
            response.method_response(&changes_call, MAILBOX_CHANGES)?;
        let created: MailboxGetResponse = response.method_response(&created_call, MAILBOX_GET)?;
        let updated: MailboxGetResponse = response.method_response(&updated_call, MAILBOX_GET)?;

        if created.state != changes.new_state || updated.state != changes.new_state {
            warn!(
                new_state = %changes.new_state,
                created_state = %created.state,
                updated_state = %updated.state,
                "Hydrated mailboxes reflect a different state than the change list"
            );
        }

        debug!(
            old_state = %changes.old_state,
            new_state = %changes.new_state,
            created = changes.created.len(),
            updated = changes.updated.len(),
            destroyed = changes.destroyed.len(),
            has_more = changes.has_more_changes,
            "Received mailbox changes"
        );

        MailboxParser::parse_changes(changes, created, updated)
    }
}

fn reference(call_id: &str, path: &str) -> serde_json::Value {
    serde_json::json!(ResultReference::new(call_id, MAILBOX_CHANGES, path))
}

#[async_trait]
impl IMailboxProtocol for JmapMailboxProvider {
    async fn get_all_mailboxes(&self) -> Result<MailboxSnapshot, ProtocolError> {
        self.fetch_all().await.map_err(ProtocolError::from)
    }

    async fn get_mailbox_changes(
        &self,
        since: &SyncStateToken,
    ) -> Result<MailboxChanges, ProtocolError> {
        self.fetch_changes(since).await.map_err(ProtocolError::from)
    }
}

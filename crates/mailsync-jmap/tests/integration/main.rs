//! Integration tests for mailsync-jmap
//!
//! Uses wiremock to simulate a JMAP API endpoint and verifies the requests
//! sent by the mailbox provider and the mapping of its responses.

mod common;

mod test_mailbox_changes;
mod test_mailbox_get;

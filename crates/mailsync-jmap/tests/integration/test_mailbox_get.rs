//! Integration tests for the full mailbox fetch
//!
//! Verifies the `Mailbox/get` request sent by the provider and how HTTP and
//! method-level failures surface as protocol errors.

use mailsync_core::domain::FolderKind;
use mailsync_core::ports::{IMailboxProtocol, ProtocolError};
use serde_json::json;

use crate::common;

#[tokio::test]
async fn test_get_all_mailboxes_returns_snapshot() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([[
            "Mailbox/get",
            {
                "accountId": common::ACCOUNT_ID,
                "state": "S1",
                "list": [
                    { "id": "A", "name": "Inbox", "role": "inbox" },
                    { "id": "B", "name": "Work", "role": null },
                    { "id": "C", "name": "Sent Items", "role": "sent" }
                ],
                "notFound": []
            },
            "0"
        ]]),
    )
    .await;

    let snapshot = provider
        .get_all_mailboxes()
        .await
        .expect("Mailbox/get failed");

    assert_eq!(snapshot.state.as_str(), "S1");
    assert_eq!(snapshot.folders.len(), 3);
    assert_eq!(snapshot.folders[0].kind(), FolderKind::Inbox);
    assert_eq!(snapshot.folders[1].name, "Work");
    assert_eq!(snapshot.folders[1].kind(), FolderKind::Regular);
    assert_eq!(snapshot.folders[2].kind(), FolderKind::Sent);
}

#[tokio::test]
async fn test_get_all_mailboxes_sends_single_call() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([["Mailbox/get", { "state": "S1", "list": [] }, "0"]]),
    )
    .await;

    provider.get_all_mailboxes().await.unwrap();

    let bodies = common::received_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "using": ["urn:ietf:params:jmap:core", "urn:ietf:params:jmap:mail"],
            "methodCalls": [[
                "Mailbox/get",
                {
                    "accountId": common::ACCOUNT_ID,
                    "ids": null,
                    "properties": ["id", "name", "role"]
                },
                "0"
            ]]
        })
    );
}

#[tokio::test]
async fn test_empty_account_has_no_folders() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([["Mailbox/get", { "state": "S0", "list": [] }, "0"]]),
    )
    .await;

    let snapshot = provider.get_all_mailboxes().await.unwrap();
    assert!(snapshot.folders.is_empty());
    assert_eq!(snapshot.state.as_str(), "S0");
}

#[tokio::test]
async fn test_401_is_unauthorized() {
    let (server, provider) = common::setup_jmap_mock().await;
    common::mount_status(&server, 401, "").await;

    let err = provider.get_all_mailboxes().await.unwrap_err();
    assert!(matches!(err, ProtocolError::Unauthorized(_)));
}

#[tokio::test]
async fn test_404_is_invalid_session() {
    let (server, provider) = common::setup_jmap_mock().await;
    common::mount_status(&server, 404, "Not Found").await;

    let err = provider.get_all_mailboxes().await.unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidSession(_)));
}

#[tokio::test]
async fn test_problem_details_are_error_response() {
    let (server, provider) = common::setup_jmap_mock().await;
    common::mount_status(
        &server,
        400,
        r#"{"type":"urn:ietf:params:jmap:error:notRequest","status":400,"detail":"Request did not match the expected type"}"#,
    )
    .await;

    let err = provider.get_all_mailboxes().await.unwrap_err();
    match err {
        ProtocolError::ErrorResponse(message) => assert!(message.contains("notRequest")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_server_error_is_unclassified() {
    let (server, provider) = common::setup_jmap_mock().await;
    common::mount_status(&server, 503, "Service Unavailable").await;

    let err = provider.get_all_mailboxes().await.unwrap_err();
    assert!(matches!(err, ProtocolError::Other(_)));
}

#[tokio::test]
async fn test_method_error_is_reported() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([["error", { "type": "accountNotFound" }, "0"]]),
    )
    .await;

    let err = provider.get_all_mailboxes().await.unwrap_err();
    assert_eq!(err.to_string(), "Method error accountNotFound: no description");
}

#[tokio::test]
async fn test_malformed_body_is_unclassified() {
    let (server, provider) = common::setup_jmap_mock().await;
    common::mount_status(&server, 200, "this is not json").await;

    let err = provider.get_all_mailboxes().await.unwrap_err();
    assert!(matches!(err, ProtocolError::Other(_)));
}

#[tokio::test]
async fn test_ids_outside_base64_alphabet_are_kept() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([["Mailbox/get", {
            "state": "S1",
            "list": [
                { "id": "A", "name": "Inbox", "role": "inbox" },
                { "id": "mb:42", "name": "Projects", "role": null }
            ]
        }, "0"]]),
    )
    .await;

    let snapshot = provider.get_all_mailboxes().await.unwrap();
    let ids: Vec<&str> = snapshot.folders.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "mb:42"]);
}

//! Integration tests for mailbox change queries
//!
//! Verifies the batched `Mailbox/changes` request with its two back-referenced
//! `Mailbox/get` calls, and the handling of method errors inside the batch.

use mailsync_core::domain::{FolderKind, SyncStateToken};
use mailsync_core::ports::{IMailboxProtocol, MethodErrorType, ProtocolError};
use serde_json::json;

use crate::common;

fn token(value: &str) -> SyncStateToken {
    SyncStateToken::new(value.to_string()).unwrap()
}

#[tokio::test]
async fn test_changes_request_uses_result_references() {
    let (server, provider) = common::setup_jmap_mock().await;
    let provider = provider.with_max_changes(Some(100));

    common::mount_method_responses(
        &server,
        json!([
            ["Mailbox/changes", {
                "oldState": "T0", "newState": "T1", "hasMoreChanges": false,
                "created": [], "updated": [], "destroyed": []
            }, "0"],
            ["Mailbox/get", { "state": "T1", "list": [] }, "1"],
            ["Mailbox/get", { "state": "T1", "list": [] }, "2"]
        ]),
    )
    .await;

    provider.get_mailbox_changes(&token("T0")).await.unwrap();

    let bodies = common::received_bodies(&server).await;
    assert_eq!(bodies.len(), 1, "delta must be a single round trip");
    assert_eq!(
        bodies[0]["methodCalls"],
        json!([
            ["Mailbox/changes", {
                "accountId": common::ACCOUNT_ID,
                "sinceState": "T0",
                "maxChanges": 100
            }, "0"],
            ["Mailbox/get", {
                "accountId": common::ACCOUNT_ID,
                "#ids": { "resultOf": "0", "name": "Mailbox/changes", "path": "/created" },
                "properties": ["id", "name", "role"]
            }, "1"],
            ["Mailbox/get", {
                "accountId": common::ACCOUNT_ID,
                "#ids": { "resultOf": "0", "name": "Mailbox/changes", "path": "/updated" },
                "properties": ["id", "name", "role"]
            }, "2"]
        ])
    );
}

#[tokio::test]
async fn test_changes_are_hydrated() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([
            ["Mailbox/changes", {
                "accountId": common::ACCOUNT_ID,
                "oldState": "T0", "newState": "T1", "hasMoreChanges": false,
                "created": ["C"], "updated": ["A"], "destroyed": ["B"]
            }, "0"],
            ["Mailbox/get", {
                "state": "T1",
                "list": [{ "id": "C", "name": "Projects", "role": null }],
                "notFound": []
            }, "1"],
            ["Mailbox/get", {
                "state": "T1",
                "list": [{ "id": "A", "name": "Archive", "role": "archive" }],
                "notFound": []
            }, "2"]
        ]),
    )
    .await;

    let changes = provider.get_mailbox_changes(&token("T0")).await.unwrap();

    assert_eq!(changes.delta.new_state.as_str(), "T1");
    assert!(!changes.delta.has_more);
    assert_eq!(changes.delta.destroyed.len(), 1);
    assert_eq!(changes.delta.destroyed[0].as_str(), "B");
    assert_eq!(changes.created.len(), 1);
    assert_eq!(changes.created[0].name, "Projects");
    assert_eq!(changes.created[0].kind(), FolderKind::Regular);
    assert_eq!(changes.changed[0].kind(), FolderKind::Archive);
    assert!(changes.not_found.is_empty());
}

#[tokio::test]
async fn test_has_more_changes_is_reported() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([
            ["Mailbox/changes", {
                "oldState": "T0", "newState": "T1", "hasMoreChanges": true,
                "created": ["A"], "updated": [], "destroyed": []
            }, "0"],
            ["Mailbox/get", { "state": "T1", "list": [{ "id": "A", "name": "One" }] }, "1"],
            ["Mailbox/get", { "state": "T1", "list": [] }, "2"]
        ]),
    )
    .await;
    common::mount_method_responses(
        &server,
        json!([
            ["Mailbox/changes", {
                "oldState": "T1", "newState": "T2", "hasMoreChanges": false,
                "created": [], "updated": [], "destroyed": ["A"]
            }, "0"],
            ["Mailbox/get", { "state": "T2", "list": [] }, "1"],
            ["Mailbox/get", { "state": "T2", "list": [] }, "2"]
        ]),
    )
    .await;

    let first = provider.get_mailbox_changes(&token("T0")).await.unwrap();
    assert!(first.delta.has_more);
    assert_eq!(first.delta.new_state.as_str(), "T1");

    let second = provider
        .get_mailbox_changes(&first.delta.new_state)
        .await
        .unwrap();
    assert!(!second.delta.has_more);
    assert_eq!(second.delta.destroyed[0].as_str(), "A");

    let bodies = common::received_bodies(&server).await;
    assert_eq!(bodies[1]["methodCalls"][0][1]["sinceState"], "T1");
}

#[tokio::test]
async fn test_not_found_ids_are_collected() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([
            ["Mailbox/changes", {
                "oldState": "T0", "newState": "T1", "hasMoreChanges": false,
                "created": ["X"], "updated": ["Y"], "destroyed": []
            }, "0"],
            ["Mailbox/get", { "state": "T1", "list": [], "notFound": ["X"] }, "1"],
            ["Mailbox/get", { "state": "T1", "list": [], "notFound": ["Y"] }, "2"]
        ]),
    )
    .await;

    let changes = provider.get_mailbox_changes(&token("T0")).await.unwrap();

    let not_found: Vec<&str> = changes.not_found.iter().map(|id| id.as_str()).collect();
    assert_eq!(not_found, vec!["X", "Y"]);
}

#[tokio::test]
async fn test_cannot_calculate_changes_is_detected() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([
            ["error", { "type": "cannotCalculateChanges" }, "0"],
            ["error", { "type": "invalidResultReference" }, "1"],
            ["error", { "type": "invalidResultReference" }, "2"]
        ]),
    )
    .await;

    let err = provider
        .get_mailbox_changes(&token("expired"))
        .await
        .unwrap_err();
    assert!(err.is_cannot_calculate_changes());
}

#[tokio::test]
async fn test_server_unavailable_keeps_type() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([
            ["error", { "type": "serverUnavailable", "description": "try later" }, "0"],
            ["error", { "type": "invalidResultReference" }, "1"],
            ["error", { "type": "invalidResultReference" }, "2"]
        ]),
    )
    .await;

    let err = provider
        .get_mailbox_changes(&token("T0"))
        .await
        .unwrap_err();
    match err {
        ProtocolError::MethodError {
            error_type,
            description,
        } => {
            assert_eq!(error_type, MethodErrorType::ServerUnavailable);
            assert_eq!(description.as_deref(), Some("try later"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_hydration_response_is_unclassified() {
    let (server, provider) = common::setup_jmap_mock().await;

    common::mount_method_responses(
        &server,
        json!([
            ["Mailbox/changes", {
                "oldState": "T0", "newState": "T1", "hasMoreChanges": false,
                "created": [], "updated": [], "destroyed": []
            }, "0"]
        ]),
    )
    .await;

    let err = provider
        .get_mailbox_changes(&token("T0"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Other(_)));
}

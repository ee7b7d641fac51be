//! Shared test helpers for JMAP integration tests
//!
//! Each helper mounts a response on the JMAP API path of a wiremock server.
//! The provider returned by [`setup_jmap_mock`] posts to that path with a
//! fixed bearer token.

use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mailsync_jmap::client::JmapClient;
use mailsync_jmap::provider::JmapMailboxProvider;

pub const API_PATH: &str = "/jmap/api/";
pub const ACCOUNT_ID: &str = "u1a2b3";
pub const TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a provider pointing at it
pub async fn setup_jmap_mock() -> (MockServer, JmapMailboxProvider) {
    let server = MockServer::start().await;
    let client = JmapClient::new(format!("{}{}", server.uri(), API_PATH), TOKEN);
    let provider = JmapMailboxProvider::new(client, ACCOUNT_ID);
    (server, provider)
}

/// Mounts a 200 response carrying the given method responses
pub async fn mount_method_responses(server: &MockServer, method_responses: Value) {
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "methodResponses": method_responses,
            "sessionState": "session-1"
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Mounts a non-2xx response with a raw body
pub async fn mount_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Returns the JSON bodies of every request the server received
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).expect("request body is JSON"))
        .collect()
}

//! JMAP API client
//!
//! Posts batched requests to the account's JMAP API URL with bearer
//! authentication and maps HTTP failures to [`JmapError`].
//!
//! Session discovery is out of scope: the API URL and account id come from
//! configuration.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mailsync_jmap::client::JmapClient;
//! use mailsync_jmap::request::RequestBuilder;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), mailsync_jmap::JmapError> {
//! let client = JmapClient::new("https://jmap.example.com/api/", "access-token");
//! let mut builder = RequestBuilder::new();
//! builder.call("Mailbox/get", json!({ "accountId": "a1", "ids": null }));
//! let response = client.send(&builder.build()).await?;
//! println!("{} responses", response.method_responses.len());
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::{
    request::JmapRequest,
    response::{JmapResponse, ProblemDetails},
    JmapError,
};

/// HTTP client for JMAP API calls
pub struct JmapClient {
    /// The underlying HTTP client
    client: Client,
    /// URL receiving `POST`ed requests
    api_url: String,
    /// Bearer token for the account
    access_token: String,
}

impl JmapClient {
    /// Creates a new JmapClient
    ///
    /// # Arguments
    /// * `api_url` - The JMAP API URL (the session's `apiUrl`)
    /// * `access_token` - Bearer token accepted by the server
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Sends one batched request and returns the response envelope
    ///
    /// # Errors
    ///
    /// - [`JmapError::NetworkError`] if the request could not be sent
    /// - a status-derived error for non-2xx responses (see [`error_for_status`])
    /// - [`JmapError::InvalidResponse`] if the body is not a JMAP response
    pub async fn send(&self, request: &JmapRequest) -> Result<JmapResponse, JmapError> {
        debug!(
            calls = request.method_calls.len(),
            url = %self.api_url,
            "Sending JMAP request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "JMAP request rejected");
            return Err(error_for_status(status, &body));
        }

        let body = response.bytes().await?;
        let parsed: JmapResponse = serde_json::from_slice(&body).map_err(|e| {
            JmapError::InvalidResponse(format!("Failed to parse JMAP response: {e}"))
        })?;

        debug!(
            responses = parsed.method_responses.len(),
            session_state = parsed.session_state.as_deref().unwrap_or("-"),
            "Received JMAP response"
        );
        Ok(parsed)
    }
}

/// Maps a non-2xx HTTP response to a [`JmapError`]
///
/// - 401 - [`JmapError::Unauthorized`]
/// - 404, 410 - [`JmapError::InvalidSession`]
/// - problem details body - [`JmapError::RequestError`]
/// - other 5xx - [`JmapError::ServerError`]
/// - other 4xx - [`JmapError::UnexpectedStatus`]
pub fn error_for_status(status: StatusCode, body: &str) -> JmapError {
    let summary = if body.trim().is_empty() {
        status.to_string()
    } else {
        body.trim().to_string()
    };

    match status {
        StatusCode::UNAUTHORIZED => JmapError::Unauthorized(summary),
        StatusCode::NOT_FOUND | StatusCode::GONE => JmapError::InvalidSession(summary),
        _ => {
            if let Ok(problem) = serde_json::from_str::<ProblemDetails>(body) {
                // limit errors name the exceeded limit outside `detail`
                let detail = match (problem.detail, problem.limit) {
                    (Some(detail), Some(limit)) => Some(format!("{detail} (limit {limit})")),
                    (None, Some(limit)) => Some(format!("limit {limit}")),
                    (detail, None) => detail,
                };
                return JmapError::RequestError {
                    problem_type: problem.problem_type,
                    status: problem.status.unwrap_or(status.as_u16()),
                    detail,
                };
            }

            if status.is_server_error() {
                JmapError::ServerError(summary)
            } else {
                JmapError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: summary,
                }
            }
        }
    }
}

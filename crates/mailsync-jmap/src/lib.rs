//! mailsync JMAP - JMAP (RFC 8620/8621) mailbox client
//!
//! Provides an async client for:
//! - Batched JMAP requests with result references between method calls
//! - `Mailbox/get` and `Mailbox/changes`
//! - Mapping HTTP, request-level and method-level failures to [`ProtocolError`]
//!
//! ## Modules
//!
//! - [`client`] - HTTP transport for JMAP API requests
//! - [`request`] - Request builder, invocations and result references
//! - [`response`] - Response envelope, method errors and problem details
//! - [`mailbox`] - Mailbox wire types and conversion to domain folders
//! - [`provider`] - [`IMailboxProtocol`](mailsync_core::ports::IMailboxProtocol) implementation

pub mod client;
pub mod mailbox;
pub mod provider;
pub mod request;
pub mod response;

use mailsync_core::ports::ProtocolError;
use thiserror::Error;

/// Errors that can occur when talking to a JMAP server
#[derive(Debug, Error)]
pub enum JmapError {
    /// Credentials were rejected (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The API resource no longer exists (HTTP 404/410)
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// The server rejected the whole request with a problem details body
    #[error("Request error {problem_type} (HTTP {status}){}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    RequestError {
        problem_type: String,
        status: u16,
        detail: Option<String>,
    },

    /// Any other client error status without a problem details body
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A single method call returned an `error` response
    #[error("Method error {error_type}{}", .description.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    MethodError {
        error_type: String,
        description: Option<String>,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<JmapError> for ProtocolError {
    fn from(err: JmapError) -> Self {
        match err {
            JmapError::Unauthorized(message) => ProtocolError::Unauthorized(message),
            JmapError::InvalidSession(message) => ProtocolError::InvalidSession(message),
            JmapError::RequestError { .. } | JmapError::UnexpectedStatus { .. } => {
                ProtocolError::ErrorResponse(err.to_string())
            }
            JmapError::MethodError {
                error_type,
                description,
            } => ProtocolError::method(error_type, description),
            JmapError::ServerError(_)
            | JmapError::NetworkError(_)
            | JmapError::InvalidResponse(_) => ProtocolError::Other(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use mailsync_core::ports::MethodErrorType;

    use super::*;

    #[test]
    fn test_unauthorized_maps_to_unauthorized() {
        let err: ProtocolError = JmapError::Unauthorized("bad token".into()).into();
        assert!(matches!(err, ProtocolError::Unauthorized(m) if m == "bad token"));
    }

    #[test]
    fn test_request_error_maps_to_error_response() {
        let err: ProtocolError = JmapError::RequestError {
            problem_type: "urn:ietf:params:jmap:error:notRequest".into(),
            status: 400,
            detail: Some("not JSON".into()),
        }
        .into();
        match err {
            ProtocolError::ErrorResponse(message) => {
                assert!(message.contains("notRequest"));
                assert!(message.contains("not JSON"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn test_method_error_keeps_type() {
        let err: ProtocolError = JmapError::MethodError {
            error_type: "cannotCalculateChanges".into(),
            description: None,
        }
        .into();
        assert!(err.is_cannot_calculate_changes());

        let err: ProtocolError = JmapError::MethodError {
            error_type: "serverUnavailable".into(),
            description: Some("later".into()),
        }
        .into();
        assert!(matches!(
            err,
            ProtocolError::MethodError {
                error_type: MethodErrorType::ServerUnavailable,
                ..
            }
        ));
    }

    #[test]
    fn test_transport_failures_map_to_other() {
        let err: ProtocolError = JmapError::ServerError("HTTP 502".into()).into();
        assert!(matches!(err, ProtocolError::Other(_)));

        let err: ProtocolError = JmapError::InvalidResponse("missing state".into()).into();
        assert!(matches!(err, ProtocolError::Other(_)));
    }

    #[test]
    fn test_display_without_description() {
        let err = JmapError::MethodError {
            error_type: "forbidden".into(),
            description: None,
        };
        assert_eq!(err.to_string(), "Method error forbidden");
    }
}

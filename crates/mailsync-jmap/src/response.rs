//! JMAP response parsing
//!
//! A successful HTTP response carries one response invocation per method
//! call. A failed method call is answered with an invocation named `error`
//! in its place; the rest of the batch is still processed by the server.
//!
//! Request-level failures use RFC 7807 problem details instead of a
//! response envelope.

use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::{request::Invocation, JmapError};

/// Response invocation name used by the server for failed method calls
pub const ERROR_RESPONSE_NAME: &str = "error";

/// Response envelope returned for a processed request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmapResponse {
    pub method_responses: Vec<Invocation>,
    #[serde(default)]
    pub session_state: Option<String>,
}

/// Arguments of an `error` response invocation
#[derive(Debug, Clone, Deserialize)]
pub struct MethodErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub description: Option<String>,
}

/// RFC 7807 problem details returned for a rejected request
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub status: Option<u16>,
    pub detail: Option<String>,
    pub limit: Option<String>,
}

impl JmapResponse {
    /// Extracts and deserializes the response to the call `call_id`
    ///
    /// # Errors
    ///
    /// - [`JmapError::MethodError`] if the server answered with `error`
    /// - [`JmapError::InvalidResponse`] if the invocation is missing, has an
    ///   unexpected name, or its arguments do not match `T`
    pub fn method_response<T: DeserializeOwned>(
        &self,
        call_id: &str,
        expected_name: &str,
    ) -> Result<T, JmapError> {
        let invocation = self
            .method_responses
            .iter()
            .find(|invocation| invocation.call_id() == call_id)
            .ok_or_else(|| {
                JmapError::InvalidResponse(format!(
                    "No response for call {call_id} ({expected_name})"
                ))
            })?;

        if invocation.name() == ERROR_RESPONSE_NAME {
            let body: MethodErrorBody = serde_json::from_value(invocation.arguments().clone())
                .map_err(|e| {
                    JmapError::InvalidResponse(format!("Malformed error response: {e}"))
                })?;
            debug!(call_id, error_type = %body.error_type, "Method call failed");
            return Err(JmapError::MethodError {
                error_type: body.error_type,
                description: body.description,
            });
        }

        if invocation.name() != expected_name {
            return Err(JmapError::InvalidResponse(format!(
                "Expected {expected_name} for call {call_id}, got {}",
                invocation.name()
            )));
        }

        serde_json::from_value(invocation.arguments().clone()).map_err(|e| {
            JmapError::InvalidResponse(format!("Failed to parse {expected_name} response: {e}"))
        })
    }
}

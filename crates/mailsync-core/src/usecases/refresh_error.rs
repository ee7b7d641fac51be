//! Error taxonomy surfaced by the folder refresh
//!
//! Every failure that escapes a refresh is translated exactly once, by
//! [`RefreshError::classify`], at the top of the use case. Inner steps
//! propagate `anyhow::Error` untouched.

use thiserror::Error;

use crate::ports::ProtocolError;

/// Classified failure of a folder refresh
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Credentials were rejected; never retried internally
    #[error("Authentication failed: {source}")]
    AuthenticationFailed {
        #[source]
        source: ProtocolError,
    },

    /// The server failed the request; `permanent` tells callers whether a
    /// later retry can succeed
    #[error("Messaging error: {source}")]
    Messaging {
        permanent: bool,
        #[source]
        source: ProtocolError,
    },

    /// The server kept reporting pending changes past the round limit, or
    /// without advancing its state
    #[error("Protocol anomaly: server still reported more changes after {rounds} round(s)")]
    ProtocolAnomaly { rounds: u32 },

    /// Any other failure (storage, transport, malformed data)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RefreshError {
    /// Translates an error raised anywhere inside a refresh
    pub fn classify(err: anyhow::Error) -> Self {
        let err = match err.downcast::<RefreshError>() {
            Ok(already_classified) => return already_classified,
            Err(err) => err,
        };

        match err.downcast::<ProtocolError>() {
            Ok(protocol_err) => Self::from(protocol_err),
            Err(other) => RefreshError::Other(other),
        }
    }

    /// Returns true if running the refresh again later may succeed
    ///
    /// Reflects only the `permanent` flag of [`RefreshError::Messaging`].
    /// Invalid-session and error-response failures are messaging failures
    /// with `permanent = true`, so they report false here.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RefreshError::Messaging {
                permanent: false,
                ..
            }
        )
    }

    /// Returns true if the failure requires new credentials
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, RefreshError::AuthenticationFailed { .. })
    }
}

impl From<ProtocolError> for RefreshError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Unauthorized(_) => RefreshError::AuthenticationFailed { source: err },
            ProtocolError::InvalidSession(_) | ProtocolError::ErrorResponse(_) => {
                RefreshError::Messaging {
                    permanent: true,
                    source: err,
                }
            }
            ProtocolError::MethodError { ref error_type, .. } => RefreshError::Messaging {
                permanent: error_type.is_permanent(),
                source: err,
            },
            ProtocolError::Other(inner) => RefreshError::Other(inner),
        }
    }
}

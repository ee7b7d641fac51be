//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! mostly validation failures when constructing newtypes.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid mailbox identifier
    #[error("Invalid mailbox ID: {0}")]
    InvalidMailboxId(String),

    /// Invalid sync state token
    #[error("Invalid sync state token: {0}")]
    InvalidSyncState(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidMailboxId("".to_string());
        assert_eq!(err.to_string(), "Invalid mailbox ID: ");

        let err = DomainError::InvalidSyncState("state cannot be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid sync state token: state cannot be empty"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::ValidationFailed("a".to_string());
        let err2 = DomainError::ValidationFailed("a".to_string());
        let err3 = DomainError::ValidationFailed("b".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}

//! Error types for the passport ledger

use thiserror::Error;

use crate::crypto::AuthError;
use crate::ledger::StoreError;

/// Result type alias using PassportError
pub type Result<T> = std::result::Result<T, PassportError>;

/// Errors surfaced by passport operations
///
/// Every error is returned to the caller as-is. Nothing in the core
/// retries or recovers locally.
#[derive(Error, Debug)]
pub enum PassportError {
    /// The operation targets a DPP that is not in world state
    #[error("the DPP {0} does not exist")]
    NotFound(String),

    /// Create on an id that is already in world state
    #[error("the DPP {0} already exists")]
    AlreadyExists(String),

    /// Signature or ownership check failed, or unsigned mode is disabled
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Undecodable or structurally invalid input (base64, JSON, arguments)
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The underlying ledger store failed
    #[error("failed to access world state: {0}")]
    Store(#[from] StoreError),

    /// A record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PassportError {
    /// Stable code used by transport layers
    pub fn code(&self) -> &'static str {
        match self {
            PassportError::NotFound(_) => "NOT_FOUND",
            PassportError::AlreadyExists(_) => "ALREADY_EXISTS",
            PassportError::Unauthorized(_) => "UNAUTHORIZED",
            PassportError::Malformed(_) => "MALFORMED",
            PassportError::Store(_) => "STORE_ERROR",
            PassportError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for PassportError {
    fn from(err: serde_json::Error) -> Self {
        PassportError::Serialization(err.to_string())
    }
}

impl From<AuthError> for PassportError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Malformed(msg) => PassportError::Malformed(msg),
            AuthError::InvalidSignature => {
                PassportError::Unauthorized(format!("signature verification failed: {}", err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_map_fail_closed() {
        let malformed: PassportError = AuthError::Malformed("bad base64".into()).into();
        assert!(matches!(malformed, PassportError::Malformed(_)));

        let invalid: PassportError = AuthError::InvalidSignature.into();
        assert!(matches!(invalid, PassportError::Unauthorized(_)));
        assert_eq!(invalid.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_messages_name_the_record() {
        let err = PassportError::NotFound("DPP-9".into());
        assert_eq!(err.to_string(), "the DPP DPP-9 does not exist");
    }
}

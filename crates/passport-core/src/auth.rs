//! Authorization gate for signed mutations
//!
//! A signed update or transfer goes through only when both checks pass:
//!
//! 1. the presented public key, compared as an opaque string, is exactly the
//!    record's current `owner_did`
//! 2. the envelope signature verifies under that key
//!
//! The owner DID and the signing key are the same string here. There is no
//! separate mapping from an identity to the keys allowed to act for it.

use thiserror::Error;
use tracing::warn;

use crate::crypto::{AuthError, SignedEnvelope};
use crate::error::PassportError;

/// Reason a signed request was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Presented key is not the current owner
    #[error("unauthorized: not current owner")]
    NotOwner,

    /// Signature material failed verification
    #[error(transparent)]
    Signature(#[from] AuthError),
}

impl From<AuthorizationError> for PassportError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::NotOwner => PassportError::Unauthorized("not current owner".into()),
            AuthorizationError::Signature(inner) => inner.into(),
        }
    }
}

/// Check that `envelope` proves control of `owner_did`
///
/// Ownership is checked before the signature is decoded.
pub fn authorize_owner(
    dpp_id: &str,
    owner_did: &str,
    envelope: &SignedEnvelope,
) -> Result<(), AuthorizationError> {
    if envelope.public_key_base64.as_bytes() != owner_did.as_bytes() {
        warn!(
            dpp_id = %dpp_id,
            owner_did = %owner_did,
            presented_key = %envelope.public_key_base64,
            "SECURITY: signed request from a key that does not own the record"
        );
        return Err(AuthorizationError::NotOwner);
    }

    verify_envelope(dpp_id, envelope)
}

/// Check the envelope signature alone
///
/// Used where no owner exists yet (signed create).
pub fn verify_envelope(dpp_id: &str, envelope: &SignedEnvelope) -> Result<(), AuthorizationError> {
    envelope.verify().map_err(|err| {
        warn!(
            dpp_id = %dpp_id,
            presented_key = %envelope.public_key_base64,
            error = %err,
            "SECURITY: signature verification failed"
        );
        AuthorizationError::Signature(err)
    })
}

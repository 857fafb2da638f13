//! Signature primitives for signed passport operations
//!
//! Signers hash the message with SHA-256 and sign the 32-byte digest with
//! Ed25519. This is not the usual Ed25519 usage (which signs the message
//! itself), but it is what deployed signers produce, so verification must
//! follow it exactly. Changing it breaks every existing signer.
//!
//! Key types:
//! - `SignedEnvelope`: message, signature and public key as sent by a client
//! - `KeyPair`: Ed25519 signing key for producing envelopes

use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Ed25519 public key size in bytes
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature size in bytes
pub const SIGNATURE_LENGTH: usize = 64;

/// Outcome of a failed verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Base64 could not be decoded or has the wrong length
    #[error("malformed signature material: {0}")]
    Malformed(String),

    /// The signature does not verify under the presented key
    #[error("invalid signature")]
    InvalidSignature,
}

impl From<ed25519_dalek::SignatureError> for AuthError {
    fn from(_: ed25519_dalek::SignatureError) -> Self {
        AuthError::InvalidSignature
    }
}

/// SHA-256 digest of a message; this is what actually gets signed
pub fn digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

/// Verify a base64 Ed25519 signature over `SHA-256(message)`
///
/// Malformed input never verifies.
pub fn verify_signature(
    message: &[u8],
    signature_b64: &str,
    public_key_b64: &str,
) -> Result<(), AuthError> {
    let public_key = STANDARD
        .decode(public_key_b64)
        .map_err(|e| AuthError::Malformed(format!("failed to decode public key: {}", e)))?;

    let signature = STANDARD
        .decode(signature_b64)
        .map_err(|e| AuthError::Malformed(format!("failed to decode signature: {}", e)))?;

    let public_key: [u8; PUBLIC_KEY_LENGTH] =
        public_key.as_slice().try_into().map_err(|_| {
            AuthError::Malformed(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                public_key.len()
            ))
        })?;

    let signature: [u8; SIGNATURE_LENGTH] = signature.as_slice().try_into().map_err(|_| {
        AuthError::Malformed(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        ))
    })?;

    // Not a curve point: nothing can verify under it
    let verifying_key = VerifyingKey::from_bytes(&public_key)?;
    let signature = Signature::from_bytes(&signature);

    verifying_key.verify(&digest(message), &signature)?;
    Ok(())
}

/// Signature material attached to a signed operation
///
/// Field names match the JSON clients already send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// Message that was hashed and signed
    pub original_message: String,

    /// Base64 Ed25519 signature over SHA-256(original_message)
    pub signed_base64: String,

    /// Base64 public key; also the signer identity
    pub public_key_base64: String,
}

impl SignedEnvelope {
    pub fn new(
        original_message: impl Into<String>,
        signed_base64: impl Into<String>,
        public_key_base64: impl Into<String>,
    ) -> Self {
        Self {
            original_message: original_message.into(),
            signed_base64: signed_base64.into(),
            public_key_base64: public_key_base64.into(),
        }
    }

    /// Identity recorded in the audit trail for this envelope
    pub fn signer(&self) -> &str {
        &self.public_key_base64
    }

    /// Check the signature; says nothing about ownership
    pub fn verify(&self) -> Result<(), AuthError> {
        verify_signature(
            self.original_message.as_bytes(),
            &self.signed_base64,
            &self.public_key_base64,
        )
    }
}

/// Ed25519 key pair for signing passport operations
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_base64())
            .field("signing_key", &"[redacted]")
            .finish()
    }
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create a key pair from an existing signing key
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Create a key pair from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Load a base64 secret key
    ///
    /// Accepts a bare 32-byte seed or the 64-byte seed-plus-public-key form
    /// that NaCl tooling exports. In the 64-byte form the embedded public
    /// key must match the one derived from the seed.
    pub fn from_secret_base64(secret_b64: &str) -> Result<Self, AuthError> {
        let bytes = STANDARD
            .decode(secret_b64)
            .map_err(|e| AuthError::Malformed(format!("failed to decode secret key: {}", e)))?;

        match bytes.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Ok(Self::from_seed(&seed))
            }
            64 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes[..32]);
                let key_pair = Self::from_seed(&seed);
                if key_pair.verifying_key.as_bytes()[..] != bytes[32..] {
                    return Err(AuthError::Malformed(
                        "embedded public key does not match secret seed".into(),
                    ));
                }
                Ok(key_pair)
            }
            n => Err(AuthError::Malformed(format!(
                "secret key must be 32 or 64 bytes, got {}",
                n
            ))),
        }
    }

    /// Base64 public key, used as the owner identity
    pub fn public_key_base64(&self) -> String {
        STANDARD.encode(self.verifying_key.to_bytes())
    }

    /// Base64 of the 32-byte secret seed
    pub fn secret_key_base64(&self) -> String {
        STANDARD.encode(self.signing_key.to_bytes())
    }

    /// Base64 of the 64-byte seed-plus-public-key form used by NaCl tooling
    pub fn keypair_base64(&self) -> String {
        STANDARD.encode(self.signing_key.to_keypair_bytes())
    }

    /// Raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }

    /// Sign SHA-256(message), returning raw signature bytes
    pub fn sign_digest(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(&digest(message)).to_bytes()
    }

    /// Produce a complete envelope for `message`
    pub fn sign(&self, message: impl Into<String>) -> SignedEnvelope {
        let message = message.into();
        let signature = self.sign_digest(message.as_bytes());
        SignedEnvelope {
            original_message: message,
            signed_base64: STANDARD.encode(signature),
            public_key_base64: self.public_key_base64(),
        }
    }
}

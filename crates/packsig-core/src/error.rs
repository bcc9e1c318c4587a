//! Error types for packsig core.

use thiserror::Error;

/// Core errors: key material, signatures and wire decoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid private key material")]
    InvalidPrivateKey,

    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("unsupported attestation version: {0}")]
    UnsupportedVersion(u8),

    #[error("malformed attestation: {0}")]
    MalformedAttestation(String),

    #[error("invalid reason token: {0}")]
    InvalidReason(String),

    #[error("base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

//! Signer records as exposed by a signer registry.
//!
//! Records are owned by the registry. This crate only reads them; the
//! private key is consulted by the attestor and nothing else.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::{Ed25519PublicKey, Keypair};
use crate::error::{CoreError, Result};
use crate::types::Kid;

/// Lifecycle status of a signer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignerStatus {
    /// Usable for signing and verification.
    Active,
    /// Never acceptable again.
    Revoked,
    /// No longer in rotation; signatures may be honored within a grace period.
    Retired,
}

impl SignerStatus {
    /// The stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            SignerStatus::Active => "ACTIVE",
            SignerStatus::Revoked => "REVOKED",
            SignerStatus::Retired => "RETIRED",
        }
    }
}

impl FromStr for SignerStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(SignerStatus::Active),
            "REVOKED" => Ok(SignerStatus::Revoked),
            "RETIRED" => Ok(SignerStatus::Retired),
            other => Err(format!("unknown signer status: {}", other)),
        }
    }
}

impl fmt::Display for SignerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named signing key and its status.
#[derive(Clone, PartialEq, Eq)]
pub struct SignerRecord {
    pub kid: Kid,

    /// Raw public key bytes as stored. Not validated until imported.
    pub public_key: Bytes,

    /// Raw private key material (seed or seed || public key).
    pub private_key: Option<Bytes>,

    pub status: SignerStatus,

    /// Creation time (Unix milliseconds).
    pub created_at: i64,

    /// Retirement time (Unix milliseconds), if retired.
    pub retired_at: Option<i64>,
}

impl SignerRecord {
    /// Build an active record holding both halves of a keypair.
    pub fn active(kid: impl Into<Kid>, keypair: &Keypair, created_at: i64) -> Self {
        Self {
            kid: kid.into(),
            public_key: Bytes::copy_from_slice(keypair.public_key().as_bytes()),
            private_key: Some(Bytes::copy_from_slice(&keypair.seed())),
            status: SignerStatus::Active,
            created_at,
            retired_at: None,
        }
    }

    /// Build an active record with only the public half.
    pub fn verify_only(kid: impl Into<Kid>, public_key: &Ed25519PublicKey, created_at: i64) -> Self {
        Self {
            kid: kid.into(),
            public_key: Bytes::copy_from_slice(public_key.as_bytes()),
            private_key: None,
            status: SignerStatus::Active,
            created_at,
            retired_at: None,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.status == SignerStatus::Revoked
    }

    /// Whether a retired signer is still inside its grace window at `now`.
    ///
    /// Requires a grace period, a recorded retirement time and
    /// `now - retired_at <= grace_ms`. Always false for non-retired signers.
    pub fn within_grace(&self, now: i64, grace_ms: Option<u64>) -> bool {
        if self.status != SignerStatus::Retired {
            return false;
        }
        match (grace_ms, self.retired_at) {
            (Some(grace), Some(retired_at)) => {
                let elapsed = now.saturating_sub(retired_at);
                elapsed <= i64::try_from(grace).unwrap_or(i64::MAX)
            }
            _ => false,
        }
    }

    /// Import the verification key.
    pub fn verifying_key(&self) -> Result<Ed25519PublicKey> {
        Ed25519PublicKey::from_slice(&self.public_key)
    }

    /// Import the signing keypair.
    pub fn signing_keypair(&self) -> Result<Keypair> {
        let secret = self.private_key.as_ref().ok_or(CoreError::InvalidPrivateKey)?;
        Keypair::from_secret_slice(secret)
    }
}

impl fmt::Debug for SignerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerRecord")
            .field("kid", &self.kid)
            .field("public_key", &hex::encode(&self.public_key))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("retired_at", &self.retired_at)
            .finish()
    }
}

//! Structured verification reasons and the verification result.
//!
//! Reasons are kept as typed values internally and rendered to their
//! `kind:subject` string form only at the wire boundary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{Kid, SignerId};

/// Discriminator for a [`Reason`], rendered as its wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonKind {
    SignerNotFound,
    RevokedKid,
    RetiredOutOfGrace,
    KeyImportFailed,
    LegacyNotAllowed,
    LegacyKeyImportFailed,
    MissingKidAndPub,
    SigVerifyFailed,
    SigVerifyError,
    BannedKid,
    RequireKidMissing,
    ThresholdNotMet,
    V1IncompatibleWithThreshold,
}

impl ReasonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonKind::SignerNotFound => "signer_not_found",
            ReasonKind::RevokedKid => "revoked_kid",
            ReasonKind::RetiredOutOfGrace => "retired_out_of_grace",
            ReasonKind::KeyImportFailed => "key_import_failed",
            ReasonKind::LegacyNotAllowed => "legacy_not_allowed",
            ReasonKind::LegacyKeyImportFailed => "legacy_key_import_failed",
            ReasonKind::MissingKidAndPub => "missing_kid_and_pub",
            ReasonKind::SigVerifyFailed => "sig_verify_failed",
            ReasonKind::SigVerifyError => "sig_verify_error",
            ReasonKind::BannedKid => "banned_kid",
            ReasonKind::RequireKidMissing => "require_kid_missing",
            ReasonKind::ThresholdNotMet => "threshold_not_met",
            ReasonKind::V1IncompatibleWithThreshold => "v1_incompatible_with_threshold",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "signer_not_found" => ReasonKind::SignerNotFound,
            "revoked_kid" => ReasonKind::RevokedKid,
            "retired_out_of_grace" => ReasonKind::RetiredOutOfGrace,
            "key_import_failed" => ReasonKind::KeyImportFailed,
            "legacy_not_allowed" => ReasonKind::LegacyNotAllowed,
            "legacy_key_import_failed" => ReasonKind::LegacyKeyImportFailed,
            "missing_kid_and_pub" => ReasonKind::MissingKidAndPub,
            "sig_verify_failed" => ReasonKind::SigVerifyFailed,
            "sig_verify_error" => ReasonKind::SigVerifyError,
            "banned_kid" => ReasonKind::BannedKid,
            "require_kid_missing" => ReasonKind::RequireKidMissing,
            "threshold_not_met" => ReasonKind::ThresholdNotMet,
            "v1_incompatible_with_threshold" => ReasonKind::V1IncompatibleWithThreshold,
            _ => return None,
        })
    }

    /// Whether this kind is produced by the policy stage rather than by a
    /// single signature. Only policy reasons make a result fail.
    pub fn is_policy(self) -> bool {
        matches!(
            self,
            ReasonKind::BannedKid
                | ReasonKind::RequireKidMissing
                | ReasonKind::ThresholdNotMet
                | ReasonKind::V1IncompatibleWithThreshold
        )
    }
}

impl fmt::Display for ReasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    SignerNotFound(Kid),
    RevokedKid(Kid),
    RetiredOutOfGrace(Kid),
    KeyImportFailed(Kid),
    /// Subject is the truncated base64 prefix of the embedded key.
    LegacyNotAllowed(String),
    LegacyKeyImportFailed(String),
    MissingKidAndPub,
    SigVerifyFailed(SignerId),
    SigVerifyError(SignerId),
    BannedKid(Kid),
    RequireKidMissing(Kid),
    ThresholdNotMet { min: u32, count: u32 },
    V1IncompatibleWithThreshold { min: u32 },
}

impl Reason {
    pub fn kind(&self) -> ReasonKind {
        match self {
            Reason::SignerNotFound(_) => ReasonKind::SignerNotFound,
            Reason::RevokedKid(_) => ReasonKind::RevokedKid,
            Reason::RetiredOutOfGrace(_) => ReasonKind::RetiredOutOfGrace,
            Reason::KeyImportFailed(_) => ReasonKind::KeyImportFailed,
            Reason::LegacyNotAllowed(_) => ReasonKind::LegacyNotAllowed,
            Reason::LegacyKeyImportFailed(_) => ReasonKind::LegacyKeyImportFailed,
            Reason::MissingKidAndPub => ReasonKind::MissingKidAndPub,
            Reason::SigVerifyFailed(_) => ReasonKind::SigVerifyFailed,
            Reason::SigVerifyError(_) => ReasonKind::SigVerifyError,
            Reason::BannedKid(_) => ReasonKind::BannedKid,
            Reason::RequireKidMissing(_) => ReasonKind::RequireKidMissing,
            Reason::ThresholdNotMet { .. } => ReasonKind::ThresholdNotMet,
            Reason::V1IncompatibleWithThreshold { .. } => ReasonKind::V1IncompatibleWithThreshold,
        }
    }

    /// The rendered subject, if the reason has one.
    pub fn subject(&self) -> Option<String> {
        match self {
            Reason::SignerNotFound(kid)
            | Reason::RevokedKid(kid)
            | Reason::RetiredOutOfGrace(kid)
            | Reason::KeyImportFailed(kid)
            | Reason::BannedKid(kid)
            | Reason::RequireKidMissing(kid) => Some(kid.to_string()),
            Reason::LegacyNotAllowed(prefix) | Reason::LegacyKeyImportFailed(prefix) => {
                Some(prefix.clone())
            }
            Reason::SigVerifyFailed(id) | Reason::SigVerifyError(id) => Some(id.to_string()),
            Reason::MissingKidAndPub => None,
            Reason::ThresholdNotMet { min, count } => Some(format!("min={},count={}", min, count)),
            Reason::V1IncompatibleWithThreshold { min } => Some(format!("min={}", min)),
        }
    }

    pub fn is_policy(&self) -> bool {
        self.kind().is_policy()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject() {
            Some(subject) => write!(f, "{}:{}", self.kind(), subject),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// Parse `key=<u32>` out of a comma-separated subject.
fn subject_field(subject: &str, key: &str) -> Option<u32> {
    subject.split(',').find_map(|part| {
        let (k, v) = part.split_once('=')?;
        if k == key {
            v.parse().ok()
        } else {
            None
        }
    })
}

impl FromStr for Reason {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidReason(s.to_string());
        let (token, subject) = match s.split_once(':') {
            Some((token, subject)) => (token, Some(subject)),
            None => (s, None),
        };
        let kind = ReasonKind::from_token(token).ok_or_else(invalid)?;

        if kind == ReasonKind::MissingKidAndPub {
            return match subject {
                None => Ok(Reason::MissingKidAndPub),
                Some(_) => Err(invalid()),
            };
        }
        let subject = subject.ok_or_else(invalid)?;
        let kid = || Kid::from(subject);

        Ok(match kind {
            ReasonKind::SignerNotFound => Reason::SignerNotFound(kid()),
            ReasonKind::RevokedKid => Reason::RevokedKid(kid()),
            ReasonKind::RetiredOutOfGrace => Reason::RetiredOutOfGrace(kid()),
            ReasonKind::KeyImportFailed => Reason::KeyImportFailed(kid()),
            ReasonKind::LegacyNotAllowed => Reason::LegacyNotAllowed(subject.to_string()),
            ReasonKind::LegacyKeyImportFailed => Reason::LegacyKeyImportFailed(subject.to_string()),
            ReasonKind::SigVerifyFailed => Reason::SigVerifyFailed(SignerId::parse(subject)),
            ReasonKind::SigVerifyError => Reason::SigVerifyError(SignerId::parse(subject)),
            ReasonKind::BannedKid => Reason::BannedKid(kid()),
            ReasonKind::RequireKidMissing => Reason::RequireKidMissing(kid()),
            ReasonKind::ThresholdNotMet => Reason::ThresholdNotMet {
                min: subject_field(subject, "min").ok_or_else(invalid)?,
                count: subject_field(subject, "count").ok_or_else(invalid)?,
            },
            ReasonKind::V1IncompatibleWithThreshold => Reason::V1IncompatibleWithThreshold {
                min: subject_field(subject, "min").ok_or_else(invalid)?,
            },
            ReasonKind::MissingKidAndPub => Reason::MissingKidAndPub,
        })
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Reason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of verifying an attestation against a pack and policy.
///
/// Recomputed on every call; never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationResult {
    pub ok: bool,

    /// Number of signatures that verified (after deduplication).
    pub count: u32,

    /// Failure reasons in the order they were produced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<Reason>,
}

impl VerificationResult {
    /// Whether any reason of the given kind was recorded.
    pub fn has_reason(&self, kind: ReasonKind) -> bool {
        self.reasons.iter().any(|r| r.kind() == kind)
    }

    /// Reasons in their rendered wire form.
    pub fn reason_strings(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

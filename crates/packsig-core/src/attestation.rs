//! Attestations: the signed statements over a pack's canonical bytes.
//!
//! Two formats exist. V2 carries any number of signature entries, each
//! naming a registry kid or embedding a raw public key. V1 is the older
//! single-signature format, still accepted under restricted policies.
//!
//! ## Wire format
//!
//! ```text
//! V2: {"v":2,"sigs":[{"kid":"s1","signatureB64":"..."},{"publicKeyB64":"...","signatureB64":"..."}]}
//! V1: {"v":1,"manifest":{...},"att":{"alg":"Ed25519","signer":"<b64 key>","sig":"<b64>","ts":0,"kid":"s1"}}
//! ```
//!
//! Key and signature fields that are not valid base64 still decode; the
//! text is kept as [`WireBytes::Malformed`] and verification rejects that
//! one entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{decode_b64, encode_b64};
use crate::error::{CoreError, Result};
use crate::types::Kid;

/// The only algorithm V1 attestations may name.
pub const LEGACY_ALGORITHM: &str = "Ed25519";

/// A signed attestation over a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireAttestation", into = "WireAttestation")]
pub enum Attestation {
    /// Single-signature legacy format.
    V1(LegacyAttestation),
    /// Multi-signature format.
    V2(MultiAttestation),
}

impl Attestation {
    /// The format version number.
    pub fn version(&self) -> u8 {
        match self {
            Attestation::V1(_) => 1,
            Attestation::V2(_) => 2,
        }
    }

    /// Decode from the JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode to the JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A multi-signature attestation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiAttestation {
    /// Signature entries in emission order.
    pub sigs: Vec<SignatureEntry>,
}

/// Bytes carried as a base64 field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireBytes {
    Decoded(Vec<u8>),
    /// Field text that is not valid base64.
    Malformed(String),
}

impl WireBytes {
    pub fn from_b64(text: &str) -> Self {
        match decode_b64(text) {
            Ok(bytes) => WireBytes::Decoded(bytes),
            Err(_) => WireBytes::Malformed(text.to_string()),
        }
    }

    /// The wire text. Malformed fields round-trip unchanged.
    pub fn to_b64(&self) -> String {
        match self {
            WireBytes::Decoded(bytes) => encode_b64(bytes),
            WireBytes::Malformed(text) => text.clone(),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            WireBytes::Decoded(bytes) => Some(bytes),
            WireBytes::Malformed(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            WireBytes::Decoded(bytes) => bytes.is_empty(),
            WireBytes::Malformed(text) => text.is_empty(),
        }
    }
}

impl From<Vec<u8>> for WireBytes {
    fn from(bytes: Vec<u8>) -> Self {
        WireBytes::Decoded(bytes)
    }
}

/// One signature in a [`MultiAttestation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    pub kid: Option<Kid>,

    /// Embedded raw public key (legacy entries).
    pub public_key: Option<WireBytes>,

    /// Signature bytes. Length is checked at verification time.
    pub signature: WireBytes,
}

impl SignatureEntry {
    /// An entry resolved through the signer registry.
    pub fn for_kid(kid: Kid, signature: Vec<u8>) -> Self {
        Self {
            kid: Some(kid),
            public_key: None,
            signature: signature.into(),
        }
    }

    /// An entry carrying its own public key.
    pub fn embedded(public_key: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            kid: None,
            public_key: Some(public_key.into()),
            signature: signature.into(),
        }
    }
}

/// A single-signature legacy attestation.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAttestation {
    /// Opaque manifest carried alongside the signature. Not verified.
    pub manifest: Value,

    pub algorithm: String,

    /// Embedded signer public key. May be empty when `kid` is set.
    pub signer: WireBytes,

    pub kid: Option<Kid>,

    pub signature: WireBytes,

    /// Signing time claimed by the signer (Unix milliseconds). Untrusted.
    pub timestamp: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire codec
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireAttestation {
    v: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sigs: Option<Vec<WireSignature>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manifest: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    att: Option<WireLegacy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSignature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_key_b64: Option<String>,
    signature_b64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireLegacy {
    alg: String,
    #[serde(default)]
    signer: String,
    sig: String,
    #[serde(default)]
    ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
}

impl TryFrom<WireAttestation> for Attestation {
    type Error = CoreError;

    fn try_from(wire: WireAttestation) -> Result<Self> {
        match wire.v {
            1 => {
                let att = wire
                    .att
                    .ok_or_else(|| CoreError::MalformedAttestation("v1 without att".into()))?;
                Ok(Attestation::V1(LegacyAttestation {
                    manifest: wire.manifest.unwrap_or(Value::Null),
                    algorithm: att.alg,
                    signer: WireBytes::from_b64(&att.signer),
                    kid: att.kid.map(Kid::from),
                    signature: WireBytes::from_b64(&att.sig),
                    timestamp: att.ts,
                }))
            }
            2 => {
                let sigs = wire
                    .sigs
                    .ok_or_else(|| CoreError::MalformedAttestation("v2 without sigs".into()))?;
                let sigs = sigs
                    .into_iter()
                    .map(|s| SignatureEntry {
                        kid: s.kid.map(Kid::from),
                        public_key: s.public_key_b64.as_deref().map(WireBytes::from_b64),
                        signature: WireBytes::from_b64(&s.signature_b64),
                    })
                    .collect();
                Ok(Attestation::V2(MultiAttestation { sigs }))
            }
            other => Err(CoreError::UnsupportedVersion(other)),
        }
    }
}

impl From<Attestation> for WireAttestation {
    fn from(attestation: Attestation) -> Self {
        match attestation {
            Attestation::V1(legacy) => WireAttestation {
                v: 1,
                sigs: None,
                manifest: Some(legacy.manifest),
                att: Some(WireLegacy {
                    alg: legacy.algorithm,
                    signer: legacy.signer.to_b64(),
                    sig: legacy.signature.to_b64(),
                    ts: legacy.timestamp,
                    kid: legacy.kid.map(|k| k.0),
                }),
            },
            Attestation::V2(multi) => WireAttestation {
                v: 2,
                sigs: Some(
                    multi
                        .sigs
                        .into_iter()
                        .map(|s| WireSignature {
                            kid: s.kid.map(|k| k.0),
                            public_key_b64: s.public_key.as_ref().map(WireBytes::to_b64),
                            signature_b64: s.signature.to_b64(),
                        })
                        .collect(),
                ),
                manifest: None,
                att: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_v2_wire_encoding() {
        let attestation = Attestation::V2(MultiAttestation {
            sigs: vec![
                SignatureEntry::for_kid(Kid::from("s1"), vec![1, 2, 3]),
                SignatureEntry::embedded(vec![9; 32], vec![4, 5]),
            ],
        });
        let value: Value = serde_json::from_str(&attestation.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "v": 2,
                "sigs": [
                    {"kid": "s1", "signatureB64": "AQID"},
                    {"publicKeyB64": encode_b64(&[9; 32]), "signatureB64": "BAU="}
                ]
            })
        );
        assert_eq!(Attestation::from_json(&value.to_string()).unwrap(), attestation);
    }

    #[test]
    fn test_v1_wire_decoding() {
        let json = json!({
            "v": 1,
            "manifest": {"name": "pack-a"},
            "att": {"alg": "Ed25519", "signer": "AAEC", "sig": "AwQ=", "ts": 1700, "kid": "old"}
        });
        let attestation = Attestation::from_json(&json.to_string()).unwrap();
        let Attestation::V1(legacy) = &attestation else {
            panic!("expected v1");
        };
        assert_eq!(legacy.algorithm, LEGACY_ALGORITHM);
        assert_eq!(legacy.signer, WireBytes::from(vec![0, 1, 2]));
        assert_eq!(legacy.signature.as_bytes(), Some(&[3u8, 4][..]));
        assert_eq!(legacy.kid, Some(Kid::from("old")));
        assert_eq!(legacy.timestamp, 1700);
        assert_eq!(attestation.version(), 1);
    }

    #[test]
    fn test_entry_without_kid_or_key_decodes() {
        let attestation =
            Attestation::from_json(r#"{"v":2,"sigs":[{"signatureB64":"AA=="}]}"#).unwrap();
        let Attestation::V2(multi) = attestation else {
            panic!("expected v2");
        };
        assert_eq!(multi.sigs[0].kid, None);
        assert_eq!(multi.sigs[0].public_key, None);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let err = Attestation::from_json(r#"{"v":3,"sigs":[]}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported attestation version: 3"));
    }

    #[test]
    fn test_missing_body_rejected() {
        assert!(Attestation::from_json(r#"{"v":2}"#).is_err());
        assert!(Attestation::from_json(r#"{"v":1,"manifest":{}}"#).is_err());
    }

    #[test]
    fn test_bad_base64_kept_per_entry() {
        let json = r#"{"v":2,"sigs":[{"kid":"s1","signatureB64":"AQID"},{"publicKeyB64":"%%not-b64%%","signatureB64":"AA=="},{"kid":"s2","signatureB64":"%%"}]}"#;
        let attestation = Attestation::from_json(json).unwrap();
        let Attestation::V2(multi) = &attestation else {
            panic!("expected v2");
        };
        assert_eq!(multi.sigs[0].signature, WireBytes::Decoded(vec![1, 2, 3]));
        assert_eq!(
            multi.sigs[1].public_key,
            Some(WireBytes::Malformed("%%not-b64%%".into()))
        );
        assert_eq!(multi.sigs[2].signature.as_bytes(), None);

        let reencoded: Value = serde_json::from_str(&attestation.to_json().unwrap()).unwrap();
        assert_eq!(reencoded, serde_json::from_str::<Value>(json).unwrap());
    }

    #[test]
    fn test_v1_bad_base64_kept() {
        let json = r#"{"v":1,"manifest":{},"att":{"alg":"Ed25519","signer":"**","sig":"??"}}"#;
        let Attestation::V1(legacy) = Attestation::from_json(json).unwrap() else {
            panic!("expected v1");
        };
        assert_eq!(legacy.signer, WireBytes::Malformed("**".into()));
        assert_eq!(legacy.signature, WireBytes::Malformed("??".into()));
        assert!(!legacy.signer.is_empty());
    }

    #[test]
    fn test_empty_field_decodes_empty() {
        let field = WireBytes::from_b64("");
        assert_eq!(field, WireBytes::Decoded(Vec::new()));
        assert!(field.is_empty());
    }
}

//! Signer resolution shared by the V2 verifier and the legacy adapter.
//!
//! An entry names its signer either by registry kid or by an embedded raw
//! public key. Resolution turns that into a usable verification key or a
//! reason explaining why the entry cannot count.

use packsig_core::{
    Ed25519PublicKey, Ed25519Signature, Kid, Namespace, Reason, SignerId, SignerStatus,
    ThresholdPolicy, WireBytes,
};
use packsig_registry::SignerRegistry;

use crate::audit::AuditSink;
use crate::engine::Engine;
use crate::error::Result;
use crate::gate::CapabilityGate;

/// Outcome of resolving one signature entry.
#[derive(Debug)]
pub(crate) enum Resolution {
    Key(Ed25519PublicKey),
    Rejected(Reason),
}

impl<R: SignerRegistry, G: CapabilityGate, A: AuditSink> Engine<R, G, A> {
    /// The identity an entry claims. A kid wins over an embedded key.
    ///
    /// `None` when the entry carries neither.
    pub(crate) fn signer_id(&self, kid: Option<&Kid>, embedded: Option<&WireBytes>) -> Option<SignerId> {
        match (kid, embedded) {
            (Some(kid), _) => Some(SignerId::Kid(kid.clone())),
            (None, Some(key)) => Some(SignerId::Legacy(self.legacy_prefix(key))),
            (None, None) => None,
        }
    }

    /// Leading base64 characters of an embedded key, taken from the field
    /// text even when it does not decode.
    pub(crate) fn legacy_prefix(&self, key: &WireBytes) -> String {
        key.to_b64()
            .chars()
            .take(self.config.legacy_prefix_len)
            .collect()
    }

    /// Resolve a signer to its verification key.
    ///
    /// Registry faults propagate; everything else is a [`Resolution::Rejected`].
    pub(crate) async fn resolve_signer(
        &self,
        namespace: &Namespace,
        id: &SignerId,
        embedded: Option<&WireBytes>,
        policy: &ThresholdPolicy,
        now_ms: i64,
    ) -> Result<Resolution> {
        match id {
            SignerId::Kid(kid) => self.resolve_registered(namespace, kid, policy, now_ms).await,
            SignerId::Legacy(prefix) => Ok(resolve_embedded(prefix, embedded, policy)),
        }
    }

    async fn resolve_registered(
        &self,
        namespace: &Namespace,
        kid: &Kid,
        policy: &ThresholdPolicy,
        now_ms: i64,
    ) -> Result<Resolution> {
        let record = match self.registry.get_signer(namespace, kid).await? {
            Some(record) => record,
            None => return Ok(Resolution::Rejected(Reason::SignerNotFound(kid.clone()))),
        };

        match record.status {
            SignerStatus::Active => {}
            SignerStatus::Revoked => {
                return Ok(Resolution::Rejected(Reason::RevokedKid(kid.clone())));
            }
            SignerStatus::Retired => {
                if !record.within_grace(now_ms, policy.retired_grace_ms) {
                    return Ok(Resolution::Rejected(Reason::RetiredOutOfGrace(kid.clone())));
                }
            }
        }

        Ok(match record.verifying_key() {
            Ok(key) => Resolution::Key(key),
            Err(_) => Resolution::Rejected(Reason::KeyImportFailed(kid.clone())),
        })
    }
}

fn resolve_embedded(
    prefix: &str,
    embedded: Option<&WireBytes>,
    policy: &ThresholdPolicy,
) -> Resolution {
    if !policy.allow_legacy {
        return Resolution::Rejected(Reason::LegacyNotAllowed(prefix.to_string()));
    }
    match embedded
        .and_then(WireBytes::as_bytes)
        .map(Ed25519PublicKey::from_slice)
    {
        Some(Ok(key)) => Resolution::Key(key),
        _ => Resolution::Rejected(Reason::LegacyKeyImportFailed(prefix.to_string())),
    }
}

/// Check one signature. Returns the reason it does not count, if any.
///
/// Bytes that cannot be a signature are an error; a well-formed signature
/// that does not match is a failure.
pub(crate) fn check_signature(
    id: &SignerId,
    key: &Ed25519PublicKey,
    message: &[u8],
    signature: &WireBytes,
) -> Option<Reason> {
    let signature = match signature
        .as_bytes()
        .and_then(|bytes| Ed25519Signature::from_slice(bytes).ok())
    {
        Some(signature) => signature,
        None => return Some(Reason::SigVerifyError(id.clone())),
    };
    match key.verify(message, &signature) {
        Ok(()) => None,
        Err(_) => Some(Reason::SigVerifyFailed(id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsig_core::{Keypair, SignerRecord};
    use packsig_registry::MemoryRegistry;

    fn engine() -> Engine<MemoryRegistry> {
        Engine::with_registry(MemoryRegistry::new())
    }

    fn wire(bytes: &[u8]) -> WireBytes {
        WireBytes::from(bytes.to_vec())
    }

    #[test]
    fn test_signer_id_prefers_kid() {
        let engine = engine();
        let key = wire(Keypair::from_seed(&[1; 32]).public_key().as_bytes());

        let id = engine.signer_id(Some(&Kid::from("s1")), Some(&key));
        assert_eq!(id, Some(SignerId::Kid(Kid::from("s1"))));

        let id = engine.signer_id(None, Some(&key)).unwrap();
        let expected: String = key.to_b64().chars().take(16).collect();
        assert_eq!(id, SignerId::Legacy(expected));

        assert_eq!(engine.signer_id(None, None), None);
    }

    #[test]
    fn test_legacy_prefix_shorter_than_limit() {
        let engine = engine();
        assert_eq!(engine.legacy_prefix(&wire(&[0xff])), "/w==");
    }

    #[test]
    fn test_legacy_prefix_of_malformed_key_uses_field_text() {
        let engine = engine();
        let key = WireBytes::Malformed("%%not-base64-at-all%%".into());
        assert_eq!(engine.legacy_prefix(&key), "%%not-base64-at-");
    }

    #[tokio::test]
    async fn test_resolve_registered_statuses() {
        let ns = Namespace::from("tenant-a");
        let engine = engine();
        let keypair = Keypair::from_seed(&[2; 32]);
        engine.registry.insert(&ns, SignerRecord::active("live", &keypair, 0));
        engine.registry.insert(&ns, SignerRecord::active("gone", &keypair, 0));
        engine.registry.revoke(&ns, &Kid::from("gone"));

        let mut broken = SignerRecord::active("broken", &keypair, 0);
        broken.public_key = vec![0u8; 5].into();
        engine.registry.insert(&ns, broken);

        let policy = ThresholdPolicy::new(1);
        let resolve = |kid: &str| {
            let id = SignerId::Kid(Kid::from(kid));
            let (engine, ns, policy) = (&engine, &ns, &policy);
            async move { engine.resolve_signer(ns, &id, None, policy, 0).await.unwrap() }
        };

        assert!(matches!(resolve("live").await, Resolution::Key(_)));
        assert!(matches!(
            resolve("gone").await,
            Resolution::Rejected(Reason::RevokedKid(_))
        ));
        assert!(matches!(
            resolve("broken").await,
            Resolution::Rejected(Reason::KeyImportFailed(_))
        ));
        assert!(matches!(
            resolve("nobody").await,
            Resolution::Rejected(Reason::SignerNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_embedded_requires_allow_legacy() {
        let key = wire(Keypair::from_seed(&[3; 32]).public_key().as_bytes());

        let denied = resolve_embedded("p", Some(&key), &ThresholdPolicy::new(1));
        assert!(matches!(denied, Resolution::Rejected(Reason::LegacyNotAllowed(_))));

        let policy = ThresholdPolicy::new(1).allow_legacy();
        assert!(matches!(resolve_embedded("p", Some(&key), &policy), Resolution::Key(_)));
        assert!(matches!(
            resolve_embedded("p", Some(&wire(&[1, 2, 3])), &policy),
            Resolution::Rejected(Reason::LegacyKeyImportFailed(_))
        ));
        assert!(matches!(
            resolve_embedded("p", Some(&WireBytes::Malformed("%%".into())), &policy),
            Resolution::Rejected(Reason::LegacyKeyImportFailed(_))
        ));
    }

    #[test]
    fn test_check_signature_outcomes() {
        let keypair = Keypair::from_seed(&[4; 32]);
        let id = SignerId::Kid(Kid::from("s1"));
        let signature = wire(keypair.sign(b"msg").as_bytes());

        assert_eq!(check_signature(&id, &keypair.public_key(), b"msg", &signature), None);
        assert_eq!(
            check_signature(&id, &keypair.public_key(), b"other", &signature),
            Some(Reason::SigVerifyFailed(id.clone()))
        );
        assert_eq!(
            check_signature(&id, &keypair.public_key(), b"msg", &wire(&[0; 10])),
            Some(Reason::SigVerifyError(id.clone()))
        );
        assert_eq!(
            check_signature(&id, &keypair.public_key(), b"msg", &WireBytes::Malformed("%%".into())),
            Some(Reason::SigVerifyError(id.clone()))
        );
    }
}

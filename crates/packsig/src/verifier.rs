//! Multi-signature (V2) verification.

use std::collections::BTreeSet;

use packsig_core::{
    evaluate_threshold, MultiAttestation, Namespace, Reason, SignerId, ThresholdPolicy,
    VerificationResult,
};
use packsig_registry::SignerRegistry;

use crate::audit::AuditSink;
use crate::engine::Engine;
use crate::error::Result;
use crate::gate::CapabilityGate;
use crate::resolve::{check_signature, Resolution};

impl<R: SignerRegistry, G: CapabilityGate, A: AuditSink> Engine<R, G, A> {
    /// Walk the entries in order, then apply the policy.
    ///
    /// An identity seen earlier in the same attestation is skipped without
    /// a reason, whatever happened to its first entry.
    pub(crate) async fn verify_multi(
        &self,
        namespace: &Namespace,
        attestation: &MultiAttestation,
        message: &[u8],
        policy: &ThresholdPolicy,
        now_ms: i64,
    ) -> Result<VerificationResult> {
        let mut seen: BTreeSet<SignerId> = BTreeSet::new();
        let mut valid: BTreeSet<SignerId> = BTreeSet::new();
        let mut reasons = Vec::new();
        let mut count: u32 = 0;

        for (index, entry) in attestation.sigs.iter().enumerate() {
            let embedded = entry.public_key.as_ref();
            let id = match self.signer_id(entry.kid.as_ref(), embedded) {
                Some(id) => id,
                None => {
                    tracing::debug!(index, "signature entry has neither kid nor key");
                    reasons.push(Reason::MissingKidAndPub);
                    continue;
                }
            };

            if !seen.insert(id.clone()) {
                tracing::debug!(index, signer = %id, "duplicate signer skipped");
                continue;
            }

            let key = match self
                .resolve_signer(namespace, &id, embedded, policy, now_ms)
                .await?
            {
                Resolution::Key(key) => key,
                Resolution::Rejected(reason) => {
                    tracing::debug!(index, signer = %id, reason = %reason, "signer rejected");
                    reasons.push(reason);
                    continue;
                }
            };

            match check_signature(&id, &key, message, &entry.signature) {
                None => {
                    count += 1;
                    valid.insert(id);
                }
                Some(reason) => {
                    tracing::debug!(index, signer = %id, reason = %reason, "signature rejected");
                    reasons.push(reason);
                }
            }
        }

        reasons.extend(evaluate_threshold(policy, &valid, count));
        let ok = !reasons.iter().any(Reason::is_policy);

        Ok(VerificationResult { ok, count, reasons })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsig_core::{Keypair, Kid, Pack, PackMeta, SignatureEntry, SignerRecord};
    use packsig_registry::MemoryRegistry;
    use serde_json::json;

    fn ns() -> Namespace {
        Namespace::from("tenant-a")
    }

    fn pack() -> Pack {
        Pack::new(PackMeta::new("h1", 1, 1000), vec![json!({"op": "put", "k": "a"})])
    }

    fn setup(kids: &[&str]) -> (Engine<MemoryRegistry>, Vec<Keypair>) {
        let registry = MemoryRegistry::new();
        let keypairs: Vec<Keypair> = kids
            .iter()
            .enumerate()
            .map(|(i, kid)| {
                let keypair = Keypair::from_seed(&[i as u8 + 1; 32]);
                registry.insert(&ns(), SignerRecord::active(*kid, &keypair, 0));
                keypair
            })
            .collect();
        (Engine::with_registry(registry), keypairs)
    }

    fn signed(kid: &str, keypair: &Keypair, message: &[u8]) -> SignatureEntry {
        SignatureEntry::for_kid(Kid::from(kid), keypair.sign(message).0.to_vec())
    }

    #[tokio::test]
    async fn test_duplicate_after_failure_is_silent() {
        let (engine, keys) = setup(&["s1"]);
        let message = pack().canonical_bytes();
        let attestation = MultiAttestation {
            sigs: vec![
                SignatureEntry::for_kid(Kid::from("s1"), vec![0u8; 64]),
                signed("s1", &keys[0], &message),
            ],
        };

        let result = engine
            .verify_multi(&ns(), &attestation, &message, &ThresholdPolicy::new(0), 0)
            .await
            .unwrap();

        assert_eq!(result.count, 0);
        assert_eq!(result.reason_strings(), vec!["sig_verify_failed:s1"]);
    }

    #[tokio::test]
    async fn test_missing_kid_and_pub_not_deduplicated() {
        let (engine, _) = setup(&[]);
        let message = pack().canonical_bytes();
        let bare = SignatureEntry {
            kid: None,
            public_key: None,
            signature: vec![0u8; 64].into(),
        };
        let attestation = MultiAttestation {
            sigs: vec![bare.clone(), bare],
        };

        let result = engine
            .verify_multi(&ns(), &attestation, &message, &ThresholdPolicy::new(1), 0)
            .await
            .unwrap();

        assert!(!result.ok);
        assert_eq!(
            result.reason_strings(),
            vec![
                "missing_kid_and_pub",
                "missing_kid_and_pub",
                "threshold_not_met:min=1,count=0"
            ]
        );
    }

    #[tokio::test]
    async fn test_reasons_follow_entry_order() {
        let (engine, keys) = setup(&["s1", "s2"]);
        let message = pack().canonical_bytes();
        let attestation = MultiAttestation {
            sigs: vec![
                SignatureEntry::for_kid(Kid::from("ghost"), vec![0u8; 64]),
                signed("s2", &keys[0], &message),
                signed("s1", &keys[0], &message),
            ],
        };

        let result = engine
            .verify_multi(&ns(), &attestation, &message, &ThresholdPolicy::new(1), 0)
            .await
            .unwrap();

        assert!(result.ok);
        assert_eq!(result.count, 1);
        assert_eq!(
            result.reason_strings(),
            vec!["signer_not_found:ghost", "sig_verify_failed:s2"]
        );
    }

    #[tokio::test]
    async fn test_empty_attestation() {
        let (engine, _) = setup(&[]);
        let message = pack().canonical_bytes();
        let empty = MultiAttestation::default();

        let zero = engine
            .verify_multi(&ns(), &empty, &message, &ThresholdPolicy::new(0), 0)
            .await
            .unwrap();
        assert!(zero.ok);
        assert_eq!(zero.count, 0);

        let one = engine
            .verify_multi(&ns(), &empty, &message, &ThresholdPolicy::new(1), 0)
            .await
            .unwrap();
        assert!(!one.ok);
    }
}

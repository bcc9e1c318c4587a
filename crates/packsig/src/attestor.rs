//! Multi-signature attestation emission.

use packsig_core::{
    Attestation, Blake3Hash, Keypair, Kid, MultiAttestation, Namespace, Pack, SignatureEntry,
};
use packsig_registry::SignerRegistry;

use crate::audit::{AuditEvent, AuditSink, EmitEvent};
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::gate::{CapabilityGate, EmitRequest};

impl<R: SignerRegistry, G: CapabilityGate, A: AuditSink> Engine<R, G, A> {
    /// Sign a pack with every listed signer and return a V2 attestation.
    ///
    /// The capability gate is consulted first, then every kid is resolved.
    /// Any failure aborts before a signature is produced or an audit event
    /// is logged. Kids are signed in the given order and are not
    /// deduplicated.
    pub async fn attest_pack_multi(
        &self,
        namespace: &Namespace,
        kids: &[Kid],
        pack: &Pack,
    ) -> Result<Attestation> {
        let request = EmitRequest::new(kids);
        let decision = self
            .gate
            .check_policy(namespace, &self.config.emit_capability, &request)
            .await?;
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| format!("{} denied", self.config.emit_capability));
            tracing::warn!(namespace = %namespace, reason = %reason, "emission denied");
            return Err(EngineError::PolicyDenied { reason });
        }

        let mut signers: Vec<(&Kid, Keypair)> = Vec::with_capacity(kids.len());
        for kid in kids {
            signers.push((kid, self.signing_key(namespace, kid).await?));
        }

        let message = pack.canonical_bytes();
        let sigs: Vec<SignatureEntry> = signers
            .iter()
            .map(|(kid, keypair)| {
                SignatureEntry::for_kid((*kid).clone(), keypair.sign(&message).0.to_vec())
            })
            .collect();

        tracing::info!(
            namespace = %namespace,
            count = sigs.len(),
            content_hash = %pack.content_hash(),
            "attestation emitted"
        );

        self.record(AuditEvent::Emit(EmitEvent {
            namespace: namespace.clone(),
            kids: kids.to_vec(),
            count: sigs.len(),
            content_hash: pack.content_hash().to_string(),
            canonical_digest: Blake3Hash::hash(&message).to_hex(),
        }));

        Ok(Attestation::V2(MultiAttestation { sigs }))
    }

    /// Look up a signer and import its private key.
    async fn signing_key(&self, namespace: &Namespace, kid: &Kid) -> Result<Keypair> {
        let record = self
            .registry
            .get_signer(namespace, kid)
            .await?
            .ok_or_else(|| EngineError::UnknownSigner(kid.clone()))?;

        if record.is_revoked() {
            return Err(EngineError::RevokedSigner(kid.clone()));
        }
        if record.private_key.is_none() {
            return Err(EngineError::MissingPrivateKey(kid.clone()));
        }

        let keypair = record.signing_keypair()?;
        tracing::debug!(kid = %kid, status = %record.status, "signer resolved");
        Ok(keypair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use packsig_core::{PackMeta, SignerRecord};
    use packsig_registry::MemoryRegistry;
    use serde_json::json;

    use crate::audit::MemoryAuditSink;
    use crate::engine::EngineConfig;
    use crate::gate::{AllowAll, DenyNamespaces};

    fn ns() -> Namespace {
        Namespace::from("tenant-a")
    }

    fn pack() -> Pack {
        Pack::new(PackMeta::new("h1", 1, 1000), vec![json!({"op": "put"})])
    }

    fn kids(names: &[&str]) -> Vec<Kid> {
        names.iter().map(|k| Kid::from(*k)).collect()
    }

    fn registry_with(names: &[&str]) -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        for (i, name) in names.iter().enumerate() {
            let keypair = Keypair::from_seed(&[i as u8 + 10; 32]);
            registry.insert(&ns(), SignerRecord::active(*name, &keypair, 0));
        }
        registry
    }

    #[tokio::test]
    async fn test_signs_in_order_without_dedup() {
        let engine = Engine::with_registry(registry_with(&["s1", "s2"]));
        let attestation = engine
            .attest_pack_multi(&ns(), &kids(&["s2", "s1", "s2"]), &pack())
            .await
            .unwrap();

        let Attestation::V2(multi) = attestation else {
            panic!("expected v2");
        };
        let order: Vec<&str> = multi
            .sigs
            .iter()
            .map(|s| s.kid.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(order, vec!["s2", "s1", "s2"]);
        assert_eq!(multi.sigs[0].signature, multi.sigs[2].signature);
        assert!(multi.sigs.iter().all(|s| s.signature.as_bytes().map(<[u8]>::len) == Some(64)));
    }

    #[tokio::test]
    async fn test_signatures_are_deterministic() {
        let engine = Engine::with_registry(registry_with(&["s1"]));
        let first = engine.attest_pack_multi(&ns(), &kids(&["s1"]), &pack()).await.unwrap();
        let second = engine.attest_pack_multi(&ns(), &kids(&["s1"]), &pack()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_verify_only_signer_cannot_sign() {
        let registry = MemoryRegistry::new();
        let keypair = Keypair::from_seed(&[1; 32]);
        registry.insert(&ns(), SignerRecord::verify_only("ro", &keypair.public_key(), 0));
        let engine = Engine::with_registry(registry);

        let err = engine
            .attest_pack_multi(&ns(), &kids(&["ro"]), &pack())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingPrivateKey(kid) if kid.as_str() == "ro"));
    }

    #[tokio::test]
    async fn test_failure_leaves_no_audit_trail() {
        let audit = Arc::new(MemoryAuditSink::new());
        let engine = Engine::new(
            registry_with(&["s1"]),
            AllowAll,
            Arc::clone(&audit),
            EngineConfig::default(),
        );

        let err = engine
            .attest_pack_multi(&ns(), &kids(&["s1", "ghost"]), &pack())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownSigner(_)));
        assert!(audit.is_empty());

        engine
            .attest_pack_multi(&ns(), &kids(&["s1"]), &pack())
            .await
            .unwrap();
        let events = audit.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            AuditEvent::Emit(e) => {
                assert_eq!(e.count, 1);
                assert_eq!(e.content_hash, "h1");
                assert_eq!(e.canonical_digest, pack().canonical_digest().to_hex());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gate_denial_precedes_lookup() {
        let engine = Engine::new(
            MemoryRegistry::new(),
            DenyNamespaces::new(["tenant-a"]),
            MemoryAuditSink::new(),
            EngineConfig::default(),
        );

        // The kid does not exist; the gate answers first.
        let err = engine
            .attest_pack_multi(&ns(), &kids(&["ghost"]), &pack())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PolicyDenied { .. }));
        assert!(engine.audit_sink().is_empty());
    }

    #[tokio::test]
    async fn test_audit_can_be_disabled() {
        let config = EngineConfig {
            audit_enabled: false,
            ..EngineConfig::default()
        };
        let engine = Engine::new(registry_with(&["s1"]), AllowAll, MemoryAuditSink::new(), config);
        engine
            .attest_pack_multi(&ns(), &kids(&["s1"]), &pack())
            .await
            .unwrap();
        assert!(engine.audit_sink().is_empty());
    }
}

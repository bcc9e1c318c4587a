//! The Engine: attestation emission and threshold verification.
//!
//! The Engine brings together the signer registry, the capability gate and
//! the audit sink. The operations themselves live in `attestor`,
//! `verifier` and `legacy`; this module holds the shared state.

use packsig_core::{Attestation, Blake3Hash, Namespace, Pack, ThresholdPolicy, VerificationResult};
use packsig_registry::SignerRegistry;

use crate::audit::{AuditEvent, AuditSink, TracingAuditSink, VerifyEvent};
use crate::error::Result;
use crate::gate::{AllowAll, CapabilityGate};

/// Capability name checked before every emission.
pub const EMIT_CAPABILITY: &str = "attestation.emit.multi";

/// Configuration for the Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capability passed to the gate on emission.
    pub emit_capability: String,
    /// Base64 characters of an embedded key used to name legacy signers.
    pub legacy_prefix_len: usize,
    /// Whether events are sent to the audit sink.
    pub audit_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            emit_capability: EMIT_CAPABILITY.to_string(),
            legacy_prefix_len: 16,
            audit_enabled: true,
        }
    }
}

/// The attestation engine.
///
/// Holds no per-call state; one instance can serve concurrent calls from
/// behind an `Arc`.
pub struct Engine<R: SignerRegistry, G: CapabilityGate = AllowAll, A: AuditSink = TracingAuditSink> {
    pub(crate) registry: R,
    pub(crate) gate: G,
    pub(crate) audit: A,
    pub(crate) config: EngineConfig,
}

impl<R: SignerRegistry> Engine<R> {
    /// An engine that allows every emission and audits to `tracing`.
    pub fn with_registry(registry: R) -> Self {
        Self::new(registry, AllowAll, TracingAuditSink, EngineConfig::default())
    }
}

impl<R: SignerRegistry, G: CapabilityGate, A: AuditSink> Engine<R, G, A> {
    /// Create a new engine.
    pub fn new(registry: R, gate: G, audit: A, config: EngineConfig) -> Self {
        Self {
            registry,
            gate,
            audit,
            config,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn audit_sink(&self) -> &A {
        &self.audit
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification entry points
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify an attestation over a pack against a threshold policy.
    ///
    /// Signer problems are reported in the result. `Err` is returned only
    /// when the registry cannot answer.
    pub async fn verify_pack_multi(
        &self,
        pack: &Pack,
        attestation: &Attestation,
        namespace: &Namespace,
        policy: &ThresholdPolicy,
    ) -> Result<VerificationResult> {
        self.verify_pack_multi_at(pack, attestation, namespace, policy, now_millis())
            .await
    }

    /// As [`Engine::verify_pack_multi`], evaluating retirement grace at `now_ms`.
    pub async fn verify_pack_multi_at(
        &self,
        pack: &Pack,
        attestation: &Attestation,
        namespace: &Namespace,
        policy: &ThresholdPolicy,
        now_ms: i64,
    ) -> Result<VerificationResult> {
        let message = pack.canonical_bytes();

        let result = match attestation {
            Attestation::V1(legacy) => {
                self.verify_legacy(namespace, legacy, &message, policy, now_ms)
                    .await?
            }
            Attestation::V2(multi) => {
                self.verify_multi(namespace, multi, &message, policy, now_ms)
                    .await?
            }
        };

        if result.ok {
            tracing::info!(
                namespace = %namespace,
                version = attestation.version(),
                min = policy.min,
                count = result.count,
                "attestation verified"
            );
        } else {
            tracing::warn!(
                namespace = %namespace,
                version = attestation.version(),
                min = policy.min,
                count = result.count,
                reasons = ?result.reason_strings(),
                "attestation rejected"
            );
        }

        self.record(AuditEvent::Verify(VerifyEvent {
            namespace: namespace.clone(),
            version: attestation.version(),
            min: policy.min,
            count: result.count,
            ok: result.ok,
            content_hash: pack.content_hash().to_string(),
            canonical_digest: Blake3Hash::hash(&message).to_hex(),
            reasons: result.reasons.clone(),
        }));

        Ok(result)
    }

    pub(crate) fn record(&self, event: AuditEvent) {
        if self.config.audit_enabled {
            self.audit.log(&event);
        }
    }
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

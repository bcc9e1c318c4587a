//! Legacy (V1) single-signature verification.
//!
//! A V1 attestation carries one signature, so it can only ever satisfy a
//! policy with `min <= 1`. Anything stricter is refused before any key is
//! looked up or any signature is checked.

use std::collections::BTreeSet;

use packsig_core::{
    evaluate_threshold, LegacyAttestation, Namespace, Reason, ThresholdPolicy,
    VerificationResult, LEGACY_ALGORITHM,
};
use packsig_registry::SignerRegistry;

use crate::audit::AuditSink;
use crate::engine::Engine;
use crate::error::Result;
use crate::gate::CapabilityGate;
use crate::resolve::{check_signature, Resolution};

impl<R: SignerRegistry, G: CapabilityGate, A: AuditSink> Engine<R, G, A> {
    pub(crate) async fn verify_legacy(
        &self,
        namespace: &Namespace,
        attestation: &LegacyAttestation,
        message: &[u8],
        policy: &ThresholdPolicy,
        now_ms: i64,
    ) -> Result<VerificationResult> {
        if policy.min > 1 {
            tracing::debug!(min = policy.min, "v1 attestation cannot meet threshold");
            return Ok(VerificationResult {
                ok: false,
                count: 0,
                reasons: vec![Reason::V1IncompatibleWithThreshold { min: policy.min }],
            });
        }

        let embedded = Some(&attestation.signer).filter(|key| !key.is_empty());
        let mut reasons = Vec::new();
        let mut valid = BTreeSet::new();

        match self.signer_id(attestation.kid.as_ref(), embedded) {
            None => reasons.push(Reason::MissingKidAndPub),
            Some(id) => match self
                .resolve_signer(namespace, &id, embedded, policy, now_ms)
                .await?
            {
                Resolution::Rejected(reason) => reasons.push(reason),
                Resolution::Key(_) if attestation.algorithm != LEGACY_ALGORITHM => {
                    tracing::debug!(alg = %attestation.algorithm, "unsupported v1 algorithm");
                    reasons.push(Reason::SigVerifyError(id));
                }
                Resolution::Key(key) => {
                    match check_signature(&id, &key, message, &attestation.signature) {
                        None => {
                            valid.insert(id);
                        }
                        Some(reason) => reasons.push(reason),
                    }
                }
            },
        }

        let count = valid.len() as u32;
        reasons.extend(evaluate_threshold(policy, &valid, count));
        let ok = count == 1 && !reasons.iter().any(Reason::is_policy);

        Ok(VerificationResult { ok, count, reasons })
    }
}

//! # packsig
//!
//! Multi-signature attestation for content packs, with M-of-N threshold
//! verification against a signer registry.
//!
//! ## Overview
//!
//! - **Emission**: several registered signers each sign the pack's canonical
//!   bytes; the result is a V2 attestation carrying one entry per signer.
//! - **Verification**: each entry is resolved (registry kid or embedded
//!   legacy key), checked, and deduplicated; the valid signers are then
//!   held to a [`ThresholdPolicy`](core::ThresholdPolicy).
//! - **Legacy**: V1 single-signature attestations verify only under
//!   policies that need at most one signature.
//!
//! Signer problems found while verifying are returned as reasons inside
//! the [`VerificationResult`](core::VerificationResult). Registry faults
//! are returned as `Err`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use packsig::core::{Keypair, Kid, Namespace, Pack, PackMeta, SignerRecord, ThresholdPolicy};
//! use packsig::registry::MemoryRegistry;
//! use packsig::Engine;
//!
//! async fn example() {
//!     let ns = Namespace::from("tenant-a");
//!     let registry = MemoryRegistry::new();
//!     registry.insert(&ns, SignerRecord::active("s1", &Keypair::generate(), 0));
//!     registry.insert(&ns, SignerRecord::active("s2", &Keypair::generate(), 0));
//!
//!     let engine = Engine::with_registry(registry);
//!     let pack = Pack::new(PackMeta::new("sha256:abc", 0, 0), vec![]);
//!
//!     let kids = [Kid::from("s1"), Kid::from("s2")];
//!     let attestation = engine.attest_pack_multi(&ns, &kids, &pack).await.unwrap();
//!
//!     let result = engine
//!         .verify_pack_multi(&pack, &attestation, &ns, &ThresholdPolicy::new(2))
//!         .await
//!         .unwrap();
//!     assert!(result.ok);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `packsig::core` - packs, attestations, policy, reasons
//! - `packsig::registry` - signer registry trait and backends

mod attestor;
pub mod audit;
pub mod engine;
pub mod error;
pub mod gate;
mod legacy;
mod resolve;
mod verifier;

// Re-export component crates
pub use packsig_core as core;
pub use packsig_registry as registry;

// Re-export main types for convenience
pub use audit::{
    AuditEvent, AuditSink, EmitEvent, MemoryAuditSink, NoopAuditSink, TracingAuditSink,
    VerifyEvent,
};
pub use engine::{Engine, EngineConfig, EMIT_CAPABILITY};
pub use error::{EngineError, Result};
pub use gate::{AllowAll, CapabilityGate, DenyNamespaces, EmitRequest, GateError, PolicyDecision};

pub use packsig_core::{
    Attestation, Kid, Namespace, Pack, PackMeta, Reason, ReasonKind, ThresholdPolicy,
    VerificationResult,
};
pub use packsig_registry::{MemoryRegistry, SignerRegistry, SqliteRegistry};

//! # packsig Core
//!
//! Pure primitives for multi-signature pack attestation: packs, canonical
//! signing bytes, signer records, attestations and threshold policy.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over signed data structures.
//!
//! ## Key Types
//!
//! - [`Pack`] - The content bundle being attested (`meta` + `events`)
//! - [`Attestation`] - Tagged union over the single-signature (V1) and
//!   multi-signature (V2) formats
//! - [`SignerRecord`] - A registry entry for a named signing key
//! - [`ThresholdPolicy`] - The M-of-N rule plus ban/require lists
//! - [`VerificationResult`] - Outcome of a verification, with [`Reason`]s
//!
//! ## Canonicalization
//!
//! Signatures cover the canonical JSON encoding of a pack's `meta` and
//! `events`. See [`canonical`] module.

pub mod attestation;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod pack;
pub mod policy;
pub mod reason;
pub mod signer;
pub mod types;

pub use attestation::{
    Attestation, LegacyAttestation, MultiAttestation, SignatureEntry, WireBytes, LEGACY_ALGORITHM,
};
pub use canonical::{canonical_json_bytes, canonical_pack_bytes};
pub use crypto::{decode_b64, encode_b64, Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::{CoreError, Result};
pub use pack::{Pack, PackMeta};
pub use policy::{evaluate_threshold, ThresholdPolicy};
pub use reason::{Reason, ReasonKind, VerificationResult};
pub use signer::{SignerRecord, SignerStatus};
pub use types::{Kid, Namespace, SignerId};

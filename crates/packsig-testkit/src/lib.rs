//! # packsig testkit
//!
//! Testing utilities for packsig.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: packs with their exact canonical signing bytes
//! - **Generators**: Proptest strategies for packs, events and policies
//! - **Fixtures**: deterministic signer sets, sample packs, and a registry
//!   that always fails
//!
//! ## Golden Vectors
//!
//! ```rust
//! use packsig_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use packsig_testkit::fixtures::{sample_pack, SignerSet};
//!
//! let signers = SignerSet::new("tenant-a", 3);
//! let registry = signers.registry();
//! let entry = signers.entry("s1", &sample_pack());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{pack_with_events, sample_pack, FailingRegistry, SignerSet};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};

//! # packsig Registry
//!
//! The signer registry gateway: read access to [`SignerRecord`]s by
//! namespace and kid.
//!
//! ## Overview
//!
//! Key lifecycle (creation, rotation, revocation bookkeeping) belongs to
//! whatever system owns the registry. The attestation engine only reads
//! records through the [`SignerRegistry`] trait, so tests can substitute
//! an in-memory fake with controlled signer states.
//!
//! ## Key Types
//!
//! - [`SignerRegistry`] - The async read trait consumed by the engine
//! - [`MemoryRegistry`] - In-memory registry for tests and embedding
//! - [`SqliteRegistry`] - SQLite-backed registry reader
//!
//! ## Usage
//!
//! ```rust,no_run
//! use packsig_core::{Keypair, Kid, Namespace, SignerRecord};
//! use packsig_registry::{MemoryRegistry, SignerRegistry};
//!
//! async fn example() {
//!     let registry = MemoryRegistry::new();
//!     let ns = Namespace::from("tenant-a");
//!     registry.insert(&ns, SignerRecord::active("s1", &Keypair::generate(), 0));
//!
//!     let record = registry.get_signer(&ns, &Kid::from("s1")).await.unwrap();
//!     assert!(record.is_some());
//! }
//! ```
//!
//! [`SignerRecord`]: packsig_core::SignerRecord

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{RegistryError, Result};
pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;
pub use traits::SignerRegistry;

//! In-memory implementation of the SignerRegistry trait.
//!
//! Primarily for tests. The mutators exist to seed signer state; they are
//! not a key lifecycle implementation.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use packsig_core::{Kid, Namespace, SignerRecord, SignerStatus};

use crate::error::Result;
use crate::traits::SignerRegistry;

/// In-memory registry.
///
/// All data is lost when the registry is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryRegistry {
    signers: RwLock<HashMap<(Namespace, Kid), SignerRecord>>,
}

impl MemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<(Namespace, Kid), SignerRecord>> {
        self.signers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<(Namespace, Kid), SignerRecord>> {
        self.signers.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a record.
    pub fn insert(&self, namespace: &Namespace, record: SignerRecord) {
        self.write()
            .insert((namespace.clone(), record.kid.clone()), record);
    }

    /// Remove a record. Returns whether it existed.
    pub fn remove(&self, namespace: &Namespace, kid: &Kid) -> bool {
        self.write()
            .remove(&(namespace.clone(), kid.clone()))
            .is_some()
    }

    /// Change a record's status. Returns whether the record exists.
    pub fn set_status(&self, namespace: &Namespace, kid: &Kid, status: SignerStatus) -> bool {
        match self.write().get_mut(&(namespace.clone(), kid.clone())) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Mark a record revoked.
    pub fn revoke(&self, namespace: &Namespace, kid: &Kid) -> bool {
        self.set_status(namespace, kid, SignerStatus::Revoked)
    }

    /// Mark a record retired at the given time (Unix milliseconds).
    pub fn retire(&self, namespace: &Namespace, kid: &Kid, retired_at: i64) -> bool {
        match self.write().get_mut(&(namespace.clone(), kid.clone())) {
            Some(record) => {
                record.status = SignerStatus::Retired;
                record.retired_at = Some(retired_at);
                true
            }
            None => false,
        }
    }

    /// Number of records across all namespaces.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[async_trait]
impl SignerRegistry for MemoryRegistry {
    async fn get_signer(&self, namespace: &Namespace, kid: &Kid) -> Result<Option<SignerRecord>> {
        Ok(self.read().get(&(namespace.clone(), kid.clone())).cloned())
    }
}

//! SignerRegistry trait: the read interface to signer records.

use std::sync::Arc;

use async_trait::async_trait;
use packsig_core::{Kid, Namespace, SignerRecord};

use crate::error::Result;

/// Read access to signer records.
///
/// # Design Notes
///
/// - **Read-only**: the engine never mutates records through this trait.
/// - **Snapshot reads**: each call returns the record as it is at that
///   moment. A status change after a lookup does not affect a check that
///   already completed.
/// - **Faults propagate**: `Err` means the registry could not answer.
///   A missing signer is `Ok(None)`.
#[async_trait]
pub trait SignerRegistry: Send + Sync {
    /// Look up a signer by namespace and kid.
    async fn get_signer(&self, namespace: &Namespace, kid: &Kid) -> Result<Option<SignerRecord>>;
}

#[async_trait]
impl<R: SignerRegistry + ?Sized> SignerRegistry for Arc<R> {
    async fn get_signer(&self, namespace: &Namespace, kid: &Kid) -> Result<Option<SignerRecord>> {
        (**self).get_signer(namespace, kid).await
    }
}

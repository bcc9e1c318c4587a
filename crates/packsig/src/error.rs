//! Error types for the Engine.

use packsig_core::{CoreError, Kid};
use packsig_registry::RegistryError;
use thiserror::Error;

use crate::gate::GateError;

/// Errors that abort an engine call.
///
/// Verification never returns the first four: signer problems found while
/// verifying are reported as reasons inside the result.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A requested signer has no registry record.
    #[error("unknown signer: {0}")]
    UnknownSigner(Kid),

    /// A requested signer has been revoked.
    #[error("revoked signer: {0}")]
    RevokedSigner(Kid),

    /// The capability gate refused the emission.
    #[error("policy denied: {reason}")]
    PolicyDenied { reason: String },

    /// A requested signer has no private key on record.
    #[error("signer {0} has no private key")]
    MissingPrivateKey(Kid),

    /// Registry fault.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Key material or encoding error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The capability gate could not answer.
    #[error("gate error: {0}")]
    Gate(#[from] GateError),
}

/// Result type for Engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

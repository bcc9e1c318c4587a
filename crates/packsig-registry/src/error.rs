//! Error types for the registry module.

use thiserror::Error;

/// Errors raised while reading signer records.
///
/// These are infrastructure faults. They propagate to the caller and are
/// never folded into a verification result.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored record could not be interpreted.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The backend could not be reached.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

//! Strong type definitions for packsig.
//!
//! Identifiers are newtypes so a namespace can never be passed where a
//! key identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A key identifier referencing a signer registry entry.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kid(pub String);

impl Kid {
    /// Create a new key identifier.
    pub fn new(kid: impl Into<String>) -> Self {
        Self(kid.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Kid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kid({})", self.0)
    }
}

impl fmt::Display for Kid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Kid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Kid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The namespace a pack, its signers and its audit events belong to.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(pub String);

impl Namespace {
    /// Create a new namespace.
    pub fn new(ns: impl Into<String>) -> Self {
        Self(ns.into())
    }

    /// Get the namespace as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of a signature that verified: either a registry kid or a
/// synthetic id for an embedded legacy key.
///
/// Renders as `<kid>` or `legacy:<prefix>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignerId {
    /// Resolved through the signer registry.
    Kid(Kid),
    /// Embedded public key, identified by a prefix of its base64 encoding.
    Legacy(String),
}

impl SignerId {
    /// The registry kid, if this id came from the registry path.
    pub fn kid(&self) -> Option<&Kid> {
        match self {
            SignerId::Kid(kid) => Some(kid),
            SignerId::Legacy(_) => None,
        }
    }

    /// Parse the rendered form back into an id.
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix("legacy:") {
            Some(prefix) => SignerId::Legacy(prefix.to_string()),
            None => SignerId::Kid(Kid::from(s)),
        }
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerId::Kid(kid) => write!(f, "{}", kid),
            SignerId::Legacy(prefix) => write!(f, "legacy:{}", prefix),
        }
    }
}

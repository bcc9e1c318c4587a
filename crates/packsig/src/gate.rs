//! Capability gate: the policy evaluator consulted before emission.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use packsig_core::{Kid, Namespace};

/// The gate could not reach a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct GateError(pub String);

/// What an emission is asking for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitRequest {
    pub kids: Vec<Kid>,
    pub count: usize,
}

impl EmitRequest {
    pub fn new(kids: &[Kid]) -> Self {
        Self {
            kids: kids.to_vec(),
            count: kids.len(),
        }
    }
}

/// A gate's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether a namespace may exercise a capability.
///
/// Called once per emission, before any registry lookup. A denial is an
/// answer (`Ok` with `allowed == false`); `Err` means no answer was given.
#[async_trait]
pub trait CapabilityGate: Send + Sync {
    async fn check_policy(
        &self,
        namespace: &Namespace,
        capability: &str,
        request: &EmitRequest,
    ) -> Result<PolicyDecision, GateError>;
}

#[async_trait]
impl<G: CapabilityGate + ?Sized> CapabilityGate for Arc<G> {
    async fn check_policy(
        &self,
        namespace: &Namespace,
        capability: &str,
        request: &EmitRequest,
    ) -> Result<PolicyDecision, GateError> {
        (**self).check_policy(namespace, capability, request).await
    }
}

/// Permits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl CapabilityGate for AllowAll {
    async fn check_policy(
        &self,
        _namespace: &Namespace,
        _capability: &str,
        _request: &EmitRequest,
    ) -> Result<PolicyDecision, GateError> {
        Ok(PolicyDecision::allow())
    }
}

/// Denies every capability to a fixed set of namespaces.
#[derive(Debug, Clone, Default)]
pub struct DenyNamespaces {
    denied: BTreeSet<Namespace>,
}

impl DenyNamespaces {
    pub fn new<I, N>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Namespace>,
    {
        Self {
            denied: namespaces.into_iter().map(Into::into).collect(),
        }
    }

    pub fn deny(&mut self, namespace: impl Into<Namespace>) {
        self.denied.insert(namespace.into());
    }
}

#[async_trait]
impl CapabilityGate for DenyNamespaces {
    async fn check_policy(
        &self,
        namespace: &Namespace,
        capability: &str,
        _request: &EmitRequest,
    ) -> Result<PolicyDecision, GateError> {
        if self.denied.contains(namespace) {
            Ok(PolicyDecision::deny(format!(
                "{} not granted to namespace {}",
                capability, namespace
            )))
        } else {
            Ok(PolicyDecision::allow())
        }
    }
}

//! Audit events and the sinks that receive them.
//!
//! Every successful emission and every verification (whatever its outcome)
//! produces exactly one event. Sinks are fire-and-forget: they cannot fail
//! the call that produced the event.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use packsig_core::{Kid, Namespace, Reason};

/// Emitted after an attestation is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitEvent {
    pub namespace: Namespace,
    pub kids: Vec<Kid>,
    pub count: usize,
    /// The pack's self-declared `meta.contentHash`.
    pub content_hash: String,
    /// Blake3 of the canonical bytes that were signed (hex).
    pub canonical_digest: String,
}

/// Emitted after a verification completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEvent {
    pub namespace: Namespace,
    /// Attestation format version (1 or 2).
    pub version: u8,
    pub min: u32,
    pub count: u32,
    pub ok: bool,
    pub content_hash: String,
    pub canonical_digest: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<Reason>,
}

/// An audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action")]
pub enum AuditEvent {
    #[serde(rename = "ATTEST_MULTI_EMIT")]
    Emit(EmitEvent),
    #[serde(rename = "ATTEST_MULTI_VERIFY")]
    Verify(VerifyEvent),
}

impl AuditEvent {
    /// The action name.
    pub fn action(&self) -> &'static str {
        match self {
            AuditEvent::Emit(_) => "ATTEST_MULTI_EMIT",
            AuditEvent::Verify(_) => "ATTEST_MULTI_VERIFY",
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            AuditEvent::Emit(e) => &e.namespace,
            AuditEvent::Verify(e) => &e.namespace,
        }
    }
}

/// Receives audit events.
pub trait AuditSink: Send + Sync {
    fn log(&self, event: &AuditEvent);
}

impl<A: AuditSink + ?Sized> AuditSink for Arc<A> {
    fn log(&self, event: &AuditEvent) {
        (**self).log(event)
    }
}

/// Writes events to `tracing` under the `packsig::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn log(&self, event: &AuditEvent) {
        match event {
            AuditEvent::Emit(e) => tracing::info!(
                target: "packsig::audit",
                action = event.action(),
                namespace = %e.namespace,
                kids = ?e.kids,
                count = e.count,
                content_hash = %e.content_hash,
                canonical_digest = %e.canonical_digest,
            ),
            AuditEvent::Verify(e) => {
                let reasons: Vec<String> = e.reasons.iter().map(ToString::to_string).collect();
                tracing::info!(
                    target: "packsig::audit",
                    action = event.action(),
                    namespace = %e.namespace,
                    version = e.version,
                    min = e.min,
                    count = e.count,
                    ok = e.ok,
                    content_hash = %e.content_hash,
                    canonical_digest = %e.canonical_digest,
                    reasons = ?reasons,
                )
            }
        }
    }
}

/// Keeps events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything logged so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<AuditEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn log(&self, event: &AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

/// Discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn log(&self, _event: &AuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify_event(reasons: Vec<Reason>) -> AuditEvent {
        AuditEvent::Verify(VerifyEvent {
            namespace: Namespace::from("tenant-a"),
            version: 2,
            min: 2,
            count: 1,
            ok: false,
            content_hash: "h1".into(),
            canonical_digest: "00".into(),
            reasons,
        })
    }

    #[test]
    fn test_event_wire_form() {
        let event = verify_event(vec![Reason::ThresholdNotMet { min: 2, count: 1 }]);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["action"], "ATTEST_MULTI_VERIFY");
        assert_eq!(json["namespace"], "tenant-a");
        assert_eq!(json["contentHash"], "h1");
        assert_eq!(json["reasons"][0], "threshold_not_met:min=2,count=1");
    }

    #[test]
    fn test_empty_reasons_omitted() {
        let json = serde_json::to_value(verify_event(vec![])).unwrap();
        assert!(json.get("reasons").is_none());
    }

    #[test]
    fn test_memory_sink_records_and_drains() {
        let sink = MemoryAuditSink::new();
        assert!(sink.is_empty());

        sink.log(&verify_event(vec![]));
        sink.log(&verify_event(vec![]));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[0].action(), "ATTEST_MULTI_VERIFY");

        assert_eq!(sink.take().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_shared_sink() {
        let sink = Arc::new(MemoryAuditSink::new());
        let shared: Arc<MemoryAuditSink> = Arc::clone(&sink);
        shared.log(&verify_event(vec![]));
        assert_eq!(sink.len(), 1);
    }
}

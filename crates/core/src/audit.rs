//! Best-effort audit event dispatch.
//!
//! Audit records who did what to which entity, for compliance. Emission is
//! fire-and-forget: events go onto an unbounded channel drained by an
//! external consumer, and a missing or crashed consumer never fails the
//! primary operation.

use crate::domain::EntityKind;
use chrono::{DateTime, Utc};
use std::sync::mpsc;

/// One audited operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AuditEvent {
    /// Authenticated actor identifier supplied by the calling layer.
    pub actor_id: String,
    /// Dotted action name, e.g. `admission.admit`.
    pub action: String,
    pub entity_kind: EntityKind,
    pub entity_id: i64,
    pub at: DateTime<Utc>,
}

/// Sending half of the audit channel, shared by the workflow services.
#[derive(Debug, Clone)]
pub struct AuditSink {
    tx: Option<mpsc::Sender<AuditEvent>>,
}

impl AuditSink {
    /// Creates a connected sink plus the receiver a consumer should drain.
    pub fn channel() -> (Self, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that silently discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emits an event. Never fails: if the consumer is gone the event is
    /// dropped with a warning.
    pub fn emit(&self, actor_id: &str, action: &str, entity_kind: EntityKind, entity_id: i64) {
        let Some(tx) = &self.tx else { return };
        let event = AuditEvent {
            actor_id: actor_id.to_owned(),
            action: action.to_owned(),
            entity_kind,
            entity_id,
            at: Utc::now(),
        };
        if tx.send(event).is_err() {
            tracing::warn!(action, %entity_kind, entity_id, "audit consumer gone; event dropped");
        }
    }
}

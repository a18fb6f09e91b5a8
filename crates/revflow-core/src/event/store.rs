use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{ApprovalEvent, ApprovalEventKind};
use crate::errors::CoreEngineError;

/// Append-only audit log.
pub trait AuditLog {
    /// Appends an event and returns it with `seq` and `ts` assigned.
    fn append(&mut self, subject_id: Uuid, kind: ApprovalEventKind) -> Result<ApprovalEvent, CoreEngineError>;
    /// Events of one subject, ascending `seq`.
    fn list(&self, subject_id: Uuid) -> Result<Vec<ApprovalEvent>, CoreEngineError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    inner: HashMap<Uuid, Vec<ApprovalEvent>>,
}

impl AuditLog for InMemoryAuditLog {
    fn append(&mut self, subject_id: Uuid, kind: ApprovalEventKind) -> Result<ApprovalEvent, CoreEngineError> {
        let events = self.inner.entry(subject_id).or_default();
        let ev = ApprovalEvent { seq: events.len() as u64,
                                 subject_id,
                                 kind,
                                 ts: Utc::now() };
        events.push(ev.clone());
        Ok(ev)
    }

    fn list(&self, subject_id: Uuid) -> Result<Vec<ApprovalEvent>, CoreEngineError> {
        Ok(self.inner.get(&subject_id).cloned().unwrap_or_default())
    }
}

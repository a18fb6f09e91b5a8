//! Thread-safe handle over an `ApprovalEngine`.
//!
//! Every call takes the lock for its whole read-modify-write, so concurrent
//! terminal transitions on one approval are serialized: the first wins and
//! the rest observe a non-pending approval.

use std::sync::{Arc, Mutex};

use revflow_domain::{Approval, Author, Revision, WorkflowSession};
use uuid::Uuid;

use crate::engine::ApprovalEngine;
use crate::errors::CoreEngineError;
use crate::event::{ApprovalEvent, AuditLog, InMemoryAuditLog};
use crate::repo::{ApprovalRepository, RevisionRepository};
use crate::revision::RevisionDiff;

pub struct SharedApprovalEngine<R, A, L = InMemoryAuditLog>
    where R: RevisionRepository,
          A: ApprovalRepository,
          L: AuditLog
{
    inner: Arc<Mutex<ApprovalEngine<R, A, L>>>,
}

impl<R, A, L> Clone for SharedApprovalEngine<R, A, L>
    where R: RevisionRepository,
          A: ApprovalRepository,
          L: AuditLog
{
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<R, A, L> SharedApprovalEngine<R, A, L>
    where R: RevisionRepository,
          A: ApprovalRepository,
          L: AuditLog
{
    pub fn new(engine: ApprovalEngine<R, A, L>) -> Self {
        Self { inner: Arc::new(Mutex::new(engine)) }
    }

    /// Runs `f` with exclusive access to the engine.
    pub fn with<T>(&self,
                   f: impl FnOnce(&mut ApprovalEngine<R, A, L>) -> Result<T, CoreEngineError>)
                   -> Result<T, CoreEngineError> {
        let mut guard = self.inner
                            .lock()
                            .map_err(|_| CoreEngineError::Internal("approval engine lock poisoned".into()))?;
        f(&mut guard)
    }

    pub fn submit_session(&self, session: &WorkflowSession, author: Author) -> Result<Revision, CoreEngineError> {
        self.with(|e| e.submit_session(session, author))
    }

    pub fn get_revision(&self, id: Uuid) -> Result<Revision, CoreEngineError> {
        self.with(|e| e.get_revision(id))
    }

    pub fn compare_revisions(&self, id_a: Uuid, id_b: Uuid) -> Result<RevisionDiff, CoreEngineError> {
        self.with(|e| e.compare_revisions(id_a, id_b))
    }

    pub fn request_approval(&self, revision_id: Uuid, requested_by: &str) -> Result<Approval, CoreEngineError> {
        self.with(|e| e.request_approval(revision_id, requested_by))
    }

    pub fn get_approval(&self, approval_id: Uuid) -> Result<Approval, CoreEngineError> {
        self.with(|e| e.get_approval(approval_id))
    }

    pub fn update_checklist_item(&self,
                                 approval_id: Uuid,
                                 item_id: &str,
                                 checked: bool,
                                 checked_by: Option<&str>)
                                 -> Result<Approval, CoreEngineError> {
        self.with(|e| e.update_checklist_item(approval_id, item_id, checked, checked_by))
    }

    pub fn approve(&self, approval_id: Uuid, approved_by: &str) -> Result<Approval, CoreEngineError> {
        self.with(|e| e.approve(approval_id, approved_by))
    }

    pub fn reject(&self, approval_id: Uuid, reason: &str, rejected_by: &str) -> Result<Approval, CoreEngineError> {
        self.with(|e| e.reject(approval_id, reason, rejected_by))
    }

    pub fn events_for(&self, revision_id: Uuid) -> Result<Vec<ApprovalEvent>, CoreEngineError> {
        self.with(|e| e.events_for(revision_id))
    }
}

impl<R, A, L> From<ApprovalEngine<R, A, L>> for SharedApprovalEngine<R, A, L>
    where R: RevisionRepository,
          A: ApprovalRepository,
          L: AuditLog
{
    fn from(engine: ApprovalEngine<R, A, L>) -> Self {
        Self::new(engine)
    }
}

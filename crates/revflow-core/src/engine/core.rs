//! Core `ApprovalEngine` implementation

use chrono::Utc;
use log::{info, warn};
use revflow_domain::{Approval, ApprovalGate, Author, GeneratedArtifact, Revision, RevisionStatus, ValidationResult,
                     WorkflowSession};
use uuid::Uuid;

use crate::approval;
use crate::config::EngineConfig;
use crate::engine::EngineBuilder;
use crate::errors::CoreEngineError;
use crate::event::{ApprovalEvent, ApprovalEventKind, AuditLog, InMemoryAuditLog};
use crate::gates::run_gates;
use crate::repo::{ApprovalRepository, InMemoryApprovalRepository, InMemoryRevisionRepository, RevisionRepository};
use crate::revision::{RevisionDiff, RevisionStore};
use crate::validator;

/// Revision & approval workflow engine.
///
/// Owns the revision store, the approval repository and the audit log. All
/// mutation goes through `&mut self`, so one engine value is one writer; use
/// `SharedApprovalEngine` to serialize access from several threads.
#[derive(Debug)]
pub struct ApprovalEngine<R, A, L = InMemoryAuditLog>
    where R: RevisionRepository,
          A: ApprovalRepository,
          L: AuditLog
{
    revisions: RevisionStore<R>,
    approvals: A,
    audit: L,
    config: EngineConfig,
}

impl ApprovalEngine<InMemoryRevisionRepository, InMemoryApprovalRepository> {
    /// Engine over in-memory repositories and audit log.
    pub fn in_memory() -> Self {
        EngineBuilder::new(InMemoryRevisionRepository::new(), InMemoryApprovalRepository::new()).build()
    }
}

impl<R, A> ApprovalEngine<R, A, InMemoryAuditLog>
    where R: RevisionRepository,
          A: ApprovalRepository
{
    #[inline]
    pub fn builder(revisions: R, approvals: A) -> EngineBuilder<R, A, InMemoryAuditLog> {
        EngineBuilder::new(revisions, approvals)
    }
}

impl<R, A, L> ApprovalEngine<R, A, L>
    where R: RevisionRepository,
          A: ApprovalRepository,
          L: AuditLog
{
    pub fn new_with_stores(revisions: R, approvals: A, audit: L, config: EngineConfig) -> Self {
        Self { revisions: RevisionStore::new(revisions),
               approvals,
               audit,
               config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn revision_store(&self) -> &RevisionStore<R> {
        &self.revisions
    }

    pub fn approval_repository(&self) -> &A {
        &self.approvals
    }

    pub fn audit_log(&self) -> &L {
        &self.audit
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    pub fn validate_artifact(&self, artifact: &GeneratedArtifact) -> ValidationResult {
        validator::validate(artifact)
    }

    pub fn validate_session(&self, session: &WorkflowSession) -> Vec<ValidationResult> {
        if self.config.parallel_validation {
            validator::validate_all(&session.artifacts)
        } else {
            validator::validate_all_sequential(&session.artifacts)
        }
    }

    // ------------------------------------------------------------------
    // Revisions
    // ------------------------------------------------------------------

    /// Creates a draft revision from already computed validation results.
    pub fn create_revision(&mut self,
                           session: &WorkflowSession,
                           author: Author,
                           validation_results: Vec<ValidationResult>)
                           -> Result<Revision, CoreEngineError> {
        let revision = self.revisions.create(session, author, validation_results)?;
        self.record(revision.id,
                    ApprovalEventKind::RevisionCreated { workflow_id: revision.workflow_id.clone(),
                                                         session_id: revision.session_id.clone(),
                                                         author: revision.author.to_string(),
                                                         fingerprint: revision.fingerprint.clone(),
                                                         output_count: revision.outputs.len() });
        Ok(revision)
    }

    /// Validates every artifact of `session` and snapshots it.
    pub fn submit_session(&mut self, session: &WorkflowSession, author: Author) -> Result<Revision, CoreEngineError> {
        let results = self.validate_session(session);
        self.create_revision(session, author, results)
    }

    pub fn get_revision(&self, id: Uuid) -> Result<Revision, CoreEngineError> {
        self.revisions.get(id)
    }

    pub fn list_revisions(&self) -> Result<Vec<Revision>, CoreEngineError> {
        self.revisions.list()
    }

    pub fn list_revisions_for(&self, workflow_id: &str) -> Result<Vec<Revision>, CoreEngineError> {
        self.revisions.list_by_workflow(workflow_id)
    }

    pub fn compare_revisions(&self, id_a: Uuid, id_b: Uuid) -> Result<RevisionDiff, CoreEngineError> {
        self.revisions.compare(id_a, id_b)
    }

    /// Gates the revision would get if approval were requested now.
    pub fn preview_gates(&self, revision_id: Uuid) -> Result<Vec<ApprovalGate>, CoreEngineError> {
        Ok(run_gates(&self.revisions.get(revision_id)?))
    }

    // ------------------------------------------------------------------
    // Approvals
    // ------------------------------------------------------------------

    /// Opens a `pending` approval for a draft revision and moves the revision
    /// to `pending_approval`.
    pub fn request_approval(&mut self, revision_id: Uuid, requested_by: &str) -> Result<Approval, CoreEngineError> {
        let revision = self.revisions.get(revision_id)?;
        if revision.status != RevisionStatus::Draft {
            return Err(CoreEngineError::InvalidRevisionState { revision_id,
                                                               status: revision.status });
        }
        let approval = approval::new_approval(&revision, requested_by, &self.config.system_actor, Utc::now());

        // Written from the draft value checked above; a concurrent request
        // that got there first makes this a version conflict.
        let written = self.revisions.transition(&revision, RevisionStatus::PendingApproval, Some(approval.id))?;
        if let Err(e) = self.approvals.insert(approval.clone()) {
            self.compensate(&written, revision);
            return Err(e);
        }

        let failing_gates: Vec<String> = approval.gates.iter().filter(|g| g.is_blocking()).map(|g| g.id.clone()).collect();
        info!("approval requested revision={revision_id} approval={} by={requested_by} failing_gates={:?}",
              approval.id,
              failing_gates);
        self.record(revision_id,
                    ApprovalEventKind::ApprovalRequested { approval_id: approval.id,
                                                           requested_by: requested_by.to_string(),
                                                           failing_gates });
        Ok(approval)
    }

    pub fn get_approval(&self, approval_id: Uuid) -> Result<Approval, CoreEngineError> {
        self.approvals.get(approval_id)?.ok_or(CoreEngineError::ApprovalNotFound(approval_id))
    }

    /// Current or most recent approval of a revision.
    pub fn approval_for_revision(&self, revision_id: Uuid) -> Result<Option<Approval>, CoreEngineError> {
        let revision = self.revisions.get(revision_id)?;
        match revision.approval_id {
            Some(id) => self.approvals.get(id),
            None => Ok(None),
        }
    }

    pub fn update_checklist_item(&mut self,
                                 approval_id: Uuid,
                                 item_id: &str,
                                 checked: bool,
                                 checked_by: Option<&str>)
                                 -> Result<Approval, CoreEngineError> {
        let mut approval = self.get_approval(approval_id)?;
        approval::set_checklist_item(&mut approval, item_id, checked, checked_by, Utc::now())?;
        self.approvals.save(approval.clone())?;
        self.record(approval.revision_id,
                    ApprovalEventKind::ChecklistItemUpdated { approval_id,
                                                              item_id: item_id.to_string(),
                                                              checked,
                                                              checked_by: checked_by.map(str::to_string) });
        Ok(approval)
    }

    /// Approves when every required item is checked and every required gate
    /// passes; otherwise fails with `PreconditionFailed` and changes nothing.
    pub fn approve(&mut self, approval_id: Uuid, approved_by: &str) -> Result<Approval, CoreEngineError> {
        let mut approval = self.get_approval(approval_id)?;
        if let Err(e) = approval::approve(&mut approval, approved_by, Utc::now()) {
            warn!("approve refused approval={approval_id} by={approved_by}: {e}");
            return Err(e);
        }
        self.finish(&approval, RevisionStatus::Approved)?;
        info!("revision approved revision={} approval={approval_id} by={approved_by}",
              approval.revision_id);
        self.record(approval.revision_id,
                    ApprovalEventKind::RevisionApproved { approval_id,
                                                          approved_by: approved_by.to_string() });
        Ok(approval)
    }

    /// Rejects a pending approval; no checklist or gate preconditions.
    pub fn reject(&mut self, approval_id: Uuid, reason: &str, rejected_by: &str) -> Result<Approval, CoreEngineError> {
        let mut approval = self.get_approval(approval_id)?;
        approval::reject(&mut approval, reason, rejected_by, Utc::now())?;
        self.finish(&approval, RevisionStatus::Rejected)?;
        info!("revision rejected revision={} approval={approval_id} by={rejected_by}",
              approval.revision_id);
        self.record(approval.revision_id,
                    ApprovalEventKind::RevisionRejected { approval_id,
                                                          rejected_by: rejected_by.to_string(),
                                                          reason: reason.to_string() });
        Ok(approval)
    }

    /// Audit trail of a revision, oldest first.
    pub fn events_for(&self, revision_id: Uuid) -> Result<Vec<ApprovalEvent>, CoreEngineError> {
        self.audit.list(revision_id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Persists a terminal approval together with its revision status.
    ///
    /// The revision must still be `pending_approval` on this approval. It is
    /// written first, as a compare-and-swap on the value just checked, so of
    /// two writers finishing the same approval only one gets past this step.
    /// The approval save is then a compare-and-swap on the approval version;
    /// if it fails the revision is put back as it was.
    fn finish(&mut self, approval: &Approval, status: RevisionStatus) -> Result<(), CoreEngineError> {
        let revision = self.revisions.get(approval.revision_id)?;
        if revision.status != RevisionStatus::PendingApproval || revision.approval_id != Some(approval.id) {
            return Err(CoreEngineError::InvalidRevisionState { revision_id: revision.id,
                                                               status: revision.status });
        }
        let written = self.revisions.transition(&revision, status, Some(approval.id))?;
        if let Err(e) = self.approvals.save(approval.clone()) {
            self.compensate(&written, revision);
            return Err(e);
        }
        Ok(())
    }

    /// Undoes `written` unless another writer already moved past it.
    fn compensate(&mut self, written: &Revision, snapshot: Revision) {
        let (id, status) = (snapshot.id, snapshot.status);
        if let Err(e) = self.revisions.restore(written, snapshot) {
            warn!("could not restore revision={id} to {status}: {e}");
        }
    }

    /// Appends to the audit log. The entity write already happened, so a
    /// failing log is reported but does not fail the operation.
    fn record(&mut self, subject_id: Uuid, kind: ApprovalEventKind) {
        let name = kind.name();
        if let Err(e) = self.audit.append(subject_id, kind) {
            warn!("audit append failed subject={subject_id} event={name}: {e}");
        }
    }
}

//! Revision Store: creates, retrieves, lists and compares revisions on top of
//! an injected `RevisionRepository`.
//!
//! The store does not validate artifacts (callers pass results computed by
//! `validator`) and does not police status transitions; the approval state
//! machine owns that invariant.
pub mod diff;

pub use diff::{diff_outputs, outputs_fingerprint, ModifiedArtifact, RevisionDiff};

use chrono::Utc;
use log::{debug, info};
use revflow_domain::{Author, Revision, RevisionStatus, ValidationResult, WorkflowSession};
use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::repo::RevisionRepository;

#[derive(Debug)]
pub struct RevisionStore<R: RevisionRepository> {
    repository: R,
}

impl<R: RevisionRepository> RevisionStore<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Snapshots a finished session as a new `draft` revision.
    pub fn create(&mut self,
                  session: &WorkflowSession,
                  author: Author,
                  validation_results: Vec<ValidationResult>)
                  -> Result<Revision, CoreEngineError> {
        let revision = Revision { id: Uuid::new_v4(),
                                  workflow_id: session.workflow_id.clone(),
                                  session_id: session.id.clone(),
                                  created_at: Utc::now(),
                                  author,
                                  inputs: session.data.clone(),
                                  outputs: session.artifacts.clone(),
                                  validation_results,
                                  status: RevisionStatus::Draft,
                                  approval_id: None,
                                  fingerprint: outputs_fingerprint(&session.artifacts),
                                  version: 0 };
        self.repository.insert(revision.clone())?;
        info!("revision created id={} workflow={} session={} outputs={}",
              revision.id,
              revision.workflow_id,
              revision.session_id,
              revision.outputs.len());
        Ok(revision)
    }

    pub fn get(&self, id: Uuid) -> Result<Revision, CoreEngineError> {
        self.repository.get(id)?.ok_or(CoreEngineError::RevisionNotFound(id))
    }

    /// Most recent first; equal timestamps keep insertion order.
    pub fn list(&self) -> Result<Vec<Revision>, CoreEngineError> {
        let mut all = self.repository.all()?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    pub fn list_by_workflow(&self, workflow_id: &str) -> Result<Vec<Revision>, CoreEngineError> {
        Ok(self.list()?.into_iter().filter(|r| r.workflow_id == workflow_id).collect())
    }

    /// Sets `status` (and `approval_id` when given) on the stored revision.
    /// No transition check.
    pub fn update_status(&mut self,
                         id: Uuid,
                         status: RevisionStatus,
                         approval_id: Option<Uuid>)
                         -> Result<Revision, CoreEngineError> {
        let current = self.get(id)?;
        self.transition(&current, status, approval_id)
    }

    /// Writes `status` on top of `current`, the value the caller read and
    /// checked. The write is a compare-and-swap on `current.version`: if the
    /// stored revision moved since, it fails with `VersionConflict` and
    /// nothing changes.
    pub fn transition(&mut self,
                      current: &Revision,
                      status: RevisionStatus,
                      approval_id: Option<Uuid>)
                      -> Result<Revision, CoreEngineError> {
        let mut next = current.clone();
        next.status = status;
        if approval_id.is_some() {
            next.approval_id = approval_id;
        }
        next.version = current.version + 1;
        self.repository.save(next.clone())?;
        debug!("revision status id={} {} -> {status} version={}", next.id, current.status, next.version);
        Ok(next)
    }

    /// Puts `snapshot` back over `written`, the value a failed operation
    /// stored. Refused with `VersionConflict` when another writer changed the
    /// revision after `written`.
    pub fn restore(&mut self, written: &Revision, mut snapshot: Revision) -> Result<Revision, CoreEngineError> {
        snapshot.version = written.version + 1;
        self.repository.save(snapshot.clone())?;
        debug!("revision restored id={} status={} version={}", snapshot.id, snapshot.status, snapshot.version);
        Ok(snapshot)
    }

    /// Compares two revisions' outputs. Unknown ids yield an empty diff.
    pub fn compare(&self, id_a: Uuid, id_b: Uuid) -> Result<RevisionDiff, CoreEngineError> {
        let (Some(a), Some(b)) = (self.repository.get(id_a)?, self.repository.get(id_b)?) else {
            debug!("compare with unknown revision a={id_a} b={id_b}");
            return Ok(RevisionDiff::default());
        };
        if !a.fingerprint.is_empty() && a.fingerprint == b.fingerprint {
            return Ok(RevisionDiff::default());
        }
        Ok(diff_outputs(&a.outputs, &b.outputs))
    }
}

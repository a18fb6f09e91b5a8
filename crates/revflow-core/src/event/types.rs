//! Audit event types.
//!
//! Every event is keyed by the revision it concerns (`subject_id`), so the
//! whole history of a revision, including each approval round, reads back
//! from a single list.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApprovalEventKind {
    /// First event of every revision.
    RevisionCreated {
        workflow_id: String,
        session_id: String,
        author: String,
        fingerprint: String,
        output_count: usize,
    },
    ApprovalRequested {
        approval_id: Uuid,
        requested_by: String,
        /// Ids of required gates that did not pass at request time.
        failing_gates: Vec<String>,
    },
    ChecklistItemUpdated {
        approval_id: Uuid,
        item_id: String,
        checked: bool,
        checked_by: Option<String>,
    },
    RevisionApproved { approval_id: Uuid, approved_by: String },
    RevisionRejected {
        approval_id: Uuid,
        rejected_by: String,
        reason: String,
    },
}

impl ApprovalEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            ApprovalEventKind::RevisionCreated { .. } => "revision_created",
            ApprovalEventKind::ApprovalRequested { .. } => "approval_requested",
            ApprovalEventKind::ChecklistItemUpdated { .. } => "checklist_item_updated",
            ApprovalEventKind::RevisionApproved { .. } => "revision_approved",
            ApprovalEventKind::RevisionRejected { .. } => "revision_rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEvent {
    pub seq: u64, // per subject, assigned by the log
    pub subject_id: Uuid,
    pub kind: ApprovalEventKind,
    pub ts: DateTime<Utc>,
}

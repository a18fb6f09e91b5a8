//! Revision: immutable snapshot of a session's artifacts plus their
//! validation outcome.
//!
//! Only `status`, `approval_id` and `version` change after creation, and only
//! through the approval state machine. Revisions are never deleted.
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::artifact::GeneratedArtifact;
use crate::session::Author;
use crate::validation::ValidationResult;
use crate::DomainError;

/// Lifecycle of a revision. Valid forward transitions:
/// - `Draft` -> `PendingApproval`
/// - `PendingApproval` -> `Approved`
/// - `PendingApproval` -> `Rejected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

impl RevisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionStatus::Draft => "draft",
            RevisionStatus::PendingApproval => "pending_approval",
            RevisionStatus::Approved => "approved",
            RevisionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RevisionStatus::Approved | RevisionStatus::Rejected)
    }
}

impl std::fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevisionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(RevisionStatus::Draft),
            "pending_approval" => Ok(RevisionStatus::PendingApproval),
            "approved" => Ok(RevisionStatus::Approved),
            "rejected" => Ok(RevisionStatus::Rejected),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: Uuid,
    pub workflow_id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    /// Step inputs keyed by step id, copied verbatim from the session.
    pub inputs: Map<String, Value>,
    pub outputs: Vec<GeneratedArtifact>,
    pub validation_results: Vec<ValidationResult>,
    pub status: RevisionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_id: Option<Uuid>,
    /// Content hash of the path-keyed outputs (assigned by the store).
    #[serde(default)]
    pub fingerprint: String,
    /// Mutation counter, +1 per status update.
    #[serde(default)]
    pub version: u64,
}

impl Revision {
    pub fn is_valid(&self) -> bool {
        self.validation_results.iter().all(|r| r.valid)
    }

    pub fn artifact_by_path(&self, path: &str) -> Option<&GeneratedArtifact> {
        self.outputs.iter().rev().find(|a| a.path == path)
    }
}

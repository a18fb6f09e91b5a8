//! Engine error type.
//!
//! Every mutating operation returns `Result<_, CoreEngineError>`; not-found
//! lookups, precondition violations and storage failures share this one
//! type so callers handle a single convention. Validation problems are never
//! errors (see `validator`).

use revflow_domain::{ApprovalStatus, RevisionStatus};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CoreEngineError {
    #[error("revision not found: {0}")]
    RevisionNotFound(Uuid),
    #[error("approval not found: {0}")]
    ApprovalNotFound(Uuid),
    #[error("checklist item '{item_id}' not found in approval {approval_id}")]
    ChecklistItemNotFound { approval_id: Uuid, item_id: String },
    #[error("cannot approve: {} required checklist items unchecked, {} required gates not passing", .unchecked_items.len(), .failing_gates.len())]
    PreconditionFailed {
        unchecked_items: Vec<String>,
        failing_gates: Vec<String>,
    },
    #[error("approval {approval_id} is {status}, not pending")]
    ApprovalNotPending { approval_id: Uuid, status: ApprovalStatus },
    #[error("revision {revision_id} is {status}; approval can only be requested for a draft revision")]
    InvalidRevisionState { revision_id: Uuid, status: RevisionStatus },
    #[error("version conflict on {entity} {id}: stored version {stored}, write based on {based_on}")]
    VersionConflict {
        entity: String,
        id: Uuid,
        stored: u64,
        based_on: u64,
    },
    #[error("duplicate {entity} id: {id}")]
    Duplicate { entity: String, id: Uuid },
    #[error("storage: {0}")]
    Storage(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Coarse classification used by callers to pick a reaction (CLI exit code,
/// HTTP status, retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Unknown id; recoverable by the caller.
    NotFound,
    /// Caller logic error; do not retry without changing state.
    Precondition,
    /// Lost a race with another writer; re-read and retry.
    Conflict,
    /// Backend failure.
    Storage,
}

pub fn classify_error(e: &CoreEngineError) -> ErrorClass {
    match e {
        CoreEngineError::RevisionNotFound(_)
        | CoreEngineError::ApprovalNotFound(_)
        | CoreEngineError::ChecklistItemNotFound { .. } => ErrorClass::NotFound,
        CoreEngineError::PreconditionFailed { .. }
        | CoreEngineError::ApprovalNotPending { .. }
        | CoreEngineError::InvalidRevisionState { .. } => ErrorClass::Precondition,
        CoreEngineError::VersionConflict { .. } | CoreEngineError::Duplicate { .. } => ErrorClass::Conflict,
        CoreEngineError::Storage(_) | CoreEngineError::Internal(_) => ErrorClass::Storage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_message_counts_blockers() {
        let e = CoreEngineError::PreconditionFailed { unchecked_items: vec!["a".into(), "b".into()],
                                                      failing_gates: vec!["g".into()] };
        assert_eq!(e.to_string(),
                   "cannot approve: 2 required checklist items unchecked, 1 required gates not passing");
        assert_eq!(classify_error(&e), ErrorClass::Precondition);
    }

    #[test]
    fn not_found_class() {
        assert_eq!(classify_error(&CoreEngineError::ApprovalNotFound(Uuid::nil())), ErrorClass::NotFound);
        assert_eq!(classify_error(&CoreEngineError::Storage("io".into())), ErrorClass::Storage);
    }
}

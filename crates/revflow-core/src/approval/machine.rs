//! State machine over `Approval`.
//!
//! Every function mutates the approval it is given only after all checks
//! pass; on error the value is untouched. The engine works on a copy and
//! persists it only on success, so a refused transition leaves no trace.
use chrono::{DateTime, Utc};
use revflow_domain::{Approval, ApprovalStatus, Revision};
use uuid::Uuid;

use super::build_checklist;
use crate::errors::CoreEngineError;
use crate::gates::run_gates;

/// Fresh `Pending` approval for `revision`: gates evaluated now, checklist
/// seeded from them.
pub fn new_approval(revision: &Revision, requested_by: &str, system_actor: &str, now: DateTime<Utc>) -> Approval {
    let gates = run_gates(revision);
    let checklist = build_checklist(revision, &gates, system_actor, now);
    Approval { id: Uuid::new_v4(),
               revision_id: revision.id,
               requested_at: now,
               requested_by: requested_by.to_string(),
               status: ApprovalStatus::Pending,
               checklist,
               gates,
               approved_at: None,
               approved_by: None,
               rejection_reason: None,
               rejected_at: None,
               rejected_by: None,
               version: 0 }
}

fn ensure_pending(approval: &Approval) -> Result<(), CoreEngineError> {
    if approval.status != ApprovalStatus::Pending {
        return Err(CoreEngineError::ApprovalNotPending { approval_id: approval.id,
                                                         status: approval.status });
    }
    Ok(())
}

/// Checks or unchecks one item. Unchecking clears who/when.
pub fn set_checklist_item(approval: &mut Approval,
                          item_id: &str,
                          checked: bool,
                          checked_by: Option<&str>,
                          now: DateTime<Utc>)
                          -> Result<(), CoreEngineError> {
    let approval_id = approval.id;
    let pending = ensure_pending(approval);
    let item = approval.item_mut(item_id)
                       .ok_or_else(|| CoreEngineError::ChecklistItemNotFound { approval_id,
                                                                               item_id: item_id.to_string() })?;
    pending?;
    item.checked = checked;
    if checked {
        item.checked_by = checked_by.map(str::to_string);
        item.checked_at = Some(now);
    } else {
        item.checked_by = None;
        item.checked_at = None;
    }
    approval.version += 1;
    Ok(())
}

pub fn approve(approval: &mut Approval, approved_by: &str, now: DateTime<Utc>) -> Result<(), CoreEngineError> {
    ensure_pending(approval)?;
    let unchecked_items = approval.unchecked_required_items();
    let failing_gates = approval.failing_required_gates();
    if !unchecked_items.is_empty() || !failing_gates.is_empty() {
        return Err(CoreEngineError::PreconditionFailed { unchecked_items,
                                                         failing_gates });
    }
    approval.status = ApprovalStatus::Approved;
    approval.approved_at = Some(now);
    approval.approved_by = Some(approved_by.to_string());
    approval.version += 1;
    Ok(())
}

pub fn reject(approval: &mut Approval, reason: &str, rejected_by: &str, now: DateTime<Utc>) -> Result<(), CoreEngineError> {
    ensure_pending(approval)?;
    approval.status = ApprovalStatus::Rejected;
    approval.rejection_reason = Some(reason.to_string());
    approval.rejected_by = Some(rejected_by.to_string());
    approval.rejected_at = Some(now);
    approval.version += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ITEM_ACCESSIBILITY_REVIEWED;
    use revflow_domain::{Author, GeneratedArtifact, RevisionStatus, ValidationResult};
    use serde_json::Map;

    fn revision(paths: &[&str]) -> Revision {
        Revision { id: Uuid::new_v4(),
                   workflow_id: "wf".into(),
                   session_id: "s".into(),
                   created_at: Utc::now(),
                   author: Author::new("Ada", "ada@example.com").unwrap(),
                   inputs: Map::new(),
                   outputs: paths.iter().map(|p| GeneratedArtifact::new(*p, "json", *p).with_content("{}")).collect(),
                   validation_results: paths.iter().map(|p| ValidationResult::new(*p, *p, "json", vec![], vec![])).collect(),
                   status: RevisionStatus::Draft,
                   approval_id: None,
                   fingerprint: String::new(),
                   version: 0 }
    }

    fn ready() -> Approval {
        new_approval(&revision(&["COMPOSE_W.json", "TESTIDS_w.json"]), "ada", "system", Utc::now())
    }

    #[test]
    fn approve_requires_manual_items() {
        let mut a = ready();
        let before = a.clone();
        let err = approve(&mut a, "lead", Utc::now()).unwrap_err();
        assert_eq!(err,
                   CoreEngineError::PreconditionFailed { unchecked_items: vec!["Accessibility review completed".into()],
                                                         failing_gates: vec![] });
        assert_eq!(a, before);

        set_checklist_item(&mut a, ITEM_ACCESSIBILITY_REVIEWED, true, Some("qa"), Utc::now()).unwrap();
        approve(&mut a, "lead", Utc::now()).unwrap();
        assert_eq!(a.status, ApprovalStatus::Approved);
        assert_eq!(a.approved_by.as_deref(), Some("lead"));
        assert_eq!(a.version, 2);
    }

    #[test]
    fn terminal_states_refuse_everything() {
        let mut a = ready();
        reject(&mut a, "wrong tokens", "lead", Utc::now()).unwrap();
        let frozen = a.clone();
        let pending_err = CoreEngineError::ApprovalNotPending { approval_id: a.id,
                                                                status: ApprovalStatus::Rejected };
        assert_eq!(approve(&mut a, "lead", Utc::now()), Err(pending_err.clone()));
        assert_eq!(reject(&mut a, "again", "lead", Utc::now()), Err(pending_err.clone()));
        assert_eq!(set_checklist_item(&mut a, ITEM_ACCESSIBILITY_REVIEWED, true, None, Utc::now()),
                   Err(pending_err));
        assert_eq!(a, frozen);
    }

    #[test]
    fn unknown_item_wins_over_state_error() {
        let mut a = ready();
        reject(&mut a, "x", "lead", Utc::now()).unwrap();
        let err = set_checklist_item(&mut a, "nope", true, None, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreEngineError::ChecklistItemNotFound { .. }));
    }

    #[test]
    fn unchecking_clears_attribution() {
        let mut a = ready();
        set_checklist_item(&mut a, ITEM_ACCESSIBILITY_REVIEWED, true, Some("qa"), Utc::now()).unwrap();
        set_checklist_item(&mut a, ITEM_ACCESSIBILITY_REVIEWED, false, Some("qa"), Utc::now()).unwrap();
        let item = a.checklist.iter().find(|i| i.id == ITEM_ACCESSIBILITY_REVIEWED).unwrap();
        assert!(!item.checked && item.checked_by.is_none() && item.checked_at.is_none());
    }
}

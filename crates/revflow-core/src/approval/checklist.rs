//! Checklist seeded when an approval is requested.
use chrono::{DateTime, Utc};
use revflow_domain::naming::{is_component_spec_path, is_testids_path};
use revflow_domain::{ApprovalChecklistItem, ApprovalGate, GateStatus, Revision};

use crate::constants::{GATE_ARTIFACTS_PRESENT, GATE_SCHEMA_VALIDATION, ITEM_ACCESSIBILITY_REVIEWED,
                       ITEM_ARTIFACTS_GENERATED, ITEM_COMPONENT_SPEC_PRESENT, ITEM_DOCS_UPDATED,
                       ITEM_SCHEMAS_VALIDATED, ITEM_TESTIDS_DEFINED};

/// Builds the checklist for `revision`. Items whose requirement is already
/// evidenced by a gate result or by an artifact path are pre-checked on
/// behalf of `system_actor`; review items always start unchecked.
pub fn build_checklist(revision: &Revision,
                       gates: &[ApprovalGate],
                       system_actor: &str,
                       now: DateTime<Utc>)
                       -> Vec<ApprovalChecklistItem> {
    let gate_passed = |id: &str| gates.iter().any(|g| g.id == id && g.status == GateStatus::Pass);
    let has_path = |pred: fn(&str) -> bool| revision.outputs.iter().any(|a| pred(&a.path));

    let item = |id: &str, label: &str, required: bool, pre_checked: bool| ApprovalChecklistItem {
        id: id.to_string(),
        label: label.to_string(),
        checked: pre_checked,
        required,
        checked_by: pre_checked.then(|| system_actor.to_string()),
        checked_at: pre_checked.then_some(now),
    };

    vec![item(ITEM_SCHEMAS_VALIDATED,
              "All artifacts pass schema validation",
              true,
              gate_passed(GATE_SCHEMA_VALIDATION)),
         item(ITEM_ARTIFACTS_GENERATED, "Artifacts generated", true, gate_passed(GATE_ARTIFACTS_PRESENT)),
         item(ITEM_COMPONENT_SPEC_PRESENT,
              "Component specification present",
              true,
              has_path(is_component_spec_path)),
         item(ITEM_TESTIDS_DEFINED, "Test IDs defined", true, has_path(is_testids_path)),
         item(ITEM_ACCESSIBILITY_REVIEWED, "Accessibility review completed", true, false),
         item(ITEM_DOCS_UPDATED, "Documentation updated", false, false)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::run_gates;
    use revflow_domain::{Author, GeneratedArtifact, RevisionStatus, ValidationResult};
    use serde_json::Map;
    use uuid::Uuid;

    fn revision(paths: &[&str]) -> Revision {
        let outputs: Vec<GeneratedArtifact> =
            paths.iter().map(|p| GeneratedArtifact::new(*p, "json", *p).with_content("{}")).collect();
        let results = paths.iter().map(|p| ValidationResult::new(*p, *p, "json", vec![], vec![])).collect();
        Revision { id: Uuid::new_v4(),
                   workflow_id: "wf".into(),
                   session_id: "s".into(),
                   created_at: Utc::now(),
                   author: Author::new("Ada", "ada@example.com").unwrap(),
                   inputs: Map::new(),
                   outputs,
                   validation_results: results,
                   status: RevisionStatus::Draft,
                   approval_id: None,
                   fingerprint: String::new(),
                   version: 0 }
    }

    fn checked(items: &[ApprovalChecklistItem]) -> Vec<&str> {
        items.iter().filter(|i| i.checked).map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn full_revision_prechecks_automatic_items_only() {
        let rev = revision(&["out/COMPOSE_W.json", "out/TESTIDS_w.json"]);
        let items = build_checklist(&rev, &run_gates(&rev), "bot", Utc::now());
        assert_eq!(checked(&items),
                   vec![ITEM_SCHEMAS_VALIDATED, ITEM_ARTIFACTS_GENERATED, ITEM_COMPONENT_SPEC_PRESENT, ITEM_TESTIDS_DEFINED]);
        let a11y = items.iter().find(|i| i.id == ITEM_ACCESSIBILITY_REVIEWED).unwrap();
        assert!(a11y.required && !a11y.checked && a11y.checked_by.is_none());
        assert!(items.iter().filter(|i| i.checked).all(|i| i.checked_by.as_deref() == Some("bot")));
    }

    #[test]
    fn empty_revision_only_schema_item_is_prechecked() {
        let rev = revision(&[]);
        let items = build_checklist(&rev, &run_gates(&rev), "bot", Utc::now());
        assert_eq!(checked(&items), vec![ITEM_SCHEMAS_VALIDATED]);
        assert_eq!(items.len(), 6);
        assert_eq!(items.iter().filter(|i| !i.required).count(), 1);
    }
}

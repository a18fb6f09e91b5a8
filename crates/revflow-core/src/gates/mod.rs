//! Approval gates: four automated checks derived from a revision.
//!
//! Always the same four gates, in this order, all required:
//! 1. `schema-validation`: every validation result is valid.
//! 2. `artifacts-present`: the revision has outputs.
//! 3. `no-critical-errors`: the summed error count is zero. Computed from the
//!    raw error lists, not from gate 1.
//! 4. `component-spec`: some output carries the `SECTION_` or `COMPOSE_`
//!    marker.
use revflow_domain::naming::is_component_spec_path;
use revflow_domain::{ApprovalGate, GateStatus, Revision};

use crate::constants::{GATE_ARTIFACTS_PRESENT, GATE_COMPONENT_SPEC, GATE_NO_CRITICAL_ERRORS, GATE_SCHEMA_VALIDATION};

pub fn run_gates(revision: &Revision) -> Vec<ApprovalGate> {
    vec![schema_validation(revision),
         artifacts_present(revision),
         no_critical_errors(revision),
         component_spec(revision)]
}

fn gate(id: &str, name: &str, description: &str, pass: bool, details: String) -> ApprovalGate {
    ApprovalGate { id: id.to_string(),
                   name: name.to_string(),
                   description: description.to_string(),
                   status: GateStatus::from_bool(pass),
                   required: true,
                   details: Some(details) }
}

fn schema_validation(revision: &Revision) -> ApprovalGate {
    let total = revision.validation_results.len();
    let failing = revision.validation_results.iter().filter(|r| !r.valid).count();
    let details = if failing == 0 {
        format!("all {total} artifacts passed schema validation")
    } else {
        format!("{failing} of {total} artifacts failed schema validation")
    };
    gate(GATE_SCHEMA_VALIDATION,
         "Schema Validation",
         "All artifacts pass their schema validation",
         failing == 0,
         details)
}

fn artifacts_present(revision: &Revision) -> ApprovalGate {
    let count = revision.outputs.len();
    let details = if count == 0 {
        "no artifacts generated".to_string()
    } else {
        format!("{count} artifacts generated")
    };
    gate(GATE_ARTIFACTS_PRESENT,
         "Artifacts Present",
         "The revision contains at least one generated artifact",
         count > 0,
         details)
}

fn no_critical_errors(revision: &Revision) -> ApprovalGate {
    let errors: usize = revision.validation_results.iter().map(|r| r.errors.len()).sum();
    gate(GATE_NO_CRITICAL_ERRORS,
         "No Critical Errors",
         "No validation errors across all artifacts",
         errors == 0,
         format!("{errors} validation errors"))
}

fn component_spec(revision: &Revision) -> ApprovalGate {
    let found = revision.outputs.iter().find(|a| is_component_spec_path(&a.path));
    let details = match found {
        Some(a) => format!("component spec found at {}", a.path),
        None => "no SECTION_ or COMPOSE_ artifact found".to_string(),
    };
    gate(GATE_COMPONENT_SPEC,
         "Component Spec",
         "A section or compose specification artifact is present",
         found.is_some(),
         details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use revflow_domain::{Author, GeneratedArtifact, RevisionStatus, ValidationError, ValidationResult};
    use serde_json::Map;
    use uuid::Uuid;

    fn revision(outputs: Vec<GeneratedArtifact>, results: Vec<ValidationResult>) -> Revision {
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

    fn statuses(gates: &[ApprovalGate]) -> Vec<(&str, GateStatus)> {
        gates.iter().map(|g| (g.id.as_str(), g.status)).collect()
    }

    #[test]
    fn four_required_gates_in_fixed_order() {
        let gates = run_gates(&revision(vec![], vec![]));
        assert_eq!(statuses(&gates),
                   vec![(GATE_SCHEMA_VALIDATION, GateStatus::Pass),
                        (GATE_ARTIFACTS_PRESENT, GateStatus::Fail),
                        (GATE_NO_CRITICAL_ERRORS, GateStatus::Pass),
                        (GATE_COMPONENT_SPEC, GateStatus::Fail)]);
        assert!(gates.iter().all(|g| g.required));
    }

    #[test]
    fn everything_passes_for_a_clean_compose_revision() {
        let art = GeneratedArtifact::new("a", "json", "out/COMPOSE_W.json").with_content("{}");
        let ok = ValidationResult::new("a", "out/COMPOSE_W.json", "compose", vec![], vec![]);
        let gates = run_gates(&revision(vec![art], vec![ok]));
        assert!(gates.iter().all(|g| g.status == GateStatus::Pass));
    }

    #[test]
    fn schema_gate_reports_failing_count() {
        let err = ValidationError::new("", "INVALID_JSON", "x");
        let results = vec![ValidationResult::new("a", "a", "json", vec![err.clone(), err], vec![]),
                           ValidationResult::new("b", "b", "json", vec![], vec![])];
        let gates = run_gates(&revision(vec![], results));
        assert_eq!(gates[0].status, GateStatus::Fail);
        assert_eq!(gates[0].details.as_deref(), Some("1 of 2 artifacts failed schema validation"));
        assert_eq!(gates[2].details.as_deref(), Some("2 validation errors"));
    }

    #[test]
    fn error_count_gate_is_independent_of_valid_flag() {
        // A hand-built result whose flag disagrees with its error list.
        let mut inconsistent = ValidationResult::new("a", "a", "json", vec![], vec![]);
        inconsistent.errors.push(ValidationError::new("", "X", "x"));
        let gates = run_gates(&revision(vec![], vec![inconsistent]));
        assert_eq!(gates[0].status, GateStatus::Pass);
        assert_eq!(gates[2].status, GateStatus::Fail);
    }
}

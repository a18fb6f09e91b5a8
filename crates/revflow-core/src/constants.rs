//! Engine constants: gate and checklist identifiers plus defaults.
//!
//! Gate and checklist ids are part of the persisted shape of an `Approval`;
//! renaming one orphans stored approvals.

/// Logical engine version, mixed into revision fingerprints so a change in
/// fingerprint layout never collides with older values.
pub const ENGINE_VERSION: &str = "R1.0";

/// Actor recorded on checklist items pre-checked by the engine.
pub const DEFAULT_SYSTEM_ACTOR: &str = "system";

pub const GATE_SCHEMA_VALIDATION: &str = "schema-validation";
pub const GATE_ARTIFACTS_PRESENT: &str = "artifacts-present";
pub const GATE_NO_CRITICAL_ERRORS: &str = "no-critical-errors";
pub const GATE_COMPONENT_SPEC: &str = "component-spec";

pub const ITEM_SCHEMAS_VALIDATED: &str = "schemas-validated";
pub const ITEM_ARTIFACTS_GENERATED: &str = "artifacts-generated";
pub const ITEM_COMPONENT_SPEC_PRESENT: &str = "component-spec-present";
pub const ITEM_TESTIDS_DEFINED: &str = "testids-defined";
pub const ITEM_ACCESSIBILITY_REVIEWED: &str = "accessibility-reviewed";
pub const ITEM_DOCS_UPDATED: &str = "docs-updated";

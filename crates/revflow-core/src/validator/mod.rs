//! Artifact schema validator.
//!
//! `validate` is a pure function of the artifact: the schema is detected from
//! `path` (see `revflow_domain::naming`) and the content is checked against
//! it. Problems are always returned as data; nothing here fails or panics on
//! bad input.
//!
//! Rules per detected schema:
//! - empty/missing content: a single `EMPTY_CONTENT` error, nothing else.
//! - `compose`: see [`compose`].
//! - `testids`: see [`testids`].
//! - `json`: content must parse.
//! - `section` / `markdown` / `unknown`: see [`text`].

pub mod compose;
pub mod testids;
pub mod text;

use log::debug;
use rayon::prelude::*;
use revflow_domain::validation::codes;
use revflow_domain::{GeneratedArtifact, SchemaKind, ValidationError, ValidationResult, ValidationWarning};
use serde_json::Value;

/// Findings accumulated by a schema check.
#[derive(Debug, Default)]
pub struct Findings {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl Findings {
    pub fn error(&mut self, e: ValidationError) {
        self.errors.push(e);
    }

    pub fn warning(&mut self, w: ValidationWarning) {
        self.warnings.push(w);
    }
}

pub fn validate(artifact: &GeneratedArtifact) -> ValidationResult {
    let kind = artifact.schema_kind();
    let Some(content) = artifact.non_empty_content() else {
        let err = ValidationError::new("", codes::EMPTY_CONTENT, "artifact has no content")
            .with_fix("Regenerate the artifact; the producing step emitted an empty file");
        return ValidationResult::new(&artifact.id, &artifact.path, kind.as_str(), vec![err], vec![]);
    };

    let mut findings = Findings::default();
    match kind {
        SchemaKind::Compose => compose::check(content, &mut findings),
        SchemaKind::TestIds => testids::check(content, &mut findings),
        SchemaKind::Json => {
            let _ = parse_json(content, &mut findings);
        }
        SchemaKind::Section => text::check_section(content, &mut findings),
        SchemaKind::Markdown => {}
        SchemaKind::Unknown => text::check_unknown(content, &mut findings),
    }
    debug!("validate path={} schema={} errors={} warnings={}",
           artifact.path,
           kind,
           findings.errors.len(),
           findings.warnings.len());
    ValidationResult::new(&artifact.id, &artifact.path, kind.as_str(), findings.errors, findings.warnings)
}

/// Validates every artifact of a session. Output order matches input order.
pub fn validate_all(artifacts: &[GeneratedArtifact]) -> Vec<ValidationResult> {
    artifacts.par_iter().map(validate).collect()
}

/// Sequential variant of [`validate_all`].
pub fn validate_all_sequential(artifacts: &[GeneratedArtifact]) -> Vec<ValidationResult> {
    artifacts.iter().map(validate).collect()
}

/// Parses `content`; on failure records the single `INVALID_JSON` error and
/// returns `None`.
pub(crate) fn parse_json(content: &str, findings: &mut Findings) -> Option<Value> {
    match serde_json::from_str::<Value>(content) {
        Ok(v) => Some(v),
        Err(e) => {
            findings.error(ValidationError::new("", codes::INVALID_JSON, e.to_string())
                .with_fix("Fix the JSON syntax: check for trailing commas, unquoted keys and unbalanced brackets"));
            None
        }
    }
}

/// Appends `segment` to a JSON pointer, escaping `~` and `/`.
pub(crate) fn pointer_push(base: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    format!("{base}/{escaped}")
}

/// JSON type name used in messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(path: &str, content: Option<&str>) -> GeneratedArtifact {
        let a = GeneratedArtifact::new("a1", "file", path);
        match content {
            Some(c) => a.with_content(c),
            None => a,
        }
    }

    #[test]
    fn empty_content_short_circuits() {
        for content in [None, Some("")] {
            let r = validate(&art("out/COMPOSE_Widget.json", content));
            assert!(!r.valid);
            assert_eq!(r.errors.len(), 1);
            assert_eq!(r.errors[0].code, codes::EMPTY_CONTENT);
            assert!(r.warnings.is_empty());
            assert_eq!(r.schema, "compose");
        }
    }

    #[test]
    fn malformed_json_is_single_error_for_json_types() {
        for path in ["x/COMPOSE_A.json", "x/TESTIDS_a.json", "x/data.json"] {
            let r = validate(&art(path, Some("{\"a\": ")));
            assert_eq!(r.errors.len(), 1, "{path}");
            assert_eq!(r.errors[0].code, codes::INVALID_JSON);
            assert!(r.errors[0].suggested_fix.is_some());
            assert!(!r.errors[0].message.is_empty());
        }
    }

    #[test]
    fn plain_json_only_needs_to_parse() {
        let r = validate(&art("tokens.json", Some("[1,2,3]")));
        assert!(r.valid);
        assert_eq!(r.schema, "json");
    }

    #[test]
    fn validate_all_keeps_order() {
        let arts: Vec<GeneratedArtifact> = (0..32).map(|i| {
                                                      GeneratedArtifact::new(format!("a{i}"), "json", format!("f{i}.json"))
                                                          .with_content(if i % 3 == 0 { "{" } else { "{}" })
                                                  })
                                                  .collect();
        let par = validate_all(&arts);
        let seq = validate_all_sequential(&arts);
        assert_eq!(par, seq);
        assert_eq!(par[5].artifact_id, "a5");
        assert!(!par[3].valid);
    }

    #[test]
    fn pointer_escaping() {
        assert_eq!(pointer_push("/props", "a/b~c"), "/props/a~1b~0c");
    }
}

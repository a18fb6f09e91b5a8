//! `compose` schema: component composition descriptors.
//!
//! ```json
//! { "componentName": "Widget", "layer": "blocks", "props": { "title": { "type": "string" } } }
//! ```
use revflow_domain::validation::codes;
use revflow_domain::{ValidationError, ValidationWarning};
use serde_json::Value;

use super::{parse_json, pointer_push, type_name, Findings};

/// Allowed values for `layer`.
pub const LAYERS: [&str; 5] = ["primitives", "components", "blocks", "templates", "pages"];

pub fn check(content: &str, findings: &mut Findings) {
    let Some(value) = parse_json(content, findings) else {
        return;
    };
    let root = match value {
        Value::Object(root) => root,
        other => {
            findings.error(ValidationError::new("",
                                                codes::INVALID_TYPE,
                                                format!("compose spec must be an object, got {}", type_name(&other))));
            return;
        }
    };

    match root.get("componentName") {
        None => findings.error(ValidationError::new("/componentName",
                                                    codes::MISSING_REQUIRED_FIELD,
                                                    "componentName is required")
            .with_fix("Add \"componentName\": \"<PascalCaseName>\"")),
        Some(Value::String(_)) => {}
        Some(other) => findings.error(ValidationError::new("/componentName",
                                                           codes::INVALID_TYPE,
                                                           format!("componentName must be a string, got {}",
                                                                   type_name(other)))),
    }

    if let Some(layer) = root.get("layer") {
        let known = layer.as_str().is_some_and(|l| LAYERS.contains(&l));
        if !known {
            findings.error(ValidationError::new("/layer",
                                                codes::INVALID_ENUM_VALUE,
                                                format!("layer must be one of {}, got {layer}", LAYERS.join(", ")))
                .with_fix(format!("Use one of: {}", LAYERS.join(", "))));
        }
    }

    if let Some(props) = root.get("props") {
        match props {
            Value::Object(entries) => {
                for (name, prop) in entries {
                    if prop.get("type").is_none() {
                        findings.warning(ValidationWarning::new(pointer_push("/props", name),
                                                                codes::MISSING_PROP_TYPE,
                                                                format!("prop '{name}' has no type"))
                            .with_fix(format!("Add \"type\" to prop '{name}'")));
                    }
                }
            }
            other => findings.error(ValidationError::new("/props",
                                                         codes::INVALID_TYPE,
                                                         format!("props must be an object, got {}", type_name(other)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::validate;
    use revflow_domain::validation::codes;
    use revflow_domain::GeneratedArtifact;

    fn compose(content: &str) -> revflow_domain::ValidationResult {
        validate(&GeneratedArtifact::new("c", "json", "out/components/COMPOSE_Widget.json").with_content(content))
    }

    #[test]
    fn valid_compose_has_no_findings() {
        let r = compose(r#"{"componentName":"Widget","layer":"blocks"}"#);
        assert!(r.valid);
        assert!(r.errors.is_empty());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn missing_name_and_bad_layer_are_both_reported() {
        let r = compose(r#"{"layer":"nonsense"}"#);
        assert!(!r.valid);
        let found: Vec<&str> = r.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(found, vec![codes::MISSING_REQUIRED_FIELD, codes::INVALID_ENUM_VALUE]);
        assert_eq!(r.errors[0].path, "/componentName");
        assert_eq!(r.errors[1].path, "/layer");
    }

    #[test]
    fn non_string_name_is_invalid_type() {
        let r = compose(r#"{"componentName":42}"#);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].code, codes::INVALID_TYPE);
    }

    #[test]
    fn props_must_be_an_object() {
        for bad in ["[]", "null", "\"x\""] {
            let r = compose(&format!(r#"{{"componentName":"W","props":{bad}}}"#));
            assert_eq!(r.errors.len(), 1, "{bad}");
            assert_eq!(r.errors[0].code, codes::INVALID_TYPE);
            assert_eq!(r.errors[0].path, "/props");
        }
    }

    #[test]
    fn untyped_props_warn_but_stay_valid() {
        let r = compose(r#"{"componentName":"W","props":{"title":{"type":"string"},"size":{},"tone":"primary"}}"#);
        assert!(r.valid);
        let paths: Vec<&str> = r.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["/props/size", "/props/tone"]);
        assert!(r.warnings.iter().all(|w| w.code == codes::MISSING_PROP_TYPE));
    }

    #[test]
    fn root_must_be_object() {
        let r = compose("[1]");
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].code, codes::INVALID_TYPE);
        assert_eq!(r.errors[0].path, "");
    }
}

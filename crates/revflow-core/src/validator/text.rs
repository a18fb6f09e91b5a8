//! Checks for text-like schemas: `section` specs, plain markdown and paths
//! with no recognized schema.
use revflow_domain::validation::codes;
use revflow_domain::ValidationWarning;

use super::{parse_json, Findings};

/// A section spec is markdown; it should carry at least one heading.
pub fn check_section(content: &str, findings: &mut Findings) {
    let has_heading = content.lines().any(|l| l.trim_start().starts_with('#'));
    if !has_heading {
        findings.warning(ValidationWarning::new("", codes::MISSING_HEADING, "section spec has no markdown heading")
            .with_fix("Start the section with a '# Title' line"));
    }
}

/// Generic best-effort check: JSON-looking content must parse.
pub fn check_unknown(content: &str, findings: &mut Findings) {
    let looks_like_json = matches!(content.trim_start().chars().next(), Some('{') | Some('['));
    if looks_like_json {
        let _ = parse_json(content, findings);
    } else {
        findings.warning(ValidationWarning::new("",
                                                codes::UNKNOWN_SCHEMA,
                                                "no schema matches this path; only generic checks were applied"));
    }
}

#[cfg(test)]
mod tests {
    use crate::validator::validate;
    use revflow_domain::validation::codes;
    use revflow_domain::GeneratedArtifact;

    fn check(path: &str, content: &str) -> revflow_domain::ValidationResult {
        validate(&GeneratedArtifact::new("x", "file", path).with_content(content))
    }

    #[test]
    fn section_without_heading_warns() {
        let r = check("spec/SECTION_hero.md", "just prose");
        assert!(r.valid);
        assert_eq!(r.warnings[0].code, codes::MISSING_HEADING);
        assert!(check("spec/SECTION_hero.md", "intro\n  ## Hero\n").warnings.is_empty());
    }

    #[test]
    fn markdown_is_not_json_checked() {
        let r = check("README.md", "{ not json");
        assert!(r.valid);
        assert!(r.warnings.is_empty());
        assert_eq!(r.schema, "markdown");
    }

    #[test]
    fn unknown_gets_generic_checks() {
        let bad = check("src/Widget.tsx", "  {oops");
        assert_eq!(bad.schema, "unknown");
        assert_eq!(bad.errors[0].code, codes::INVALID_JSON);
        let other = check("src/Widget.tsx", "export const x = 1;");
        assert!(other.valid);
        assert_eq!(other.warnings[0].code, codes::UNKNOWN_SCHEMA);
    }
}

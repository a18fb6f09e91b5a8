//! `testids` schema: nested object of test identifiers.
//!
//! Every string leaf must be a category-scoped kebab id: a short lowercase
//! prefix, a hyphen, then lowercase hyphenated words
//! (`co-checkout-submit-click`). Non-string leaves are ignored.
use once_cell::sync::Lazy;
use regex::Regex;
use revflow_domain::validation::codes;
use revflow_domain::ValidationError;
use serde_json::Value;

use super::{parse_json, pointer_push, type_name, Findings};

pub const TESTID_PATTERN: &str = r"^[a-z]{2,8}-[a-z0-9]+(?:-[a-z0-9]+)*$";

/// Prefix used when a suggestion cannot keep the original leading segment.
const FALLBACK_PREFIX: &str = "tid";

static TESTID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(TESTID_PATTERN).expect("test-id pattern compiles"));

pub fn is_valid_testid(value: &str) -> bool {
    TESTID_RE.is_match(value)
}

pub fn check(content: &str, findings: &mut Findings) {
    let Some(value) = parse_json(content, findings) else {
        return;
    };
    if !value.is_object() {
        findings.error(ValidationError::new("",
                                            codes::INVALID_TYPE,
                                            format!("test-id map must be an object, got {}", type_name(&value))));
        return;
    }
    walk(&value, "", findings);
}

fn walk(value: &Value, pointer: &str, findings: &mut Findings) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, &pointer_push(pointer, key), findings);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                walk(child, &pointer_push(pointer, &idx.to_string()), findings);
            }
        }
        Value::String(id) if !is_valid_testid(id) => {
            findings.error(ValidationError::new(pointer,
                                                codes::INVALID_TESTID_FORMAT,
                                                format!("test id '{id}' does not match prefix-page-component-action"))
                .with_fix(format!("Use a prefixed kebab-case id, e.g. \"{}\"", suggest_testid(id))));
        }
        _ => {}
    }
}

/// Best-effort normalization of an invalid id into one that matches.
pub fn suggest_testid(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len() + 8);
    let mut prev: Option<char> = None;
    for c in raw.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
            spaced.push('-');
        }
        spaced.push(c.to_ascii_lowercase());
        prev = Some(c);
    }

    let mut normalized = String::with_capacity(spaced.len());
    for c in spaced.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            normalized.push(c);
        } else if !normalized.is_empty() && !normalized.ends_with('-') {
            normalized.push('-');
        }
    }
    let normalized = normalized.trim_end_matches('-').to_string();

    if is_valid_testid(&normalized) {
        return normalized;
    }
    if !normalized.is_empty() {
        let prefixed = format!("{FALLBACK_PREFIX}-{normalized}");
        if is_valid_testid(&prefixed) {
            return prefixed;
        }
    }
    format!("{FALLBACK_PREFIX}-element")
}

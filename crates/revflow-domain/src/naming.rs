//! Artifact naming conventions.
//!
//! An artifact `path` carries its logical category as a marker segment
//! (`COMPOSE_`, `TESTIDS_`, `SECTION_`) or, failing that, as a file extension.
//! These markers are a contract with the artifact producers: the validator,
//! the gate evaluator and the checklist builder all key off them.
use serde::{Deserialize, Serialize};

pub const COMPOSE_MARKER: &str = "COMPOSE_";
pub const TESTIDS_MARKER: &str = "TESTIDS_";
pub const SECTION_MARKER: &str = "SECTION_";

/// Schema detected for an artifact, purely from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Compose,
    TestIds,
    Section,
    Json,
    Markdown,
    Unknown,
}

impl SchemaKind {
    /// Markers win over extensions; the first matching marker wins.
    pub fn detect(path: &str) -> Self {
        if path.contains(COMPOSE_MARKER) {
            return SchemaKind::Compose;
        }
        if path.contains(TESTIDS_MARKER) {
            return SchemaKind::TestIds;
        }
        if path.contains(SECTION_MARKER) {
            return SchemaKind::Section;
        }
        match extension(path).map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("json") => SchemaKind::Json,
            Some("md") | Some("mdx") => SchemaKind::Markdown,
            _ => SchemaKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Compose => "compose",
            SchemaKind::TestIds => "testids",
            SchemaKind::Section => "section",
            SchemaKind::Json => "json",
            SchemaKind::Markdown => "markdown",
            SchemaKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension of the last path segment, if any (`a/b.c/file` has none).
fn extension(path: &str) -> Option<&str> {
    let file = path.rsplit(|c: char| c == '/' || c == '\\').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// True if the path describes a component specification (section or compose).
pub fn is_component_spec_path(path: &str) -> bool {
    path.contains(SECTION_MARKER) || path.contains(COMPOSE_MARKER)
}

pub fn is_testids_path(path: &str) -> bool {
    path.contains(TESTIDS_MARKER)
}

//! Artifact generated by the (external) workflow-execution layer.
//!
//! An artifact is a file-like unit: `path` + textual `content`. The engine
//! never interprets `type`; schema detection is driven by `path` only (see
//! `naming`). Once attached to a `Revision` an artifact is never mutated.
use serde::{Deserialize, Serialize};

use crate::naming::SchemaKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    pub id: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl GeneratedArtifact {
    pub fn new(id: impl Into<String>, artifact_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self { id: id.into(),
               artifact_type: artifact_type.into(),
               path: path.into(),
               name: None,
               content: None,
               diff: None }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Schema inferred from the path.
    pub fn schema_kind(&self) -> SchemaKind {
        SchemaKind::detect(&self.path)
    }

    /// Content if present and non-empty.
    pub fn non_empty_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

//! Revision comparison.
//!
//! Outputs are keyed by `path` (a later artifact with the same path replaces
//! an earlier one but keeps its position). Content is compared as exact
//! strings: key order or whitespace changes in JSON are modifications.
use indexmap::IndexMap;
use revflow_domain::GeneratedArtifact;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::ENGINE_VERSION;
use crate::hashing::hash_value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedArtifact {
    /// Copy from the newer revision (B).
    pub artifact: GeneratedArtifact,
    /// Copy from the older revision (A).
    pub old_artifact: GeneratedArtifact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionDiff {
    pub added: Vec<GeneratedArtifact>,
    pub removed: Vec<GeneratedArtifact>,
    pub modified: Vec<ModifiedArtifact>,
}

impl RevisionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

pub fn path_map(outputs: &[GeneratedArtifact]) -> IndexMap<&str, &GeneratedArtifact> {
    let mut map = IndexMap::with_capacity(outputs.len());
    for artifact in outputs {
        map.insert(artifact.path.as_str(), artifact);
    }
    map
}

/// Diff of A's outputs against B's: `added` only in B, `removed` only in A,
/// `modified` in both with different content. Added/modified follow B's
/// order, removed follows A's.
pub fn diff_outputs(a: &[GeneratedArtifact], b: &[GeneratedArtifact]) -> RevisionDiff {
    let old = path_map(a);
    let new = path_map(b);
    let mut diff = RevisionDiff::default();
    for (path, artifact) in &new {
        match old.get(path) {
            None => diff.added.push((*artifact).clone()),
            Some(previous) if previous.content != artifact.content => {
                diff.modified.push(ModifiedArtifact { artifact: (*artifact).clone(),
                                                      old_artifact: (*previous).clone() })
            }
            Some(_) => {}
        }
    }
    for (path, artifact) in &old {
        if !new.contains_key(path) {
            diff.removed.push((*artifact).clone());
        }
    }
    diff
}

/// Fingerprint of the path-keyed outputs: equal fingerprints mean an empty
/// diff.
pub fn outputs_fingerprint(outputs: &[GeneratedArtifact]) -> String {
    let mut entries = Map::new();
    for (path, artifact) in path_map(outputs) {
        let content = artifact.content.clone().map(Value::String).unwrap_or(Value::Null);
        entries.insert(path.to_string(), content);
    }
    hash_value(&serde_json::json!({
        "engine_version": ENGINE_VERSION,
        "outputs": Value::Object(entries),
    }))
}

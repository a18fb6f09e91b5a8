//! Producer contract: a finished workflow session handed over by the wizard
//! layer, plus the author that requests a revision.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::artifact::GeneratedArtifact;
use crate::DomainError;

/// Finished session. Treated as an already-validated input boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSession {
    pub id: String,
    pub workflow_id: String,
    /// Per-step inputs keyed by step id (opaque to the engine).
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub artifacts: Vec<GeneratedArtifact>,
}

impl WorkflowSession {
    pub fn new(id: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        Self { id: id.into(),
               workflow_id: workflow_id.into(),
               data: Map::new(),
               artifacts: Vec::new() }
    }

    pub fn with_artifact(mut self, artifact: GeneratedArtifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn with_step_input(mut self, step_id: impl Into<String>, input: Value) -> Self {
        self.data.insert(step_id.into(), input);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let session: WorkflowSession = serde_json::from_str(raw)?;
        if session.workflow_id.trim().is_empty() {
            return Err(DomainError::ValidationError("session has no workflowId".to_string()));
        }
        Ok(session)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: &str, email: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError("author name is empty".to_string()));
        }
        if !email.contains('@') {
            return Err(DomainError::ValidationError(format!("invalid author email: {email}")));
        }
        Ok(Author { name: name.to_string(),
                    email: email.to_string() })
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

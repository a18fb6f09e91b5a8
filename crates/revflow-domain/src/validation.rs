//! Structured validation output.
//!
//! Invalid artifacts are an expected outcome, so validation never fails:
//! every problem is reported as data inside a `ValidationResult`.
use serde::{Deserialize, Serialize};

/// Stable error/warning codes consumed by the UI layer.
pub mod codes {
    pub const EMPTY_CONTENT: &str = "EMPTY_CONTENT";
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const INVALID_TYPE: &str = "INVALID_TYPE";
    pub const MISSING_REQUIRED_FIELD: &str = "MISSING_REQUIRED_FIELD";
    pub const INVALID_ENUM_VALUE: &str = "INVALID_ENUM_VALUE";
    pub const MISSING_PROP_TYPE: &str = "MISSING_PROP_TYPE";
    pub const INVALID_TESTID_FORMAT: &str = "INVALID_TESTID_FORMAT";
    pub const MISSING_HEADING: &str = "MISSING_HEADING";
    pub const UNKNOWN_SCHEMA: &str = "UNKNOWN_SCHEMA";
}

/// Problem that blocks validity. `path` is a JSON pointer into the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

/// Same shape as `ValidationError` but never affects `valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self { path: path.into(),
               message: message.into(),
               code: code.to_string(),
               suggested_fix: None }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self { path: path.into(),
               message: message.into(),
               code: code.to_string(),
               suggested_fix: None }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub artifact_id: String,
    pub artifact_path: String,
    /// Detected schema name (`compose`, `testids`, ...).
    pub schema: String,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Builds a result; `valid` is derived from `errors` so the two can never
    /// disagree.
    pub fn new(artifact_id: impl Into<String>,
               artifact_path: impl Into<String>,
               schema: impl Into<String>,
               errors: Vec<ValidationError>,
               warnings: Vec<ValidationWarning>)
               -> Self {
        Self { artifact_id: artifact_id.into(),
               artifact_path: artifact_path.into(),
               schema: schema.into(),
               valid: errors.is_empty(),
               errors,
               warnings }
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code) || self.warnings.iter().any(|w| w.code == code)
    }
}

//! Approval: the mutable record of a human review over one Revision.
//!
//! State machine: `Pending` -> `Approved` | `Rejected`. Both targets are
//! terminal; nothing leaves them.
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Fail,
    Pending,
}

impl GateStatus {
    pub fn from_bool(pass: bool) -> Self {
        if pass {
            GateStatus::Pass
        } else {
            GateStatus::Fail
        }
    }
}

/// Automated check derived from a Revision. Recomputed on every approval
/// request; only persisted as part of its Approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalGate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: GateStatus,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApprovalGate {
    /// A required gate that is not `Pass` blocks approval.
    pub fn is_blocking(&self) -> bool {
        self.required && self.status != GateStatus::Pass
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalChecklistItem {
    pub id: String,
    pub label: String,
    pub checked: bool,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl ApprovalChecklistItem {
    pub fn is_blocking(&self) -> bool {
        self.required && !self.checked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: Uuid,
    pub revision_id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub requested_by: String,
    pub status: ApprovalStatus,
    pub checklist: Vec<ApprovalChecklistItem>,
    pub gates: Vec<ApprovalGate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(default)]
    pub version: u64,
}

impl Approval {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Labels of required checklist items still unchecked.
    pub fn unchecked_required_items(&self) -> Vec<String> {
        self.checklist
            .iter()
            .filter(|i| i.is_blocking())
            .map(|i| i.label.clone())
            .collect()
    }

    /// Names of required gates that did not pass.
    pub fn failing_required_gates(&self) -> Vec<String> {
        self.gates.iter().filter(|g| g.is_blocking()).map(|g| g.name.clone()).collect()
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut ApprovalChecklistItem> {
        self.checklist.iter_mut().find(|i| i.id == item_id)
    }
}

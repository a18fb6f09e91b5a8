//! Audit trail: append-only events about revisions and their approvals.

mod store;
mod types;

pub use store::{AuditLog, InMemoryAuditLog};
pub use types::{ApprovalEvent, ApprovalEventKind};

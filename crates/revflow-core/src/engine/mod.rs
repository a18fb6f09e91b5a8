//! Engine module: `ApprovalEngine`, its builder and a thread-safe handle.

pub mod builder;
pub mod core;
pub mod shared;

pub use builder::EngineBuilder;
pub use self::core::ApprovalEngine;
pub use shared::SharedApprovalEngine;

pub use crate::event::{ApprovalEvent, ApprovalEventKind, AuditLog, InMemoryAuditLog};
pub use crate::repo::{ApprovalRepository, InMemoryApprovalRepository, InMemoryRevisionRepository, RevisionRepository};

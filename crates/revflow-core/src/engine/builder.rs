//! Builder for `ApprovalEngine`.
//!
//! Repositories are mandatory; the audit log defaults to the in-memory one
//! and the configuration to `EngineConfig::default()`.
//!
//! ```ignore
//! let engine = ApprovalEngine::builder(revisions, approvals)
//!     .audit_log(my_log)
//!     .config(EngineConfig::from_env())
//!     .build();
//! ```
use crate::config::EngineConfig;
use crate::engine::ApprovalEngine;
use crate::event::{AuditLog, InMemoryAuditLog};
use crate::repo::{ApprovalRepository, RevisionRepository};

#[derive(Debug)]
pub struct EngineBuilder<R: RevisionRepository, A: ApprovalRepository, L: AuditLog = InMemoryAuditLog> {
    revisions: R,
    approvals: A,
    audit: L,
    config: EngineConfig,
}

impl<R: RevisionRepository, A: ApprovalRepository> EngineBuilder<R, A, InMemoryAuditLog> {
    pub fn new(revisions: R, approvals: A) -> Self {
        Self { revisions,
               approvals,
               audit: InMemoryAuditLog::default(),
               config: EngineConfig::default() }
    }
}

impl<R: RevisionRepository, A: ApprovalRepository, L: AuditLog> EngineBuilder<R, A, L> {
    /// Swaps the audit log implementation.
    pub fn audit_log<L2: AuditLog>(self, audit: L2) -> EngineBuilder<R, A, L2> {
        EngineBuilder { revisions: self.revisions,
                        approvals: self.approvals,
                        audit,
                        config: self.config }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn system_actor(mut self, actor: impl Into<String>) -> Self {
        self.config.system_actor = actor.into();
        self
    }

    pub fn build(self) -> ApprovalEngine<R, A, L> {
        ApprovalEngine::new_with_stores(self.revisions, self.approvals, self.audit, self.config)
    }
}

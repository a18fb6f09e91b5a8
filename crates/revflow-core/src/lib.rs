//! revflow-core: revision & approval workflow engine.
//!
//! Pipeline: session artifacts -> `validator` -> `revision::RevisionStore` ->
//! `gates::run_gates` -> `approval::build_checklist` -> approval state machine.
//! `engine::ApprovalEngine` wires the pieces over injected repositories.
pub mod approval;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod gates;
pub mod hashing;
pub mod repo;
pub mod revision;
pub mod validator;

pub use config::EngineConfig;
pub use engine::{ApprovalEngine, EngineBuilder, SharedApprovalEngine};
pub use errors::{classify_error, CoreEngineError, ErrorClass};
pub use event::{ApprovalEvent, ApprovalEventKind, AuditLog, InMemoryAuditLog};
pub use gates::run_gates;
pub use repo::{ApprovalRepository, InMemoryApprovalRepository, InMemoryRevisionRepository, RevisionRepository};
pub use revision::{ModifiedArtifact, RevisionDiff, RevisionStore};
pub use validator::{validate, validate_all};

// revflow-domain library entry point
pub mod approval;
pub mod artifact;
pub mod error;
pub mod naming;
pub mod revision;
pub mod session;
pub mod validation;
pub use approval::{Approval, ApprovalChecklistItem, ApprovalGate, ApprovalStatus, GateStatus};
pub use artifact::GeneratedArtifact;
pub use error::DomainError;
pub use naming::SchemaKind;
pub use revision::{Revision, RevisionStatus};
pub use session::{Author, WorkflowSession};
pub use validation::{ValidationError, ValidationResult, ValidationWarning};

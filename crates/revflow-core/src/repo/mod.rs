pub mod types;
pub use types::{check_version, ApprovalRepository, InMemoryApprovalRepository, InMemoryRevisionRepository, RevisionRepository};

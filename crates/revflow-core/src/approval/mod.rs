//! Checklist construction and the approval state machine.
//!
//! Transitions (all others are refused):
//! - `Pending` -> `Approved`: every required item checked and every required
//!   gate passing.
//! - `Pending` -> `Rejected`: unconditional.
//!
//! Checklist edits are only accepted while `Pending`.

pub mod checklist;
pub mod machine;

pub use checklist::build_checklist;
pub use machine::{approve, new_approval, reject, set_checklist_item};

//! Repository traits for the two persisted collections (revisions and
//! approvals) plus their in-memory implementations.
//!
//! Contract shared by every backend:
//! - `insert` rejects an id that already exists (`Duplicate`).
//! - `all` returns entities in insertion order.
//! - `save` replaces an existing entity as a compare-and-swap on `version`:
//!   the incoming value must carry `stored.version + 1`, otherwise the write
//!   is refused with `VersionConflict` and nothing changes.
use std::collections::HashMap;

use revflow_domain::{Approval, Revision};
use uuid::Uuid;

use crate::errors::CoreEngineError;

pub trait RevisionRepository {
    fn insert(&mut self, revision: Revision) -> Result<(), CoreEngineError>;
    fn get(&self, id: Uuid) -> Result<Option<Revision>, CoreEngineError>;
    /// All revisions, insertion order.
    fn all(&self) -> Result<Vec<Revision>, CoreEngineError>;
    fn save(&mut self, revision: Revision) -> Result<(), CoreEngineError>;
}

pub trait ApprovalRepository {
    fn insert(&mut self, approval: Approval) -> Result<(), CoreEngineError>;
    fn get(&self, id: Uuid) -> Result<Option<Approval>, CoreEngineError>;
    /// All approvals, insertion order.
    fn all(&self) -> Result<Vec<Approval>, CoreEngineError>;
    fn save(&mut self, approval: Approval) -> Result<(), CoreEngineError>;
}

/// Checks the compare-and-swap rule used by every `save`.
pub fn check_version(entity: &str, id: Uuid, stored: u64, incoming: u64) -> Result<(), CoreEngineError> {
    if incoming != stored + 1 {
        return Err(CoreEngineError::VersionConflict { entity: entity.to_string(),
                                                      id,
                                                      stored,
                                                      based_on: incoming.saturating_sub(1) });
    }
    Ok(())
}

/// Ordered in-memory collection: a vector keeps insertion order, an index
/// maps ids to positions.
#[derive(Debug, Clone)]
struct OrderedCollection<T> {
    items: Vec<T>,
    index: HashMap<Uuid, usize>,
}

impl<T: Clone> OrderedCollection<T> {
    fn new() -> Self {
        Self { items: Vec::new(),
               index: HashMap::new() }
    }

    fn insert(&mut self, id: Uuid, item: T, entity: &str) -> Result<(), CoreEngineError> {
        if self.index.contains_key(&id) {
            return Err(CoreEngineError::Duplicate { entity: entity.to_string(),
                                                    id });
        }
        self.index.insert(id, self.items.len());
        self.items.push(item);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Option<&T> {
        self.index.get(&id).and_then(|&i| self.items.get(i))
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&i) => self.items.get_mut(i),
            None => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryRevisionRepository {
    inner: OrderedCollection<Revision>,
}

impl InMemoryRevisionRepository {
    pub fn new() -> Self {
        Self { inner: OrderedCollection::new() }
    }
}

impl Default for InMemoryRevisionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionRepository for InMemoryRevisionRepository {
    fn insert(&mut self, revision: Revision) -> Result<(), CoreEngineError> {
        self.inner.insert(revision.id, revision, "revision")
    }

    fn get(&self, id: Uuid) -> Result<Option<Revision>, CoreEngineError> {
        Ok(self.inner.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Revision>, CoreEngineError> {
        Ok(self.inner.items.clone())
    }

    fn save(&mut self, revision: Revision) -> Result<(), CoreEngineError> {
        let slot = self.inner.get_mut(revision.id).ok_or(CoreEngineError::RevisionNotFound(revision.id))?;
        check_version("revision", revision.id, slot.version, revision.version)?;
        *slot = revision;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryApprovalRepository {
    inner: OrderedCollection<Approval>,
}

impl InMemoryApprovalRepository {
    pub fn new() -> Self {
        Self { inner: OrderedCollection::new() }
    }
}

impl Default for InMemoryApprovalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalRepository for InMemoryApprovalRepository {
    fn insert(&mut self, approval: Approval) -> Result<(), CoreEngineError> {
        self.inner.insert(approval.id, approval, "approval")
    }

    fn get(&self, id: Uuid) -> Result<Option<Approval>, CoreEngineError> {
        Ok(self.inner.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Approval>, CoreEngineError> {
        Ok(self.inner.items.clone())
    }

    fn save(&mut self, approval: Approval) -> Result<(), CoreEngineError> {
        let slot = self.inner.get_mut(approval.id).ok_or(CoreEngineError::ApprovalNotFound(approval.id))?;
        check_version("approval", approval.id, slot.version, approval.version)?;
        *slot = approval;
        Ok(())
    }
}

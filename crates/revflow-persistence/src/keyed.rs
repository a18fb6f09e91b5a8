//! Core repositories over a `KeyValueStore`.
//!
//! Each collection is one key holding a JSON array of flat camelCase
//! objects in insertion order:
//!
//! | key               | element          |
//! |-------------------|------------------|
//! | `revisions`       | `Revision`       |
//! | `approvals`       | `Approval`       |
//! | `approval_events` | `ApprovalEvent`  |
//!
//! Writes go through `KeyValueStore::update`, so the duplicate-id and
//! version checks run against the value being replaced.

use chrono::Utc;
use log::debug;
use revflow_core::repo::check_version;
use revflow_core::{ApprovalEngine, ApprovalEvent, ApprovalEventKind, ApprovalRepository, AuditLog, CoreEngineError,
                   EngineConfig, RevisionRepository};
use revflow_domain::{Approval, Revision};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::kv::KeyValueStore;

pub const KEY_REVISIONS: &str = "revisions";
pub const KEY_APPROVALS: &str = "approvals";
pub const KEY_APPROVAL_EVENTS: &str = "approval_events";

fn decode<T: DeserializeOwned>(key: &str, value: Option<Value>) -> Result<Vec<T>, PersistenceError> {
    match value {
        None => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v).map_err(|e| PersistenceError::Codec { key: key.to_string(),
                                                                                   message: e.to_string() }),
    }
}

fn encode<T: Serialize>(key: &str, items: &[T]) -> Result<Value, PersistenceError> {
    serde_json::to_value(items).map_err(|e| PersistenceError::Codec { key: key.to_string(),
                                                                      message: e.to_string() })
}

/// Typed view of one key.
#[derive(Debug, Clone)]
struct Collection<S> {
    store: S,
    key: &'static str,
}

impl<S: KeyValueStore> Collection<S> {
    fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, PersistenceError> {
        decode(self.key, self.store.get(self.key)?)
    }

    fn modify<T, F>(&self, mut f: F) -> Result<(), PersistenceError>
        where T: Serialize + DeserializeOwned,
              F: FnMut(&mut Vec<T>) -> Result<(), CoreEngineError>
    {
        let key = self.key;
        self.store.update(key, &mut |current| {
                      let mut items: Vec<T> = decode(key, current)?;
                      f(&mut items)?;
                      encode(key, &items)
                  })?;
        debug!("collection written key={key}");
        Ok(())
    }
}

/// Entities stored with an id and a compare-and-swap version.
trait Versioned {
    const ENTITY: &'static str;
    fn id(&self) -> Uuid;
    fn version(&self) -> u64;
    fn not_found(id: Uuid) -> CoreEngineError;
}

impl Versioned for Revision {
    const ENTITY: &'static str = "revision";
    fn id(&self) -> Uuid {
        self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn not_found(id: Uuid) -> CoreEngineError {
        CoreEngineError::RevisionNotFound(id)
    }
}

impl Versioned for Approval {
    const ENTITY: &'static str = "approval";
    fn id(&self) -> Uuid {
        self.id
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn not_found(id: Uuid) -> CoreEngineError {
        CoreEngineError::ApprovalNotFound(id)
    }
}

impl<S: KeyValueStore> Collection<S> {
    fn insert_entity<T>(&self, entity: T) -> Result<(), CoreEngineError>
        where T: Versioned + Clone + Serialize + DeserializeOwned
    {
        self.modify(|items: &mut Vec<T>| {
                if items.iter().any(|e| e.id() == entity.id()) {
                    return Err(CoreEngineError::Duplicate { entity: T::ENTITY.to_string(),
                                                            id: entity.id() });
                }
                items.push(entity.clone());
                Ok(())
            })
            .map_err(CoreEngineError::from)
    }

    fn get_entity<T>(&self, id: Uuid) -> Result<Option<T>, CoreEngineError>
        where T: Versioned + DeserializeOwned
    {
        Ok(self.load::<T>()?.into_iter().find(|e| e.id() == id))
    }

    fn save_entity<T>(&self, entity: T) -> Result<(), CoreEngineError>
        where T: Versioned + Clone + Serialize + DeserializeOwned
    {
        self.modify(|items: &mut Vec<T>| {
                let slot = items.iter_mut()
                                .find(|e| e.id() == entity.id())
                                .ok_or_else(|| T::not_found(entity.id()))?;
                check_version(T::ENTITY, entity.id(), slot.version(), entity.version())?;
                *slot = entity.clone();
                Ok(())
            })
            .map_err(CoreEngineError::from)
    }
}

#[derive(Debug, Clone)]
pub struct KvRevisionRepository<S: KeyValueStore> {
    inner: Collection<S>,
}

impl<S: KeyValueStore> KvRevisionRepository<S> {
    pub fn new(store: S) -> Self {
        Self { inner: Collection { store,
                                   key: KEY_REVISIONS } }
    }
}

impl<S: KeyValueStore> RevisionRepository for KvRevisionRepository<S> {
    fn insert(&mut self, revision: Revision) -> Result<(), CoreEngineError> {
        self.inner.insert_entity(revision)
    }

    fn get(&self, id: Uuid) -> Result<Option<Revision>, CoreEngineError> {
        self.inner.get_entity(id)
    }

    fn all(&self) -> Result<Vec<Revision>, CoreEngineError> {
        Ok(self.inner.load()?)
    }

    fn save(&mut self, revision: Revision) -> Result<(), CoreEngineError> {
        self.inner.save_entity(revision)
    }
}

#[derive(Debug, Clone)]
pub struct KvApprovalRepository<S: KeyValueStore> {
    inner: Collection<S>,
}

impl<S: KeyValueStore> KvApprovalRepository<S> {
    pub fn new(store: S) -> Self {
        Self { inner: Collection { store,
                                   key: KEY_APPROVALS } }
    }
}

impl<S: KeyValueStore> ApprovalRepository for KvApprovalRepository<S> {
    fn insert(&mut self, approval: Approval) -> Result<(), CoreEngineError> {
        self.inner.insert_entity(approval)
    }

    fn get(&self, id: Uuid) -> Result<Option<Approval>, CoreEngineError> {
        self.inner.get_entity(id)
    }

    fn all(&self) -> Result<Vec<Approval>, CoreEngineError> {
        Ok(self.inner.load()?)
    }

    fn save(&mut self, approval: Approval) -> Result<(), CoreEngineError> {
        self.inner.save_entity(approval)
    }
}

/// Audit log stored as one flat list; `seq` is per subject.
#[derive(Debug, Clone)]
pub struct KvAuditLog<S: KeyValueStore> {
    inner: Collection<S>,
}

impl<S: KeyValueStore> KvAuditLog<S> {
    pub fn new(store: S) -> Self {
        Self { inner: Collection { store,
                                   key: KEY_APPROVAL_EVENTS } }
    }
}

impl<S: KeyValueStore> AuditLog for KvAuditLog<S> {
    fn append(&mut self, subject_id: Uuid, kind: ApprovalEventKind) -> Result<ApprovalEvent, CoreEngineError> {
        let mut appended = None;
        self.inner.modify(|events: &mut Vec<ApprovalEvent>| {
                      let seq = events.iter().filter(|e| e.subject_id == subject_id).count() as u64;
                      let ev = ApprovalEvent { seq,
                                               subject_id,
                                               kind: kind.clone(),
                                               ts: Utc::now() };
                      events.push(ev.clone());
                      appended = Some(ev);
                      Ok(())
                  })?;
        appended.ok_or_else(|| CoreEngineError::Internal("audit append produced no event".into()))
    }

    fn list(&self, subject_id: Uuid) -> Result<Vec<ApprovalEvent>, CoreEngineError> {
        let events: Vec<ApprovalEvent> = self.inner.load()?;
        Ok(events.into_iter().filter(|e| e.subject_id == subject_id).collect())
    }
}

/// Engine whose three collections live in `store`.
pub fn keyed_engine<S>(store: S,
                       config: EngineConfig)
                       -> ApprovalEngine<KvRevisionRepository<S>, KvApprovalRepository<S>, KvAuditLog<S>>
    where S: KeyValueStore + Clone
{
    ApprovalEngine::builder(KvRevisionRepository::new(store.clone()), KvApprovalRepository::new(store.clone()))
        .audit_log(KvAuditLog::new(store))
        .config(config)
        .build()
}

//! Key-value store abstraction.
//!
//! Values are JSON documents. `update` is the only write primitive the keyed
//! repositories use: it runs a read-modify-write of one key atomically with
//! respect to other `update` calls on the same store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::PersistenceError;

/// Update callback: receives the current value (`None` when the key is
/// absent) and returns the value to store. Returning an error aborts the
/// write and leaves the key untouched.
pub type UpdateFn<'a> = dyn FnMut(Option<Value>) -> Result<Value, PersistenceError> + 'a;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError>;
    fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError>;
    /// Atomic read-modify-write of `key`. Backends that retry may call `f`
    /// more than once, always with a freshly read value.
    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), PersistenceError>;
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    inner: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, PersistenceError> {
        self.inner
            .lock()
            .map_err(|_| PersistenceError::Unknown("in-memory store lock poisoned".into()))
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), PersistenceError> {
        let mut map = self.lock()?;
        let next = f(map.get(key).cloned())?;
        map.insert(key.to_string(), next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_state() {
        let a = InMemoryKeyValueStore::new();
        let b = a.clone();
        a.set("k", json!([1])).unwrap();
        assert_eq!(b.get("k").unwrap(), Some(json!([1])));
        assert_eq!(b.get("missing").unwrap(), None);
    }

    #[test]
    fn failed_update_leaves_value() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", json!(1)).unwrap();
        let res = store.update("k", &mut |_| Err(PersistenceError::NotFound));
        assert!(res.is_err());
        assert_eq!(store.get("k").unwrap(), Some(json!(1)));

        store.update("k", &mut |v| Ok(json!(v.and_then(|v| v.as_i64()).unwrap_or(0) + 1)))
             .unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
    }
}

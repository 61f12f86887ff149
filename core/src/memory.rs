//! In-memory `KeyValueStore`, used by the HTTP host and by tests.
//!
//! Collections are created on first open. Keys within a collection are kept
//! sorted, so prefix listings come back in key order.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::instrument;

use crate::store::{Collection, KeyValueStore, StoreError};

type Entries = BTreeMap<String, Vec<u8>>;
type Collections = HashMap<String, Arc<RwLock<Entries>>>;

/// Shared in-memory store. Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Collection = MemoryCollection;

    #[instrument(level = "trace", skip(self))]
    fn open(&self, name: &str) -> Result<MemoryCollection, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        let entries = collections.entry(name.to_string()).or_default().clone();
        Ok(MemoryCollection { entries })
    }
}

/// One collection inside a `MemoryStore`.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryCollection {
    fn read(&self) -> Result<RwLockReadGuard<'_, Entries>, StoreError> {
        self.entries
            .read()
            .map_err(|_| StoreError::Backend("collection lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Entries>, StoreError> {
        self.entries
            .write()
            .map_err(|_| StoreError::Backend("collection lock poisoned".to_string()))
    }
}

impl Collection for MemoryCollection {
    #[instrument(level = "trace", skip(self, value), fields(len = value.len()))]
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.write()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.read()?
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    #[instrument(level = "trace", skip(self))]
    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.write()?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    #[instrument(level = "trace", skip(self))]
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

//! In-process key-value store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};

use super::{Collection, KeyValueStore};
use crate::error::{Error, Result};

/// Store that keeps everything in memory and forgets it on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Map<String, Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Collection, Map<String, Value>>>> {
        self.collections
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        Ok(self
            .lock()?
            .get(&collection)
            .and_then(|map| map.get(key))
            .cloned())
    }

    fn put(&self, collection: Collection, key: &str, value: &Value) -> Result<()> {
        self.lock()?
            .entry(collection)
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete(&self, collection: Collection, key: &str) -> Result<bool> {
        Ok(self
            .lock()?
            .get_mut(&collection)
            .and_then(|map| map.shift_remove(key))
            .is_some())
    }

    fn keys(&self, collection: Collection) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .get(&collection)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default())
    }
}

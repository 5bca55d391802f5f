//! The key-value store collaborator. Components always read and write whole
//! aggregates under a single key.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// Whole-aggregate get/set persistence.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read the aggregate stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the aggregate stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Decode the aggregate under `key`, or `None` when nothing is stored there.
pub async fn load<T: DeserializeOwned>(
    store: &dyn Store,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Encode and write `aggregate` under `key`.
pub async fn save<T: Serialize + Sync>(
    store: &dyn Store,
    key: &str,
    aggregate: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(aggregate)?;
    store.set(key, value).await
}

/// In-memory store, used by tests and embedders.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

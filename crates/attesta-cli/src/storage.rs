//! RocksDB storage backend for the CLI.

use anyhow::Result;
use async_trait::async_trait;
use attesta_core::{Store, StoreError};
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use serde_json::Value;
use std::path::Path;

/// Column family holding whole JSON aggregates by key.
const CF_AGGREGATES: &str = "aggregates";

/// RocksDB-backed [`Store`].
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_AGGREGATES,
            Options::default(),
        )];
        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        tracing::debug!(path = %path.display(), "store opened");
        Ok(Self { db })
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_AGGREGATES)
            .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", CF_AGGREGATES)))?;
        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn put_raw(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let cf = self
            .db
            .cf_handle(CF_AGGREGATES)
            .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", CF_AGGREGATES)))?;
        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl Store for RocksStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.get_raw(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&value)?;
        self.put_raw(key, &bytes)
    }
}

//! In-memory key-value backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{BatchOp, KvBackend, ScanIterator, WriteBatch};
use crate::error::{LedgerError, Result};

type Buckets = HashMap<String, BTreeMap<Vec<u8>, Vec<u8>>>;

/// BTreeMap-per-bucket storage; scans see a snapshot taken at call time.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    buckets: RwLock<Buckets>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Buckets>> {
        self.buckets
            .read()
            .map_err(|_| LedgerError::Storage("memory backend lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Buckets>> {
        self.buckets
            .write()
            .map_err(|_| LedgerError::Storage("memory backend lock poisoned".to_string()))
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.get(bucket).and_then(|b| b.get(key).cloned()))
    }

    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.write()?
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        if let Some(b) = self.write()?.get_mut(bucket) {
            b.remove(key);
        }
        Ok(())
    }

    fn write_batch(&self, bucket: &str, batch: WriteBatch) -> Result<()> {
        let mut buckets = self.write()?;
        let b = buckets.entry(bucket.to_string()).or_default();
        for op in batch.operations {
            match op {
                BatchOp::Put { key, value } => {
                    b.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    b.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn scan(&self, bucket: &str) -> Result<ScanIterator<'_>> {
        let items: Vec<(Vec<u8>, Vec<u8>)> = self
            .read()?
            .get(bucket)
            .map(|b| b.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Ok(Box::new(items.into_iter().map(Ok)))
    }

    fn drop_bucket(&self, bucket: &str) -> Result<()> {
        self.write()?.remove(bucket);
        Ok(())
    }
}

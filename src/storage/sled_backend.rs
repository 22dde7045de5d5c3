//! sled key-value backend for persistent ledgers.

use std::path::Path;

use sled::{Batch, Config, Db};

use super::{BatchOp, KvBackend, ScanIterator, WriteBatch};
use crate::error::{LedgerError, Result};

/// sled-based backend; each bucket is a sled tree.
///
/// `Db` is internally reference counted, so cloning is cheap.
#[derive(Clone)]
pub struct SledBackend {
    db: Db,
}

impl SledBackend {
    /// Open or create a sled database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Config::default().path(path).open()?;
        Ok(Self { db })
    }

    /// A database removed when the last handle is dropped.
    pub fn temporary() -> Result<Self> {
        let db = Config::new().temporary(true).open()?;
        Ok(Self { db })
    }
}

impl KvBackend for SledBackend {
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let tree = self.db.open_tree(bucket)?;
        Ok(tree.get(key)?.map(|v| v.to_vec()))
    }

    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.open_tree(bucket)?.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        self.db.open_tree(bucket)?.remove(key)?;
        Ok(())
    }

    fn write_batch(&self, bucket: &str, batch: WriteBatch) -> Result<()> {
        let mut sled_batch = Batch::default();
        for op in batch.operations {
            match op {
                BatchOp::Put { key, value } => sled_batch.insert(key, value),
                BatchOp::Delete { key } => sled_batch.remove(key),
            }
        }
        self.db.open_tree(bucket)?.apply_batch(sled_batch)?;
        Ok(())
    }

    fn scan(&self, bucket: &str) -> Result<ScanIterator<'_>> {
        let tree = self.db.open_tree(bucket)?;
        let iter = tree
            .iter()
            .map(|item| item.map(|(k, v)| (k.to_vec(), v.to_vec())).map_err(LedgerError::from));
        Ok(Box::new(iter))
    }

    fn drop_bucket(&self, bucket: &str) -> Result<()> {
        self.db.drop_tree(bucket)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

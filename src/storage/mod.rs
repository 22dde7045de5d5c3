//! Key-value storage backends.
//!
//! The ledger sees its store as named buckets of ordered byte keys:
//! - `SledBackend`: sled-based persistent storage
//! - `MemoryBackend`: in-memory storage for tests and throwaway ledgers

mod memory_backend;
mod sled_backend;

pub use memory_backend::MemoryBackend;
pub use sled_backend::SledBackend;

use crate::error::Result;

/// Iterator over `(key, value)` pairs of one bucket, in key order.
pub type ScanIterator<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> + 'a>;

/// Trait for key-value storage backends.
///
/// Implementations must provide atomic per-bucket batch writes and
/// key-ordered scans. Buckets spring into existence on first write.
pub trait KvBackend: Send + Sync {
    /// Get a value by key.
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Put a key-value pair.
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete a key.
    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()>;

    /// Check if a key exists.
    fn exists(&self, bucket: &str, key: &[u8]) -> Result<bool> {
        Ok(self.get(bucket, key)?.is_some())
    }

    /// Apply a batch of writes to one bucket atomically.
    fn write_batch(&self, bucket: &str, batch: WriteBatch) -> Result<()>;

    /// Scan a bucket in ascending key order.
    fn scan(&self, bucket: &str) -> Result<ScanIterator<'_>>;

    /// Remove a bucket and everything in it. Dropping a missing bucket is not an error.
    fn drop_bucket(&self, bucket: &str) -> Result<()>;

    /// Flush any buffered data to disk (if applicable).
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// A batch of write operations to be applied atomically.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    /// Operations in the batch.
    pub operations: Vec<BatchOp>,
}

/// A single operation in a write batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl WriteBatch {
    pub fn new() -> Self {
        Self { operations: Vec::new() }
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.operations.push(BatchOp::Put { key, value });
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.operations.push(BatchOp::Delete { key });
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

//! Storage port and the in-memory implementation.

use async_trait::async_trait;
use cinder_core::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Byte-level key-value store behind the states cache.
///
/// Implementations own physical storage only; freshness decisions stay
/// with the cache.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the payload stored under a key, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a payload under a key, overwriting any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Process-local store for tests and standalone operation.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical writes accepted so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

//! The build-state cache.

use std::sync::Arc;

use cinder_core::{BuildState, RepositoryId, Result};
use tracing::{debug, warn};

use crate::config::StatesConfig;
use crate::keys;
use crate::memcached::MemcachedStore;
use crate::policy;
use crate::record::StateRecord;
use crate::retry::RetryStore;
use crate::store::{MemoryStore, StateStore};

/// Latest-build-state cache, keyed per repository and per branch.
///
/// Writes are gated by the freshness policy independently for the branch
/// entry and the repository-global entry; reads are plain lookups with no
/// freshness logic.
#[derive(Clone)]
pub struct StatesCache {
    store: Arc<dyn StateStore>,
}

impl StatesCache {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Build a cache from configuration: the remote store behind the retry
    /// wrapper when an endpoint is given, the in-memory store otherwise.
    pub fn from_config(config: &StatesConfig) -> Self {
        let store: Arc<dyn StateStore> = match &config.endpoint {
            Some(endpoint) => Arc::new(RetryStore::new(
                MemcachedStore::new(endpoint.clone()),
                config.retries,
                config.jitter,
            )),
            None => Arc::new(MemoryStore::new()),
        };
        Self { store }
    }

    /// Decoded record for the requested scope, or `None` when nothing has
    /// ever been written there. Undecodable payloads count as missing.
    pub async fn fetch(
        &self,
        id: &RepositoryId,
        branch: Option<&str>,
    ) -> Result<Option<StateRecord>> {
        self.read(&keys::state_key(id, branch)).await
    }

    /// The outcome alone, for status and badge lookups.
    pub async fn fetch_state(
        &self,
        id: &RepositoryId,
        branch: Option<&str>,
    ) -> Result<Option<BuildState>> {
        Ok(self.fetch(id, branch).await?.map(|record| record.state))
    }

    /// Record a build completion, updating the branch entry (when a branch
    /// is given) and the repository-global entry. Each entry is only
    /// touched when the record is strictly newer than what is stored
    /// there; a skipped entry is not an error and does not block the
    /// other.
    pub async fn write(
        &self,
        id: &RepositoryId,
        branch: Option<&str>,
        source: impl Into<StateRecord>,
    ) -> Result<()> {
        let record = source.into();
        let payload = record.to_bytes()?;

        if let Some(branch) = branch {
            self.write_if_newer(&keys::branch_key(id, branch), &record, &payload)
                .await?;
        }
        self.write_if_newer(&keys::repository_key(id), &record, &payload)
            .await?;

        Ok(())
    }

    async fn write_if_newer(
        &self,
        key: &str,
        record: &StateRecord,
        payload: &[u8],
    ) -> Result<()> {
        let current = self.read(key).await?;
        if !policy::should_update(current.and_then(|r| r.finished_at), record.finished_at) {
            debug!("Skipping write to {}, stored state is newer", key);
            return Ok(());
        }
        self.store.set(key, payload).await?;
        debug!("Wrote {:?} under {}", record.state, key);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<StateRecord>> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        match StateRecord::from_bytes(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!("Discarding undecodable payload under {}: {}", key, err);
                Ok(None)
            }
        }
    }
}

//! Retry decorator for stores on an unreliable transport.

use async_trait::async_trait;
use cinder_core::{Error, Result};
use std::time::Duration;
use tracing::warn;

use crate::store::StateStore;

/// Wraps a store with bounded retries and a randomized pause between
/// attempts, so callers that failed together do not all come back at the
/// same instant.
///
/// Only transient failures are retried; on exhaustion, and immediately for
/// everything else, the caller sees a single `Unavailable` failure kind.
pub struct RetryStore<S> {
    inner: S,
    retries: u32,
    jitter: Duration,
}

impl<S> RetryStore<S> {
    pub fn new(inner: S, retries: u32, jitter: Duration) -> Self {
        Self {
            inner,
            retries,
            jitter,
        }
    }

    async fn pause(&self) {
        if self.jitter.is_zero() {
            return;
        }
        let delay = self.jitter.mul_f64(rand::random::<f64>());
        tokio::time::sleep(delay).await;
    }
}

fn unavailable(err: Error) -> Error {
    Error::Unavailable(err.to_string())
}

#[async_trait]
impl<S: StateStore> StateStore for RetryStore<S> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut attempt = 0;
        loop {
            match self.inner.get(key).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!("Cache get failed ({}), retry {}/{}", err, attempt, self.retries);
                    self.pause().await;
                }
                Err(err) => return Err(unavailable(err)),
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.inner.set(key, value).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!("Cache set failed ({}), retry {}/{}", err, attempt, self.retries);
                    self.pause().await;
                }
                Err(err) => return Err(unavailable(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with a transient error until `failures` calls have been made.
    struct FlakyStore {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyStore {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl StateStore for FlakyStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            if self.calls.fetch_add(1, Ordering::Relaxed) < self.failures {
                Err(Error::Connection("refused".to_string()))
            } else {
                Ok(Some(b"ok".to_vec()))
            }
        }

        async fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::Relaxed) < self.failures {
                Err(Error::Connection("refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    /// Always fails with a non-transient error.
    struct BrokenStore {
        calls: AtomicU32,
    }

    #[async_trait]
    impl StateStore for BrokenStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(Error::InvalidKey(key.to_string()))
        }

        async fn set(&self, key: &str, _value: &[u8]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(Error::InvalidKey(key.to_string()))
        }
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let store = RetryStore::new(FlakyStore::new(2), 2, Duration::ZERO);
        assert_eq!(store.get("state:1").await.unwrap(), Some(b"ok".to_vec()));
        assert_eq!(store.inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_unavailable() {
        let store = RetryStore::new(FlakyStore::new(10), 2, Duration::ZERO);
        let err = store.set("state:1", b"payload").await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert_eq!(store.inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_non_transient_errors_are_not_retried() {
        let store = RetryStore::new(
            BrokenStore {
                calls: AtomicU32::new(0),
            },
            5,
            Duration::ZERO,
        );
        let err = store.get("state:1").await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert_eq!(store.inner.calls.load(Ordering::Relaxed), 1);
    }
}

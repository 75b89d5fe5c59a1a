//! Configuration for the states cache.

use std::time::Duration;

/// Configuration for the states cache store.
#[derive(Debug, Clone)]
pub struct StatesConfig {
    /// Address of the remote cache service (`host:port`). When unset the
    /// cache runs against a process-local store.
    pub endpoint: Option<String>,
    /// Maximum retries per operation against the remote service.
    pub retries: u32,
    /// Upper bound of the randomized pause between retries.
    pub jitter: Duration,
}

impl Default for StatesConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            retries: 2,
            jitter: Duration::from_millis(10),
        }
    }
}

impl StatesConfig {
    /// Create a config pointing at a remote cache service.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Set the retry bound.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the jitter window.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }
}

//! Build-state cache for Cinder CI.
//!
//! Tracks the most recent known build state per repository and per branch,
//! so dashboards, badges and status endpoints can answer "what is the
//! current state of repository R on branch B?" without touching the
//! primary datastore.

pub mod cache;
pub mod config;
pub mod keys;
pub mod memcached;
pub mod policy;
pub mod record;
pub mod retry;
pub mod store;

pub use cache::StatesCache;
pub use config::StatesConfig;
pub use memcached::MemcachedStore;
pub use record::StateRecord;
pub use retry::RetryStore;
pub use store::{MemoryStore, StateStore};

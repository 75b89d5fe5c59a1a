//! Strongly-typed identifiers for domain entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque stable identifier for a repository.
///
/// Upstream systems hand these out as integers or slugs; nothing in this
/// workspace inspects the contents beyond using them as key material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(String);

impl RepositoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for RepositoryId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RepositoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RepositoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

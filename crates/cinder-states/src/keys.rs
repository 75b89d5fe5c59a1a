//! Cache key derivation.

use cinder_core::RepositoryId;

/// Key for the latest state of a repository across all branches.
pub fn repository_key(id: &RepositoryId) -> String {
    format!("state:{}", id)
}

/// Key for the latest state of a repository on one branch.
pub fn branch_key(id: &RepositoryId, branch: &str) -> String {
    format!("state:{}-{}", id, branch)
}

/// Key for either scope.
pub fn state_key(id: &RepositoryId, branch: Option<&str>) -> String {
    match branch {
        Some(branch) => branch_key(id, branch),
        None => repository_key(id),
    }
}

//! Build outcome types.

use crate::ids::RepositoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Created,
    Started,
    Passed,
    Failed,
    Errored,
    Canceled,
}

impl BuildState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildState::Passed | BuildState::Failed | BuildState::Errored | BuildState::Canceled
        )
    }

    pub fn is_passing(&self) -> bool {
        matches!(self, BuildState::Passed)
    }
}

/// Anything that can report a build outcome and when it finished.
///
/// Builds, jobs and stages all qualify; consumers of this trait only ever
/// read these two accessors.
pub trait StateSource {
    fn state(&self) -> BuildState;
    fn finished_at(&self) -> Option<DateTime<Utc>>;
}

/// Summary of a single build as reported by the build lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    pub repository_id: RepositoryId,
    pub number: u32,
    pub branch: Option<String>,
    pub state: BuildState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StateSource for Build {
    fn state(&self) -> BuildState {
        self.state
    }

    fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_state_terminal() {
        assert!(BuildState::Passed.is_terminal());
        assert!(BuildState::Errored.is_terminal());
        assert!(!BuildState::Started.is_terminal());
        assert!(!BuildState::Created.is_terminal());
    }

    #[test]
    fn test_build_state_snake_case_wire_form() {
        let json = serde_json::to_string(&BuildState::Passed).unwrap();
        assert_eq!(json, "\"passed\"");
        let parsed: BuildState = serde_json::from_str("\"errored\"").unwrap();
        assert_eq!(parsed, BuildState::Errored);
    }
}

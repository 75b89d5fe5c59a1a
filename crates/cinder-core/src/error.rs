//! Error types for Cinder CI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Transport errors
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache protocol error: {0}")]
    Protocol(String),

    // Request errors
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Terminal
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    /// Whether a failed operation may succeed if issued again.
    ///
    /// Only connection-level failures qualify; malformed keys and encoding
    /// failures will fail the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

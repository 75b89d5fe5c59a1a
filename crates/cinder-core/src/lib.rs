//! Cinder CI Core
//!
//! Core domain types, traits, and error handling for Cinder CI.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used across all other crates.

pub mod build;
pub mod error;
pub mod ids;

pub use build::{Build, BuildState, StateSource};
pub use error::{Error, Result};
pub use ids::RepositoryId;

//! # Error Module
//!
//! Errors surfaced by the pathfinding engine.
//!
//! Most failure modes inside the engine never become errors: an unloaded
//! world, an unknown block and a failed collision computation are all folded
//! into a blocked/not-blocked answer by the obstruction oracle, and a search
//! that finds nothing produces an empty route. What remains here is what a
//! caller can actually observe on a [`PathHandle`](crate::pathfinding::PathHandle)
//! or while building the engine.

use thiserror::Error;

/// Engine error type.
///
/// `Clone` so that a single failed computation can be handed to every caller
/// waiting on the same job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathfinderError {
    /// The path computation itself faulted (for example a panicking oracle).
    #[error("path computation faulted: {0}")]
    ComputationFault(String),

    /// The worker pool is gone, so the job could not be run.
    #[error("worker pool has shut down")]
    PoolShutDown,

    /// Collision geometry for a block could not be computed.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// The configuration is malformed or out of range.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PathfinderError {
    fn from(e: serde_json::Error) -> Self {
        PathfinderError::Config(e.to_string())
    }
}

impl From<std::io::Error> for PathfinderError {
    fn from(e: std::io::Error) -> Self {
        PathfinderError::Config(e.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PathfinderError>;

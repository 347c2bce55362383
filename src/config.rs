//! # Configuration Module
//!
//! Tunables for the pathfinding engine. Every field has a default, so an
//! empty JSON object (or no file at all) yields the stock engine:
//!
//! ```json
//! {
//!     "path_cache_capacity": 500,
//!     "obstruction_cache_capacity": 50000,
//!     "obstruction_ttl_ms": 6000,
//!     "agent_half_width": 0.3,
//!     "agent_height": 1.9,
//!     "worker_count": 4,
//!     "max_expanded_nodes": 100000,
//!     "search_margin": 32,
//!     "reach_radius": 2
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use web_time::Duration;

use crate::error::{PathfinderError, Result};

/// Maximum number of computed routes kept by the path cache.
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 500;
/// Maximum number of obstruction answers kept by the default oracle.
pub const DEFAULT_OBSTRUCTION_CACHE_CAPACITY: usize = 50_000;
/// Lifetime of a cached obstruction answer, measured from when it was written.
pub const DEFAULT_OBSTRUCTION_TTL_MS: u64 = 6_000;
/// Half of the agent's horizontal footprint, in blocks.
pub const DEFAULT_AGENT_HALF_WIDTH: f64 = 0.3;
/// Height of the agent's footprint, in blocks.
pub const DEFAULT_AGENT_HEIGHT: f64 = 1.9;
/// Number of worker threads running path jobs.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathfinderConfig {
    /// Bound on the number of resident entries in the path cache.
    pub path_cache_capacity: usize,
    /// Bound on the number of resident entries in the obstruction cache.
    pub obstruction_cache_capacity: usize,
    /// Expire-after-write lifetime of obstruction answers, in milliseconds.
    pub obstruction_ttl_ms: u64,
    /// Half-width of the agent's bounding box.
    pub agent_half_width: f64,
    /// Height of the agent's bounding box.
    pub agent_height: f64,
    /// Size of the worker pool.
    pub worker_count: usize,
    /// Node expansion budget for a single search.
    pub max_expanded_nodes: usize,
    /// How far (in whole voxels) a search may stray outside the box spanned by start and goal.
    pub search_margin: i32,
    /// Chebyshev distance, in doubled cells, at which a `Reach` search counts as arrived.
    pub reach_radius: i32,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            path_cache_capacity: DEFAULT_PATH_CACHE_CAPACITY,
            obstruction_cache_capacity: DEFAULT_OBSTRUCTION_CACHE_CAPACITY,
            obstruction_ttl_ms: DEFAULT_OBSTRUCTION_TTL_MS,
            agent_half_width: DEFAULT_AGENT_HALF_WIDTH,
            agent_height: DEFAULT_AGENT_HEIGHT,
            worker_count: DEFAULT_WORKER_COUNT,
            max_expanded_nodes: 100_000,
            search_margin: 32,
            reach_radius: 2,
        }
    }
}

impl PathfinderConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PathfinderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.path_cache_capacity == 0 {
            return Err(PathfinderError::Config(
                "path_cache_capacity must be non-zero".into(),
            ));
        }
        if self.obstruction_cache_capacity == 0 {
            return Err(PathfinderError::Config(
                "obstruction_cache_capacity must be non-zero".into(),
            ));
        }
        if self.worker_count == 0 {
            return Err(PathfinderError::Config("worker_count must be non-zero".into()));
        }
        if !(self.agent_half_width > 0.0) || !(self.agent_height > 0.0) {
            return Err(PathfinderError::Config(
                "agent dimensions must be positive".into(),
            ));
        }
        if self.max_expanded_nodes == 0 {
            return Err(PathfinderError::Config(
                "max_expanded_nodes must be non-zero".into(),
            ));
        }
        if self.search_margin < 0 || self.reach_radius < 0 {
            return Err(PathfinderError::Config(
                "search_margin and reach_radius must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// The obstruction cache lifetime as a [`Duration`].
    pub fn obstruction_ttl(&self) -> Duration {
        Duration::from_millis(self.obstruction_ttl_ms)
    }
}

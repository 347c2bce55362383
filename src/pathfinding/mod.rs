//! # Pathfinding
//!
//! The public entry point of the engine.
//!
//! ## Architecture Overview
//! - [`Pathfinder`]: owns the worker pool, the path cache and the default
//!   obstruction oracle; turns requests into jobs and jobs into handles
//! - [`PathCache`]: job id → result, computed once per id at a time
//! - [`strategy`]: the search algorithms, one per [`TargetCategory`]
//! - [`obstruction`]: the "is this cell open?" policy the searches consult
//!
//! A request travels: `create_path` → worker pool → path cache → strategy →
//! oracle (many point queries) → cache entry → the caller's [`PathHandle`].
//! The submitting thread never blocks; only workers wait on the cache.
//!
//! ## Example
//! ```rust
//! use cgmath::Point3;
//! use voxel_pathfinder::config::PathfinderConfig;
//! use voxel_pathfinder::pathfinding::Pathfinder;
//! use voxel_pathfinder::voxels::{ChunkGenerator, World};
//!
//! let world = World::with_generator(ChunkGenerator::Empty);
//! let pathfinder = Pathfinder::new(PathfinderConfig::default(), world).unwrap();
//!
//! let handle = pathfinder.create_path(Point3::new(0, 0, 0), Point3::new(4, 0, 0));
//! let result = handle.wait().unwrap();
//! assert!(result.found());
//! ```

pub mod job;
pub mod obstruction;
pub mod path_cache;
pub mod request;
pub mod strategy;

use std::sync::Arc;

use log::{debug, error, info};

use crate::config::PathfinderConfig;
use crate::error::Result;
use crate::task_management::{Task, TaskManager};
use crate::voxels::{BlockAccess, Position, VoxelIndex};

pub use job::{NavigationJob, PathResult, Route, TargetCategory};
pub use obstruction::{BlockObstructionOracle, ObstructionOracle, OpenSpace};
pub use path_cache::PathCache;
pub use request::{generate_job_id, PathHandle, PathRequest};

use request::OutcomeSender;

/// Asynchronous, caching path computation over one world.
pub struct Pathfinder {
    config: PathfinderConfig,
    cache: Arc<PathCache>,
    default_oracle: Arc<dyn ObstructionOracle>,
    task_manager: TaskManager,
}

impl Pathfinder {
    /// Builds a pathfinder whose default oracle reads block geometry from `world`.
    ///
    /// # Errors
    /// [`PathfinderError::Config`] if `config` does not validate.
    pub fn new<W>(config: PathfinderConfig, world: W) -> Result<Self>
    where
        W: BlockAccess + 'static,
    {
        let oracle = Arc::new(BlockObstructionOracle::new(world, &config));
        Pathfinder::with_oracle(config, oracle)
    }

    /// Builds a pathfinder around a caller-supplied default oracle.
    pub fn with_oracle(
        config: PathfinderConfig,
        default_oracle: Arc<dyn ObstructionOracle>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "Pathfinder starting: {} workers, path cache {}, obstruction cache {} ({} ms)",
            config.worker_count,
            config.path_cache_capacity,
            config.obstruction_cache_capacity,
            config.obstruction_ttl_ms
        );
        Ok(Pathfinder {
            cache: Arc::new(PathCache::new(&config)),
            task_manager: TaskManager::new(config.worker_count),
            default_oracle,
            config,
        })
    }

    /// Routes an agent standing in `agent` to the centre of block `target`.
    pub fn create_path(&self, agent: VoxelIndex, target: VoxelIndex) -> PathHandle {
        self.create_path_with(PathRequest::to_block(agent, target))
    }

    /// Submits `request` to the worker pool. Never blocks.
    ///
    /// A pool that is gone is reported through the returned handle.
    pub fn create_path_with(&self, request: PathRequest) -> PathHandle {
        let job_id = request.job_id.unwrap_or_else(generate_job_id);
        let (sender, handle) = PathHandle::channel(job_id.clone());
        let task = PathTask {
            job_id,
            agent: request.agent,
            goal: request.goal,
            oracle: request
                .oracle
                .unwrap_or_else(|| self.default_oracle.clone()),
            category: request.category,
            cache: self.cache.clone(),
            sender,
        };

        // A rejected task drops its sender, which the handle reports as PoolShutDown.
        if let Err(e) = self.task_manager.publish_task(Box::new(task)) {
            error!("Could not submit job {}: {}", handle.job_id(), e);
        }
        handle
    }

    /// The oracle used by requests that do not bring their own.
    pub fn default_oracle(&self) -> Arc<dyn ObstructionOracle> {
        self.default_oracle.clone()
    }

    /// Drops every cached answer of the default oracle.
    pub fn invalidate_obstructions(&self) {
        self.default_oracle.invalidate_all();
    }

    pub fn path_cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Jobs submitted but not yet finished.
    pub fn pending_jobs(&self) -> usize {
        self.task_manager.num_tasks_in_flight()
    }
}

/// One submitted request, run on a worker.
struct PathTask {
    job_id: String,
    agent: VoxelIndex,
    goal: Position,
    oracle: Arc<dyn ObstructionOracle>,
    category: Option<TargetCategory>,
    cache: Arc<PathCache>,
    sender: OutcomeSender,
}

impl PathTask {
    fn run(&self) -> Result<Arc<PathResult>> {
        let job = NavigationJob::new(
            self.job_id.clone(),
            self.agent,
            self.goal,
            self.oracle.clone(),
            self.category,
        );
        self.cache.resolve(&job)
    }
}

impl Task for PathTask {
    fn process(self: Box<Self>) {
        let outcome = self.run();
        match &outcome {
            Ok(result) => debug!(
                "Job {} finished with {} waypoints",
                self.job_id,
                result.route.len()
            ),
            Err(e) => error!("Job {} failed: {}", self.job_id, e),
        }
        let PathTask {
            job_id, sender, ..
        } = *self;
        if sender.send(outcome).is_err() {
            debug!("Job {} finished with no handle left to receive it", job_id);
        }
    }

    fn describe(&self) -> String {
        format!("path job {}", self.job_id)
    }
}

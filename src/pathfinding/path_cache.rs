//! # Path Cache
//!
//! Job id → computed route. Bounded by LRU, single-flight per id.
//!
//! Identity is the job id alone: a second job reusing an id gets the first
//! job's result even if its endpoints differ. That reuse is logged.

use std::sync::Arc;

use log::{debug, warn};
use web_time::Instant;

use super::job::{NavigationJob, PathResult};
use super::strategy::{select_strategy, SearchLimits};
use crate::cache::LoadingCache;
use crate::config::PathfinderConfig;
use crate::error::Result;

pub struct PathCache {
    entries: LoadingCache<String, Arc<PathResult>>,
    limits: SearchLimits,
}

impl PathCache {
    pub fn new(config: &PathfinderConfig) -> Self {
        PathCache {
            entries: LoadingCache::new(config.path_cache_capacity, None),
            limits: SearchLimits::from_config(config),
        }
    }

    /// The result for `job`, computing it if no result for its id is cached.
    ///
    /// Blocks while another thread computes the same id, then returns the
    /// same `Arc`.
    ///
    /// # Errors
    /// [`PathfinderError::ComputationFault`](crate::error::PathfinderError::ComputationFault)
    /// if the computation panicked. Faults are not cached.
    pub fn resolve(&self, job: &NavigationJob) -> Result<Arc<PathResult>> {
        let result = self
            .entries
            .get_or_load(&job.id, |_| Ok(Arc::new(self.compute(job))))?;
        if !result.answers(job) {
            warn!(
                "Job {} reused a cached route computed for {:?} -> {:?} ({:?})",
                job.id, result.start, result.goal, result.category
            );
        }
        Ok(result)
    }

    /// Classification queries the oracle, so it runs here, inside the single flight.
    fn compute(&self, job: &NavigationJob) -> PathResult {
        let started = Instant::now();
        let category = job.resolve_category();
        let strategy = select_strategy(category);
        let route = strategy.pathfind(job, &self.limits);
        let elapsed = started.elapsed();
        debug!(
            "Job {} ({}) from {:?} to {:?}: {} waypoints in {} ms",
            job.id,
            strategy.name(),
            job.start,
            job.goal,
            route.len(),
            elapsed.as_millis()
        );
        PathResult {
            job_id: job.id.clone(),
            start: job.start,
            goal: job.goal,
            category,
            route,
            elapsed,
        }
    }

    /// The cached result for `id`, if any. Never computes.
    pub fn get(&self, id: &str) -> Option<Arc<PathResult>> {
        self.entries.get_if_present(&id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn invalidate(&self, id: &str) {
        self.entries.invalidate(&id.to_string());
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}

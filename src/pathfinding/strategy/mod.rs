//! # Path Strategies
//!
//! Search algorithms, one per [`TargetCategory`], looked up through a static
//! table with [`select_strategy`].
//!
//! Every strategy works on the doubled-resolution grid, asks the job's
//! oracle about each cell it considers, and stops on its own limits
//! ([`SearchLimits`]). Running out of options yields an empty route, never an
//! error.

mod astar;
mod smoothing;

use crate::config::PathfinderConfig;

use super::job::{NavigationJob, Route, TargetCategory};

pub use astar::GridSearch;
pub use smoothing::{line_of_sight, string_pull};

/// Work bounds shared by all strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    /// Cells the search may close before giving up.
    pub max_expanded_nodes: usize,
    /// Padding, in voxels, around the start/goal box that bounds the search.
    pub search_margin: i32,
    /// Chebyshev distance, in doubled cells, that counts as "reached" for
    /// [`TargetCategory::Reach`].
    pub reach_radius: i32,
}

impl SearchLimits {
    pub fn from_config(config: &PathfinderConfig) -> Self {
        SearchLimits {
            max_expanded_nodes: config.max_expanded_nodes,
            search_margin: config.search_margin,
            reach_radius: config.reach_radius,
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits::from_config(&PathfinderConfig::default())
    }
}

/// A search algorithm. Implementations are stateless and shared.
pub trait PathfindingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Computes a route for `job`. Empty when there is none within `limits`.
    fn pathfind(&self, job: &NavigationJob, limits: &SearchLimits) -> Route;
}

struct PreciseStrategy;
struct ReachStrategy;
struct DirectStrategy;

impl PathfindingStrategy for PreciseStrategy {
    fn name(&self) -> &'static str {
        "precise"
    }

    fn pathfind(&self, job: &NavigationJob, limits: &SearchLimits) -> Route {
        let cells = GridSearch::exact(job, limits).run();
        astar::to_route(&astar::compress(&cells))
    }
}

impl PathfindingStrategy for ReachStrategy {
    fn name(&self) -> &'static str {
        "reach"
    }

    fn pathfind(&self, job: &NavigationJob, limits: &SearchLimits) -> Route {
        let cells = GridSearch::within(job, limits, limits.reach_radius).run();
        astar::to_route(&astar::compress(&cells))
    }
}

impl PathfindingStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn pathfind(&self, job: &NavigationJob, limits: &SearchLimits) -> Route {
        let cells = GridSearch::exact(job, limits).run();
        astar::to_route(&string_pull(&cells, job.oracle.as_ref()))
    }
}

static STRATEGIES: [&(dyn PathfindingStrategy); 3] =
    [&PreciseStrategy, &ReachStrategy, &DirectStrategy];

/// The strategy serving `category`.
pub fn select_strategy(category: TargetCategory) -> &'static dyn PathfindingStrategy {
    STRATEGIES[category as usize]
}

//! Navigation jobs and their results.

use std::fmt;
use std::sync::Arc;

use web_time::Duration;

use super::obstruction::ObstructionOracle;
use crate::voxels::{agent_voxel_to_doubled, world_to_doubled, Position, VoxelIndex};

/// Ordered waypoints from start to goal. Empty when no path was found.
pub type Route = Vec<Position>;

/// What kind of target a job is heading for. Selects the search strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetCategory {
    /// Stand exactly on the goal cell.
    Precise = 0,
    /// Get close to a goal that may itself be solid (a block to interact with).
    Reach = 1,
    /// Stand on the goal cell, with the route pulled straight where there is line of sight.
    Direct = 2,
}

impl TargetCategory {
    /// `Reach` when the goal cell is blocked under `oracle`, otherwise `Precise`.
    pub fn classify(oracle: &dyn ObstructionOracle, goal: Position) -> Self {
        let cell = world_to_doubled(goal);
        if oracle.is_blocked(cell.x, cell.y, cell.z) {
            TargetCategory::Reach
        } else {
            TargetCategory::Precise
        }
    }
}

/// One navigation request, as handed to the path cache.
///
/// Cache identity is `id` alone; see [`PathCache`](super::PathCache).
#[derive(Clone)]
pub struct NavigationJob {
    pub id: String,
    /// Voxel the agent occupies.
    pub start: VoxelIndex,
    pub goal: Position,
    pub oracle: Arc<dyn ObstructionOracle>,
    /// `None` lets the path cache classify the goal when it computes the route.
    pub category: Option<TargetCategory>,
}

impl NavigationJob {
    pub fn new(
        id: impl Into<String>,
        start: VoxelIndex,
        goal: Position,
        oracle: Arc<dyn ObstructionOracle>,
        category: impl Into<Option<TargetCategory>>,
    ) -> Self {
        NavigationJob {
            id: id.into(),
            start,
            goal,
            oracle,
            category: category.into(),
        }
    }

    /// Doubled-resolution cell the search starts from.
    pub fn start_cell(&self) -> VoxelIndex {
        agent_voxel_to_doubled(self.start)
    }

    /// Doubled-resolution cell of the goal.
    pub fn goal_cell(&self) -> VoxelIndex {
        world_to_doubled(self.goal)
    }

    /// The requested category, or the one the goal cell implies under this job's oracle.
    pub fn resolve_category(&self) -> TargetCategory {
        self.category
            .unwrap_or_else(|| TargetCategory::classify(self.oracle.as_ref(), self.goal))
    }
}

impl fmt::Debug for NavigationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationJob")
            .field("id", &self.id)
            .field("start", &self.start)
            .field("goal", &self.goal)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// The outcome of one navigation job. Immutable; shared as `Arc<PathResult>`.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub job_id: String,
    pub start: VoxelIndex,
    pub goal: Position,
    pub category: TargetCategory,
    pub route: Route,
    /// Wall-clock time the search took. Diagnostic only.
    pub elapsed: Duration,
}

impl PathResult {
    /// Whether a route was found.
    pub fn found(&self) -> bool {
        !self.route.is_empty()
    }

    /// The last waypoint, if any.
    pub fn final_waypoint(&self) -> Option<Position> {
        self.route.last().copied()
    }

    /// Whether this result was computed for the same start and goal as `job`,
    /// and for its category when `job` names one.
    pub fn answers(&self, job: &NavigationJob) -> bool {
        self.start == job.start
            && self.goal == job.goal
            && job.category.map_or(true, |category| self.category == category)
    }
}

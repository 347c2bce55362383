// A* over the doubled-resolution grid.
//
// Nodes are cells, edges are the six face neighbours (unit cost), and the
// heuristic is the Manhattan distance to the arrival region, which never
// overestimates. The open set is a `BinaryHeap` turned into a min-heap by
// reversed ordering; ties on f-score are broken on h-score and then on cell
// coordinates, so the same oracle answers always give the same route.
//
// The grid is unbounded, so scores and parents live in `HashMap`s keyed by
// cell. Each cell's oracle answer is memoised for the duration of one search.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use cgmath::Point3;
use log::trace;

use super::SearchLimits;
use crate::pathfinding::job::{NavigationJob, Route};
use crate::pathfinding::obstruction::ObstructionOracle;
use crate::voxels::block::block_side::BlockSide;
use crate::voxels::{doubled_to_world, VoxelIndex};

struct OpenEntry {
    cell: VoxelIndex,
    f_score: i64,
    h_score: i64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.h_score.cmp(&self.h_score))
            .then_with(|| cell_key(other.cell).cmp(&cell_key(self.cell)))
    }
}

fn cell_key(cell: VoxelIndex) -> (i32, i32, i32) {
    (cell.x, cell.y, cell.z)
}

/// One A* run from a job's start cell towards its goal cell.
pub struct GridSearch<'a> {
    oracle: &'a dyn ObstructionOracle,
    start: VoxelIndex,
    goal: VoxelIndex,
    /// Chebyshev distance from `goal` at which a cell counts as arrived.
    radius: i32,
    min: VoxelIndex,
    max: VoxelIndex,
    max_expanded: usize,
    blocked: HashMap<VoxelIndex, bool>,
}

impl<'a> GridSearch<'a> {
    /// A search that must end on the goal cell itself.
    pub fn exact(job: &'a NavigationJob, limits: &SearchLimits) -> Self {
        GridSearch::within(job, limits, 0)
    }

    /// A search that ends on any open cell within `radius` of the goal cell.
    pub fn within(job: &'a NavigationJob, limits: &SearchLimits, radius: i32) -> Self {
        let start = job.start_cell();
        let goal = job.goal_cell();
        let margin = limits.search_margin.max(0).saturating_mul(2);
        GridSearch {
            oracle: job.oracle.as_ref(),
            start,
            goal,
            radius: radius.max(0),
            min: Point3::new(
                start.x.min(goal.x).saturating_sub(margin),
                start.y.min(goal.y).saturating_sub(margin),
                start.z.min(goal.z).saturating_sub(margin),
            ),
            max: Point3::new(
                start.x.max(goal.x).saturating_add(margin),
                start.y.max(goal.y).saturating_add(margin),
                start.z.max(goal.z).saturating_add(margin),
            ),
            max_expanded: limits.max_expanded_nodes,
            blocked: HashMap::new(),
        }
    }

    fn is_blocked(&mut self, cell: VoxelIndex) -> bool {
        let oracle = self.oracle;
        *self
            .blocked
            .entry(cell)
            .or_insert_with(|| oracle.is_blocked(cell.x, cell.y, cell.z))
    }

    fn in_bounds(&self, cell: VoxelIndex) -> bool {
        (self.min.x..=self.max.x).contains(&cell.x)
            && (self.min.y..=self.max.y).contains(&cell.y)
            && (self.min.z..=self.max.z).contains(&cell.z)
    }

    fn heuristic(&self, cell: VoxelIndex) -> i64 {
        let radius = i64::from(self.radius);
        let axis = |a: i32, b: i32| ((i64::from(a) - i64::from(b)).abs() - radius).max(0);
        axis(cell.x, self.goal.x) + axis(cell.y, self.goal.y) + axis(cell.z, self.goal.z)
    }

    fn arrived(&mut self, cell: VoxelIndex) -> bool {
        if cell == self.goal {
            return true;
        }
        if self.radius == 0 {
            return false;
        }
        let within = (cell.x - self.goal.x).abs() <= self.radius
            && (cell.y - self.goal.y).abs() <= self.radius
            && (cell.z - self.goal.z).abs() <= self.radius;
        // Neighbours are only queued when open; only the start may be blocked here.
        within && (cell != self.start || !self.is_blocked(cell))
    }

    /// Runs the search. Returns every cell from start to arrival, or an empty
    /// vector if the limits were hit or the reachable region was exhausted.
    pub fn run(mut self) -> Vec<VoxelIndex> {
        if self.start == self.goal {
            return vec![self.start];
        }

        let mut g_score: HashMap<VoxelIndex, i64> = HashMap::new();
        let mut came_from: HashMap<VoxelIndex, VoxelIndex> = HashMap::new();
        let mut closed: HashSet<VoxelIndex> = HashSet::new();
        let mut open = BinaryHeap::new();

        g_score.insert(self.start, 0);
        let h_start = self.heuristic(self.start);
        open.push(OpenEntry {
            cell: self.start,
            f_score: h_start,
            h_score: h_start,
        });

        while let Some(current) = open.pop() {
            let cell = current.cell;
            if !closed.insert(cell) {
                continue;
            }

            if self.arrived(cell) {
                trace!(
                    "Search from {:?} arrived at {:?} after {} expansions",
                    self.start,
                    cell,
                    closed.len()
                );
                return reconstruct(&came_from, self.start, cell);
            }

            if closed.len() > self.max_expanded {
                trace!("Search from {:?} hit the expansion limit", self.start);
                return Vec::new();
            }

            let tentative_g = g_score.get(&cell).map_or(i64::MAX, |g| g + 1);
            for side in BlockSide::all() {
                let neighbour = cell + side.offset();
                if closed.contains(&neighbour) || !self.in_bounds(neighbour) {
                    continue;
                }
                if self.is_blocked(neighbour) {
                    continue;
                }

                let improved = match g_score.entry(neighbour) {
                    Entry::Occupied(mut known) if tentative_g < *known.get() => {
                        known.insert(tentative_g);
                        true
                    }
                    Entry::Occupied(_) => false,
                    Entry::Vacant(slot) => {
                        slot.insert(tentative_g);
                        true
                    }
                };
                if improved {
                    came_from.insert(neighbour, cell);
                    let h = self.heuristic(neighbour);
                    open.push(OpenEntry {
                        cell: neighbour,
                        f_score: tentative_g.saturating_add(h),
                        h_score: h,
                    });
                }
            }
        }

        Vec::new()
    }
}

fn reconstruct(
    came_from: &HashMap<VoxelIndex, VoxelIndex>,
    start: VoxelIndex,
    end: VoxelIndex,
) -> Vec<VoxelIndex> {
    let mut cells = vec![end];
    let mut current = end;
    while current != start {
        match came_from.get(&current) {
            Some(&previous) => {
                cells.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    cells.reverse();
    cells
}

/// Drops cells that lie on a straight run between their neighbours.
pub fn compress(cells: &[VoxelIndex]) -> Vec<VoxelIndex> {
    if cells.len() < 3 {
        return cells.to_vec();
    }
    let mut kept = vec![cells[0]];
    for window in cells.windows(3) {
        let incoming = window[1] - window[0];
        let outgoing = window[2] - window[1];
        if incoming != outgoing {
            kept.push(window[1]);
        }
    }
    kept.extend(cells.last());
    kept
}

/// Converts doubled cells into world-space waypoints.
pub fn to_route(cells: &[VoxelIndex]) -> Route {
    cells.iter().map(|cell| doubled_to_world(*cell)).collect()
}

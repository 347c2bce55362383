//! Line-of-sight route smoothing.

use crate::pathfinding::obstruction::ObstructionOracle;
use crate::voxels::VoxelIndex;

/// Samples per doubled cell along the dominant axis.
const SAMPLES_PER_CELL: i32 = 8;

/// Whether every doubled cell touched by the straight segment between the
/// centres of `from` and `to` is open.
///
/// Cells are treated as unit boxes centred on their index. The segment is
/// sampled so that no axis advances more than `1 / SAMPLES_PER_CELL` between
/// samples, and each sample checks every cell within half that distance, so
/// cells grazed at an edge or corner are checked too. The endpoints
/// themselves are not checked.
pub fn line_of_sight(from: VoxelIndex, to: VoxelIndex, oracle: &dyn ObstructionOracle) -> bool {
    let delta = to - from;
    let span = delta.x.abs().max(delta.y.abs()).max(delta.z.abs());
    if span <= 1 {
        return true;
    }

    let steps = span * SAMPLES_PER_CELL;
    let reach = 0.5 / f64::from(SAMPLES_PER_CELL);
    let covering = |centre: f64| {
        let low = (centre - reach + 0.5).floor() as i32;
        let high = (centre + reach + 0.5).floor() as i32;
        low..=high
    };

    let mut last_checked = None;
    for step in 0..=steps {
        let t = f64::from(step) / f64::from(steps);
        let x = f64::from(from.x) + f64::from(delta.x) * t;
        let y = f64::from(from.y) + f64::from(delta.y) * t;
        let z = f64::from(from.z) + f64::from(delta.z) * t;
        let cells = (covering(x), covering(y), covering(z));
        if last_checked.as_ref() == Some(&cells) {
            continue;
        }
        for cx in cells.0.clone() {
            for cy in cells.1.clone() {
                for cz in cells.2.clone() {
                    let cell = VoxelIndex::new(cx, cy, cz);
                    if cell == from || cell == to {
                        continue;
                    }
                    if oracle.is_blocked(cx, cy, cz) {
                        return false;
                    }
                }
            }
        }
        last_checked = Some(cells);
    }
    true
}

/// Removes every waypoint that the previous kept waypoint can see past.
///
/// Walks forward from an anchor for as long as the anchor still has line of
/// sight to the next cell; the last visible cell becomes the new anchor.
pub fn string_pull(cells: &[VoxelIndex], oracle: &dyn ObstructionOracle) -> Vec<VoxelIndex> {
    if cells.len() < 3 {
        return cells.to_vec();
    }

    let mut kept = vec![cells[0]];
    let mut anchor = 0;
    let mut index = 2;
    while index < cells.len() {
        if !line_of_sight(cells[anchor], cells[index], oracle) {
            anchor = index - 1;
            kept.push(cells[anchor]);
        }
        index += 1;
    }
    kept.extend(cells.last());
    kept
}

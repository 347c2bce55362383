//! # Obstruction Oracle
//!
//! Answers "can the agent stand here?" for a doubled-resolution cell.
//!
//! The default oracle, [`BlockObstructionOracle`], rebuilds the agent's
//! bounding box around the cell and sweeps it against the world's block
//! geometry (see [`footprint_blocked`]). Answers are cached per cell with an
//! expire-after-write lifetime, because the world can change underneath a
//! long-lived cache.
//!
//! Missing information is resolved without errors:
//! - world not loaded: *not blocked* (fail-open), and nothing is cached;
//! - a cell whose block cannot be determined: *blocked* (fail-safe);
//! - collision geometry that fails to compute: *blocked*.

use cgmath::Point3;
use log::warn;

use crate::cache::LoadingCache;
use crate::config::PathfinderConfig;
use crate::voxels::{doubled_to_world, Aabb, Block, BlockAccess, VoxelIndex};

/// Obstruction policy consumed by the search strategies.
///
/// Coordinates are doubled-resolution. Implementations are called
/// concurrently from every worker running a search.
pub trait ObstructionOracle: Send + Sync {
    fn is_blocked(&self, x: i32, y: i32, z: i32) -> bool;

    /// Forgets any cached answers. A no-op for oracles that keep none.
    fn invalidate_all(&self) {}
}

impl<F> ObstructionOracle for F
where
    F: Fn(i32, i32, i32) -> bool + Send + Sync,
{
    fn is_blocked(&self, x: i32, y: i32, z: i32) -> bool {
        self(x, y, z)
    }
}

/// An oracle under which nothing is ever blocked.
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenSpace;

impl ObstructionOracle for OpenSpace {
    fn is_blocked(&self, _x: i32, _y: i32, _z: i32) -> bool {
        false
    }
}

/// Sweeps `bounds` (an agent footprint) against the blocks of `world`.
///
/// Cells are visited X outermost, then Z, then Y; Y runs from one layer below
/// the box (the ground the agent stands on) up to the layer holding its top.
/// The first cell that blocks ends the scan.
///
/// - unknown block: blocked;
/// - block that does not impede movement: skipped;
/// - full cube on the ground layer: skipped, it is what the agent stands on;
/// - `exempt` state: skipped;
/// - any other full cube: blocked;
/// - partial block (on any layer): blocked if one of its collision boxes
///   intersects `bounds`, or if the boxes cannot be computed.
pub fn footprint_blocked<W>(bounds: &Aabb, world: &W, exempt: Option<Block>) -> bool
where
    W: BlockAccess + ?Sized,
{
    if !world.is_loaded() {
        return false;
    }

    let min_x = bounds.min.x.floor() as i32;
    let max_x = (bounds.max.x + 1.0).floor() as i32;
    let min_y = bounds.min.y.floor() as i32;
    let max_y = (bounds.max.y + 1.0).floor() as i32;
    let min_z = bounds.min.z.floor() as i32;
    let max_z = (bounds.max.z + 1.0).floor() as i32;
    let ground = min_y - 1;

    let mut boxes = Vec::new();
    for x in min_x..max_x {
        for z in min_z..max_z {
            for y in ground..max_y {
                let pos = Point3::new(x, y, z);
                match world.is_solid(pos, true) {
                    None => return true,
                    Some(false) => continue,
                    Some(true) => {}
                }
                let Some(block) = world.block_state(pos, true) else {
                    return true;
                };
                if block.is_full_cube() && y == ground {
                    continue;
                }
                if exempt == Some(block) {
                    continue;
                }
                if block.is_full_cube() {
                    return true;
                }

                boxes.clear();
                match world.collision_boxes(pos, block, bounds, &mut boxes) {
                    Ok(()) if boxes.is_empty() => {}
                    Ok(()) => return true,
                    Err(e) => {
                        warn!("Collision geometry failed at {:?}: {}", pos, e);
                        return true;
                    }
                }
            }
        }
    }

    false
}

/// The default oracle: block geometry from a [`BlockAccess`], cached per cell.
pub struct BlockObstructionOracle<W> {
    world: W,
    cache: LoadingCache<VoxelIndex, bool>,
    half_width: f64,
    height: f64,
    exempt: Option<Block>,
}

impl<W: BlockAccess> BlockObstructionOracle<W> {
    /// Builds an oracle over `world` sized and cached according to `config`.
    ///
    /// [`Block::PREBUILT`] is exempt from blocking.
    pub fn new(world: W, config: &PathfinderConfig) -> Self {
        BlockObstructionOracle {
            world,
            cache: LoadingCache::new(
                config.obstruction_cache_capacity,
                Some(config.obstruction_ttl()),
            ),
            half_width: config.agent_half_width,
            height: config.agent_height,
            exempt: Some(Block::PREBUILT),
        }
    }

    /// Replaces the exempt block state (`None` to exempt nothing).
    pub fn with_exempt(mut self, exempt: Option<Block>) -> Self {
        self.exempt = exempt;
        self
    }

    /// The agent box for a doubled-resolution cell.
    pub fn footprint(&self, cell: VoxelIndex) -> Aabb {
        Aabb::agent_footprint(doubled_to_world(cell), self.half_width, self.height)
    }

    /// Number of cached answers.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl<W: BlockAccess> ObstructionOracle for BlockObstructionOracle<W> {
    fn is_blocked(&self, x: i32, y: i32, z: i32) -> bool {
        // Not cached: the answer changes as soon as the world comes back.
        if !self.world.is_loaded() {
            return false;
        }
        let cell = Point3::new(x, y, z);
        self.cache
            .get_or_load(&cell, |cell| {
                Ok(footprint_blocked(
                    &self.footprint(*cell),
                    &self.world,
                    self.exempt,
                ))
            })
            .unwrap_or_else(|e| {
                warn!("Obstruction query at {:?} failed, assuming blocked: {}", cell, e);
                true
            })
    }

    fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PathfinderError, Result};
    use crate::voxels::chunk::Chunk;
    use crate::voxels::{BlockType, ChunkGenerator, Position, World};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use web_time::Duration;

    /// A room of known air spanning chunk coordinates -1..=1 on every axis.
    fn air_room() -> World {
        let world = World::new();
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    world.insert_chunk(Chunk::empty(&Point3::new(x, y, z)));
                }
            }
        }
        world
    }

    fn feet(x: f64, y: f64, z: f64) -> Aabb {
        Aabb::agent_footprint(Position::new(x, y, z), 0.3, 1.9)
    }

    #[test]
    fn open_air_is_not_blocked() {
        let world = air_room();
        assert!(!footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
    }

    #[test]
    fn unloaded_world_fails_open() {
        // No chunks at all: every cell is unknown, yet nothing is blocked.
        let world = World::new();
        world.set_loaded(false);
        let oracle = BlockObstructionOracle::new(world, &PathfinderConfig::default());
        for (x, y, z) in [(0, 0, 0), (-40, 7, 3), (1000, -1000, 5)] {
            assert!(!oracle.is_blocked(x, y, z));
        }
        assert_eq!(oracle.cached_entries(), 0);
    }

    #[test]
    fn unknown_cell_fails_safe() {
        let world = World::new();
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));

        // Known room, except the ground layer below the agent is unknown.
        let world = World::new();
        world.insert_chunk(Chunk::empty(&Point3::new(0, 0, 0)));
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
        assert!(!footprint_blocked(&feet(0.5, 1.0, 0.5), &world, None));
    }

    #[test]
    fn full_cube_ground_supports() {
        let world = air_room();
        world.set_block(Point3::new(0, -1, 0), Block::new(BlockType::DIRT));
        assert!(!footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
        // The same block at body height blocks.
        world.set_block(Point3::new(0, 1, 0), Block::new(BlockType::DIRT));
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
    }

    #[test]
    fn partial_ground_block_uses_geometry() {
        let world = air_room();
        // A slab on the ground layer stays below the feet.
        world.set_block(Point3::new(0, -1, 0), Block::new(BlockType::SLAB));
        assert!(!footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
        // A fence post on the ground layer reaches up into the body.
        world.set_block(Point3::new(0, -1, 0), Block::new(BlockType::FENCE));
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
    }

    #[test]
    fn standing_on_a_slab() {
        let world = air_room();
        world.set_block(Point3::new(0, 0, 0), Block::new(BlockType::SLAB));
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
        assert!(!footprint_blocked(&feet(0.5, 0.5, 0.5), &world, None));
    }

    #[test]
    fn fence_post_misses_box_beside_it() {
        let world = air_room();
        world.set_block(Point3::new(0, 0, 0), Block::new(BlockType::FENCE));
        // Agent box spans x 0.7..1.3; the post spans x 0.375..0.625.
        assert!(!footprint_blocked(&feet(1.0, 0.0, 0.5), &world, None));
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
    }

    #[test]
    fn exempt_state_never_blocks() {
        let world = air_room();
        world.fill(Point3::new(0, 0, 0), Point3::new(0, 2, 0), Block::PREBUILT);
        assert!(!footprint_blocked(&feet(0.5, 0.0, 0.5), &world, Some(Block::PREBUILT)));
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));

        // Other stone variants are not exempt.
        world.set_block(Point3::new(0, 1, 0), Block::new(BlockType::STONE));
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &world, Some(Block::PREBUILT)));
    }

    struct BrokenGeometry(World);

    impl BlockAccess for BrokenGeometry {
        fn is_loaded(&self) -> bool {
            self.0.is_loaded()
        }

        fn block_state(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<Block> {
            self.0.block_state(pos, load_if_absent)
        }

        fn collision_boxes(
            &self,
            _pos: VoxelIndex,
            _block: Block,
            _bounds: &Aabb,
            _out: &mut Vec<Aabb>,
        ) -> Result<()> {
            Err(PathfinderError::Geometry("no shape".into()))
        }
    }

    #[test]
    fn geometry_failure_blocks() {
        let world = air_room();
        // Carpet lies on top of the ground layer; its box stays under the feet.
        world.set_block(Point3::new(0, -1, 0), Block::new(BlockType::CARPET));
        assert!(!footprint_blocked(&feet(0.5, 0.0, 0.5), &world, None));
        let broken = BrokenGeometry(world);
        assert!(footprint_blocked(&feet(0.5, 0.0, 0.5), &broken, None));
    }

    struct CountingWorld {
        inner: World,
        lookups: AtomicUsize,
    }

    impl BlockAccess for CountingWorld {
        fn is_loaded(&self) -> bool {
            self.inner.is_loaded()
        }

        fn block_state(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<Block> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.block_state(pos, load_if_absent)
        }
    }

    #[test]
    fn answers_are_cached_until_expiry() {
        let config = PathfinderConfig {
            obstruction_ttl_ms: 50,
            ..PathfinderConfig::default()
        };
        let world = Arc::new(CountingWorld {
            inner: World::with_generator(ChunkGenerator::Empty),
            lookups: AtomicUsize::new(0),
        });
        let oracle = BlockObstructionOracle::new(world.clone(), &config);

        assert!(!oracle.is_blocked(1, 0, 1));
        let after_first = world.lookups.load(Ordering::SeqCst);
        assert!(after_first > 0);
        assert!(!oracle.is_blocked(1, 0, 1));
        assert_eq!(world.lookups.load(Ordering::SeqCst), after_first);

        // A world change is not seen while the answer is fresh...
        world.inner.set_block(Point3::new(0, 1, 0), Block::new(BlockType::WOOD));
        assert!(!oracle.is_blocked(1, 0, 1));

        // ...and is seen once it has expired.
        std::thread::sleep(Duration::from_millis(80));
        assert!(oracle.is_blocked(1, 0, 1));
        assert!(world.lookups.load(Ordering::SeqCst) > after_first);
    }

    #[test]
    fn invalidate_drops_answers() {
        let world = Arc::new(World::with_generator(ChunkGenerator::Empty));
        let oracle = BlockObstructionOracle::new(world.clone(), &PathfinderConfig::default());
        assert!(!oracle.is_blocked(1, 0, 1));
        world.set_block(Point3::new(0, 0, 0), Block::new(BlockType::WOOD));
        assert!(!oracle.is_blocked(1, 0, 1));
        oracle.invalidate_all();
        assert!(oracle.is_blocked(1, 0, 1));
    }

    #[test]
    fn cache_bound_holds() {
        let config = PathfinderConfig {
            obstruction_cache_capacity: 16,
            ..PathfinderConfig::default()
        };
        let oracle =
            BlockObstructionOracle::new(World::with_generator(ChunkGenerator::Empty), &config);
        for x in 0..64 {
            oracle.is_blocked(x, 0, 0);
        }
        assert_eq!(oracle.cached_entries(), 16);
    }
}

//! # World Module
//!
//! `World` manages a sparse collection of chunks and is the engine's own
//! implementation of [`BlockAccess`].
//!
//! ## Architecture
//!
//! Only chunks that have been generated or edited are kept in memory. A
//! world built with a [`ChunkGenerator`] fills in missing chunks the first
//! time a query asks for them with `load_if_absent`; a world without one
//! reports cells in missing chunks as unknown, which the obstruction oracle
//! treats as blocked. That makes a generator-less world a convenient closed
//! room for tests.
//!
//! ## Thread Safety
//!
//! The chunk map and each chunk sit behind [`MtResource`] read-write locks.
//! Queries from worker threads take read guards only, except when they have to
//! generate a chunk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use cgmath::Point3;

use super::block_access::BlockAccess;
use super::chunk::{split_voxel, Chunk};
use super::{Block, VoxelIndex};
use crate::core::MtResource;

/// How chunks missing from the world get created.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChunkGenerator {
    /// All air.
    Empty,
    /// Every cell holds the given block.
    Solid(Block),
    /// `block` below world height `ground_height`, air above.
    Layered { ground_height: i32, block: Block },
    /// Perlin-noise terrain with the given seed.
    Perlin { seed: u32 },
}

impl ChunkGenerator {
    /// Builds the chunk at chunk coordinates `position`.
    pub fn generate(&self, position: &Point3<i32>) -> Chunk {
        match *self {
            ChunkGenerator::Empty => Chunk::empty(position),
            ChunkGenerator::Solid(block) => Chunk::filled(position, block),
            ChunkGenerator::Layered {
                ground_height,
                block,
            } => Chunk::layered(position, ground_height, block),
            ChunkGenerator::Perlin { seed } => Chunk::perlin(position, seed),
        }
    }
}

/// A voxel world composed of chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_pathfinder::voxels::{Block, BlockAccess, BlockType, World};
///
/// let world = World::new();
/// world.set_block(Point3::new(3, 0, 3), Block::new(BlockType::STONE));
///
/// assert_eq!(
///     world.block_state(Point3::new(3, 0, 3), false),
///     Some(Block::new(BlockType::STONE))
/// );
/// // Same chunk, never written: air.
/// assert_eq!(world.block_state(Point3::new(4, 0, 3), false), Some(Block::AIR));
/// // A chunk that was never created: unknown.
/// assert_eq!(world.block_state(Point3::new(100, 0, 0), true), None);
/// ```
pub struct World {
    chunks: MtResource<HashMap<Point3<i32>, MtResource<Chunk>>>,
    generator: Option<ChunkGenerator>,
    loaded: AtomicBool,
}

impl World {
    /// An empty, loaded world with no generator.
    pub fn new() -> Self {
        World {
            chunks: MtResource::new(HashMap::new()),
            generator: None,
            loaded: AtomicBool::new(true),
        }
    }

    /// An empty, loaded world that generates missing chunks with `generator`.
    pub fn with_generator(generator: ChunkGenerator) -> Self {
        World {
            generator: Some(generator),
            ..World::new()
        }
    }

    /// Marks the world available or unavailable.
    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::Release);
    }

    /// Returns the chunk at `position`, creating it if needed.
    ///
    /// New chunks come from the generator, or are empty when there is none.
    pub fn add_chunk_at(&self, position: Point3<i32>) -> MtResource<Chunk> {
        if let Some(chunk) = self.get_chunk_at(position) {
            return chunk;
        }

        let chunk = self
            .generator
            .unwrap_or(ChunkGenerator::Empty)
            .generate(&position);

        // Another thread may have generated it while we did; keep theirs.
        self.chunks
            .get_mut()
            .entry(position)
            .or_insert_with(|| MtResource::new(chunk))
            .clone()
    }

    /// Replaces whatever chunk sits at `chunk.position`.
    pub fn insert_chunk(&self, chunk: Chunk) {
        let position = chunk.position;
        self.chunks.get_mut().insert(position, MtResource::new(chunk));
    }

    /// The chunk at chunk coordinates `pos`, if it exists.
    pub fn get_chunk_at(&self, pos: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get().get(&pos).cloned()
    }

    fn chunk_holding(
        &self,
        voxel: VoxelIndex,
        load_if_absent: bool,
    ) -> Option<(MtResource<Chunk>, [usize; 3])> {
        let (chunk_pos, local) = split_voxel(voxel);
        let chunk = match self.get_chunk_at(chunk_pos) {
            Some(chunk) => chunk,
            None if load_if_absent && self.generator.is_some() => self.add_chunk_at(chunk_pos),
            None => return None,
        };
        Some((chunk, local))
    }

    /// Number of chunks in memory.
    pub fn chunk_count(&self) -> usize {
        self.chunks.get().len()
    }

    /// Writes `block` at `voxel`, creating its chunk if needed.
    pub fn set_block(&self, voxel: VoxelIndex, block: Block) {
        let (chunk_pos, [x, y, z]) = split_voxel(voxel);
        self.add_chunk_at(chunk_pos).get_mut().set_block_at(x, y, z, block);
    }

    /// Writes `block` into every voxel of the inclusive box spanned by `a` and `b`.
    pub fn fill(&self, a: VoxelIndex, b: VoxelIndex, block: Block) {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.set_block(Point3::new(x, y, z), block);
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        World::new()
    }
}

impl BlockAccess for World {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn block_state(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<Block> {
        let (chunk, [x, y, z]) = self.chunk_holding(pos, load_if_absent)?;
        let block = chunk.get().get_block_at(x, y, z);
        Some(block)
    }

    /// Answered from the chunk's solidity mask.
    fn is_solid(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<bool> {
        let (chunk, [x, y, z]) = self.chunk_holding(pos, load_if_absent)?;
        let solid = chunk.get().is_block_solid(x, y, z);
        Some(solid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::BlockType;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn generator_fills_on_demand() {
        let world = World::with_generator(ChunkGenerator::Layered {
            ground_height: 0,
            block: Block::new(BlockType::GRASS),
        });
        assert_eq!(world.block_state(Point3::new(0, -1, 0), false), None);
        assert_eq!(world.chunk_count(), 0);

        assert_eq!(
            world.block_state(Point3::new(0, -1, 0), true),
            Some(Block::new(BlockType::GRASS))
        );
        assert_eq!(world.block_state(Point3::new(0, 0, 0), true), Some(Block::AIR));
        assert_eq!(world.chunk_count(), 2);
    }

    #[test]
    fn solidity_follows_edits() {
        let world = World::with_generator(ChunkGenerator::Layered {
            ground_height: 0,
            block: Block::new(BlockType::STONE),
        });
        assert_eq!(world.is_solid(Point3::new(2, -1, 2), true), Some(true));
        assert_eq!(world.is_solid(Point3::new(2, 0, 2), true), Some(false));
        world.set_block(Point3::new(2, 0, 2), Block::new(BlockType::FENCE));
        assert_eq!(world.is_solid(Point3::new(2, 0, 2), false), Some(true));
        world.set_block(Point3::new(2, -1, 2), Block::AIR);
        assert_eq!(world.is_solid(Point3::new(2, -1, 2), false), Some(false));
        assert_eq!(World::new().is_solid(Point3::new(0, 0, 0), true), None);
    }

    #[test]
    fn no_generator_means_unknown() {
        let world = World::new();
        assert_eq!(world.block_state(Point3::new(0, 0, 0), true), None);
        assert_eq!(world.chunk_count(), 0);
    }

    #[test]
    fn fill_spans_chunks() {
        let world = World::new();
        world.fill(
            Point3::new(15, 0, 0),
            Point3::new(16, 1, 0),
            Block::new(BlockType::WHITE),
        );
        assert_eq!(world.chunk_count(), 2);
        for voxel in [Point3::new(15, 0, 0), Point3::new(16, 1, 0)] {
            assert_eq!(world.block_state(voxel, false), Some(Block::new(BlockType::WHITE)));
        }
    }

    #[test]
    fn loaded_flag_toggles() {
        let world = World::new();
        assert!(world.is_loaded());
        world.set_loaded(false);
        assert!(!world.is_loaded());
    }

    #[test]
    fn concurrent_generation_keeps_one_chunk() {
        let world = Arc::new(World::with_generator(ChunkGenerator::Empty));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let world = world.clone();
                thread::spawn(move || world.add_chunk_at(Point3::new(0, 0, 0)))
            })
            .collect();
        let chunks: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        assert_eq!(world.chunk_count(), 1);
        for chunk in &chunks[1..] {
            assert!(chunk.ptr_eq(&chunks[0]));
        }
    }
}

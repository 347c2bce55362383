//! # Chunk Module
//!
//! A `Chunk` holds a 16x16x16 cube of blocks. Alongside the dense block
//! array it keeps `solid_array`, one bit per block set when the block impedes
//! movement, so that "is anything in the way here" is a single bit test.
//!
//! Blocks are stored X fastest, then Y, then Z:
//! `index = x + 16 * y + 256 * z`.

use bitvec::prelude::BitVec;
use cgmath::Point3;
use chunk_creation::ChunkCreationIterator;
use noise::{NoiseFn, Perlin};

use super::block::block_type::BlockType;
use super::block::Block;
use super::VoxelIndex;

pub mod chunk_creation;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Threshold above which Perlin noise is considered solid for terrain generation.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered solid for terrain generation.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// A 16x16x16 block of the world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,
    solid_array: BitVec,
    blocks: Vec<Block>,
}

/// Splits a world voxel into the chunk that holds it and its local coordinates there.
pub fn split_voxel(voxel: VoxelIndex) -> (Point3<i32>, [usize; 3]) {
    let chunk = Point3::new(
        voxel.x.div_euclid(CHUNK_DIMENSION),
        voxel.y.div_euclid(CHUNK_DIMENSION),
        voxel.z.div_euclid(CHUNK_DIMENSION),
    );
    let local = [
        voxel.x.rem_euclid(CHUNK_DIMENSION) as usize,
        voxel.y.rem_euclid(CHUNK_DIMENSION) as usize,
        voxel.z.rem_euclid(CHUNK_DIMENSION) as usize,
    ];
    (chunk, local)
}

impl Chunk {
    /// A chunk of air.
    pub fn empty(position: &Point3<i32>) -> Self {
        ChunkCreationIterator::new(*position).return_chunk()
    }

    /// A chunk where every cell holds `block`.
    pub fn filled(position: &Point3<i32>, block: Block) -> Self {
        let mut cci = ChunkCreationIterator::new(*position);
        for _ in 0..CHUNK_SIZE {
            cci.push_block(block);
        }
        cci.return_chunk()
    }

    /// A chunk where every cell below world height `ground_height` holds `block`
    /// and everything at or above it is air.
    pub fn layered(position: &Point3<i32>, ground_height: i32, block: Block) -> Self {
        let mut cci = ChunkCreationIterator::new(*position);
        for _ in 0..CHUNK_SIZE {
            if cci.next_world_position().y < ground_height {
                cci.push_block(block);
            } else {
                cci.push_block(Block::AIR);
            }
        }
        cci.return_chunk()
    }

    /// Terrain from 3D Perlin noise: solid wherever the sample falls outside
    /// the band between the two thresholds, which leaves caves and overhangs.
    pub fn perlin(position: &Point3<i32>, seed: u32) -> Self {
        let perlin = Perlin::new(seed);
        let mut cci = ChunkCreationIterator::new(*position);

        for _ in 0..CHUNK_SIZE {
            let world = cci.next_world_position();
            let sample = perlin.get(Self::to_perlin_pos(world, PERLIN_SCALE_FACTOR));
            if !(PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&sample) {
                cci.push_block_type(BlockType::get_random_terrain());
            } else {
                cci.push_block(Block::AIR);
            }
        }

        cci.return_chunk()
    }

    fn to_perlin_pos(pos: Point3<i32>, scale_factor: f64) -> [f64; 3] {
        [
            pos.x as f64 * scale_factor,
            pos.y as f64 * scale_factor,
            pos.z as f64 * scale_factor,
        ]
    }

    fn index(cx: usize, cy: usize, cz: usize) -> usize {
        cx + CHUNK_DIMENSION as usize * cy + CHUNK_PLANE_SIZE as usize * cz
    }

    /// The block at chunk-local coordinates.
    ///
    /// # Panics
    /// Panics if a coordinate is not below `CHUNK_DIMENSION`.
    pub fn get_block_at(&self, cx: usize, cy: usize, cz: usize) -> Block {
        self.blocks[Self::index(cx, cy, cz)]
    }

    /// Replaces the block at chunk-local coordinates, keeping the solidity mask in step.
    pub fn set_block_at(&mut self, cx: usize, cy: usize, cz: usize, block: Block) {
        let i = Self::index(cx, cy, cz);
        self.blocks[i] = block;
        self.solid_array.set(i, block.blocks_movement());
    }

    /// Whether the block at chunk-local coordinates impedes movement.
    pub fn is_block_solid(&self, cx: usize, cy: usize, cz: usize) -> bool {
        self.solid_array[Self::index(cx, cy, cz)]
    }
}

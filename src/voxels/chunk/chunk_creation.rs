//! # Chunk Creation Module
//!
//! A builder that fills a chunk one block at a time in storage order
//! (X fastest, then Y, then Z) while keeping the solidity mask in step with
//! the block array.

use bitvec::vec::BitVec;
use cgmath::Point3;

use crate::voxels::block::{block_type::BlockType, Block};

use super::{Chunk, CHUNK_DIMENSION, CHUNK_SIZE};

/// Builds a [`Chunk`] by pushing blocks in storage order.
pub struct ChunkCreationIterator {
    /// Chunk coordinates of the chunk being built
    position: Point3<i32>,
    /// One bit per pushed block: set when the block impedes movement
    solid_array: BitVec,
    blocks: Vec<Block>,
}

impl ChunkCreationIterator {
    /// Starts building the chunk at chunk coordinates `position`.
    pub fn new(position: Point3<i32>) -> Self {
        ChunkCreationIterator {
            position,
            solid_array: BitVec::with_capacity(CHUNK_SIZE as usize),
            blocks: Vec::with_capacity(CHUNK_SIZE as usize),
        }
    }

    /// World coordinates of the block the next push will fill.
    pub fn next_world_position(&self) -> Point3<i32> {
        let i = self.blocks.len() as i32;
        Point3::new(
            self.position.x * CHUNK_DIMENSION + i % CHUNK_DIMENSION,
            self.position.y * CHUNK_DIMENSION + (i / CHUNK_DIMENSION) % CHUNK_DIMENSION,
            self.position.z * CHUNK_DIMENSION + i / (CHUNK_DIMENSION * CHUNK_DIMENSION),
        )
    }

    /// Appends `block` at the current position.
    pub fn push_block(&mut self, block: Block) {
        debug_assert!(self.blocks.len() < CHUNK_SIZE as usize);
        self.solid_array.push(block.blocks_movement());
        self.blocks.push(block);
    }

    /// Appends the default variant of `block_type`.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        self.push_block(Block::new(block_type));
    }

    /// Finishes the chunk, padding any unfilled cells with air.
    pub fn return_chunk(mut self) -> Chunk {
        while self.blocks.len() < CHUNK_SIZE as usize {
            self.push_block(Block::AIR);
        }
        Chunk {
            position: self.position,
            solid_array: self.solid_array,
            blocks: self.blocks,
        }
    }
}

//! # Block Access
//!
//! The read-only view of a world that the obstruction oracle consumes.
//!
//! Implementations must tolerate concurrent calls from several worker
//! threads; the pathfinder never synchronises around them.

use super::{Aabb, Block, VoxelIndex};
use crate::error::Result;

/// Read access to block state.
pub trait BlockAccess: Send + Sync {
    /// Whether the world is available at all. While this is `false`, the
    /// default oracle reports every location as open.
    fn is_loaded(&self) -> bool;

    /// The block at `pos`, or `None` if its state cannot be determined
    /// (for example an ungenerated region when `load_if_absent` is `false`,
    /// or a region the host has no data for).
    fn block_state(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<Block>;

    /// Whether the block at `pos` impedes movement, `None` when unknown.
    ///
    /// Asked before [`block_state`](Self::block_state) for every scanned
    /// cell, so hosts with a cheaper answer than a full block lookup should
    /// override it.
    fn is_solid(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<bool> {
        self.block_state(pos, load_if_absent)
            .map(|block| block.blocks_movement())
    }

    /// Appends to `out` every collision box of `block` (placed at `pos`) that
    /// intersects `bounds`.
    ///
    /// The default implementation uses the block's static shape table. Hosts
    /// with context-dependent geometry (connected fences, rotated stairs)
    /// override it. An error is treated by the oracle as a collision.
    fn collision_boxes(
        &self,
        pos: VoxelIndex,
        block: Block,
        bounds: &Aabb,
        out: &mut Vec<Aabb>,
    ) -> Result<()> {
        out.extend(
            block
                .shape()
                .iter()
                .map(|shape| Aabb::from_array(*shape).offset_to(pos))
                .filter(|shape| shape.intersects(bounds)),
        );
        Ok(())
    }
}

impl<T: BlockAccess + ?Sized> BlockAccess for std::sync::Arc<T> {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn block_state(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<Block> {
        (**self).block_state(pos, load_if_absent)
    }

    fn is_solid(&self, pos: VoxelIndex, load_if_absent: bool) -> Option<bool> {
        (**self).is_solid(pos, load_if_absent)
    }

    fn collision_boxes(
        &self,
        pos: VoxelIndex,
        block: Block,
        bounds: &Aabb,
        out: &mut Vec<Aabb>,
    ) -> Result<()> {
        (**self).collision_boxes(pos, block, bounds, out)
    }
}

//! # Voxels
//!
//! The block world the pathfinder navigates.
//!
//! ## Architecture
//!
//! * **Block**: a compact `(type, variant)` pair with movement and collision properties
//! * **Chunk**: a 16x16x16 array of blocks plus a bit mask of movement-blocking cells
//! * **World**: a sparse map of chunks, generated on demand, with a global "loaded" flag
//! * **BlockAccess**: the read-only capability the obstruction oracle consumes; `World`
//!   implements it, and hosts with their own world representation can too
//! * **Aabb**: axis-aligned boxes for footprint and collision tests
//!
//! ## Coordinates
//!
//! A [`VoxelIndex`] names a whole block. A [`Position`] is a continuous world
//! point. Obstruction queries use a *doubled* index, where each block is split
//! in two along every axis; see [`world_to_doubled`] and [`doubled_to_world`].

use cgmath::Point3;

pub mod aabb;
pub mod block;
pub mod block_access;
pub mod chunk;
pub mod world;

pub use aabb::Aabb;
pub use block::{block_type::BlockType, Block};
pub use block_access::BlockAccess;
pub use world::{ChunkGenerator, World};

/// Integer coordinates of a block (or of a half-block cell in doubled space).
pub type VoxelIndex = Point3<i32>;

/// Continuous world-space coordinates.
pub type Position = Point3<f64>;

/// Converts a world position to its doubled-resolution index.
pub fn world_to_doubled(position: Position) -> VoxelIndex {
    Point3::new(
        (position.x * 2.0).floor() as i32,
        (position.y * 2.0).floor() as i32,
        (position.z * 2.0).floor() as i32,
    )
}

/// Converts a doubled-resolution index back to the world position it stands for.
pub fn doubled_to_world(index: VoxelIndex) -> Position {
    Point3::new(
        index.x as f64 / 2.0,
        index.y as f64 / 2.0,
        index.z as f64 / 2.0,
    )
}

/// The doubled index of an agent standing in `voxel`: horizontally centred,
/// feet on the block's floor.
pub fn agent_voxel_to_doubled(voxel: VoxelIndex) -> VoxelIndex {
    Point3::new(voxel.x * 2 + 1, voxel.y * 2, voxel.z * 2 + 1)
}

/// The centre of the block at `voxel`.
pub fn voxel_center(voxel: VoxelIndex) -> Position {
    Point3::new(
        voxel.x as f64 + 0.5,
        voxel.y as f64 + 0.5,
        voxel.z as f64 + 0.5,
    )
}

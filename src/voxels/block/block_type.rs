//! # Block Type Module
//!
//! The block types of the voxel world and the physical properties the
//! obstruction oracle cares about: whether a type impedes movement, whether it
//! fills its whole cell, and what collision boxes it has when it does not.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types in the voxel world.
///
/// The `FromPrimitive` derive converts the compact stored id back into the
/// enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    AIR,
    /// Plain dirt.
    DIRT,
    /// Grass-topped dirt.
    GRASS,
    /// A log.
    WOOD,
    /// A plain white block, used for test scenes.
    WHITE,
    /// Stone. Its variants are the stone family (granite, diorite, ...).
    STONE,
    /// Half-height slab. Variant 0 sits on the floor of the cell, variant 1 on the ceiling.
    SLAB,
    /// A fence post, taller than a block and thinner than one.
    FENCE,
    /// A thin floor covering.
    CARPET,
    /// Wall torch. Has no collision at all.
    TORCH,
}

/// `[min_x, min_y, min_z, max_x, max_y, max_z]` in block-local coordinates.
pub type ShapeBox = [f64; 6];

const FULL_CUBE: &[ShapeBox] = &[[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]];
const BOTTOM_SLAB: &[ShapeBox] = &[[0.0, 0.0, 0.0, 1.0, 0.5, 1.0]];
const TOP_SLAB: &[ShapeBox] = &[[0.0, 0.5, 0.0, 1.0, 1.0, 1.0]];
const FENCE_POST: &[ShapeBox] = &[[0.375, 0.0, 0.375, 0.625, 1.5, 0.625]];
const CARPET_LAYER: &[ShapeBox] = &[[0.0, 0.0, 0.0, 1.0, 0.0625, 1.0]];

impl BlockType {
    /// Converts a stored id into a `BlockType`, or `None` for an id no type uses.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// Whether an agent can not pass through this block type.
    pub fn blocks_movement(self) -> bool {
        !matches!(self, BlockType::AIR | BlockType::TORCH)
    }

    /// Whether the block fills its entire cell.
    pub fn is_full_cube(self) -> bool {
        matches!(
            self,
            BlockType::DIRT
                | BlockType::GRASS
                | BlockType::WOOD
                | BlockType::WHITE
                | BlockType::STONE
        )
    }

    /// The collision boxes of this type in block-local coordinates.
    pub fn shape(self, variant: u8) -> &'static [ShapeBox] {
        match self {
            BlockType::AIR | BlockType::TORCH => &[],
            BlockType::SLAB if variant == 1 => TOP_SLAB,
            BlockType::SLAB => BOTTOM_SLAB,
            BlockType::FENCE => FENCE_POST,
            BlockType::CARPET => CARPET_LAYER,
            _ => FULL_CUBE,
        }
    }

    /// Picks a random solid, full-cube terrain type.
    pub fn get_random_terrain() -> Self {
        match fastrand::u8(0..4) {
            0 => BlockType::DIRT,
            1 => BlockType::GRASS,
            2 => BlockType::STONE,
            _ => BlockType::WOOD,
        }
    }
}

//! # Block Module
//!
//! The block value stored in chunks, and the face directions used to step
//! between neighbouring cells.

use block_type::{BlockType, ShapeBox};

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to store block types.
pub type BlockTypeSize = u8;

/// Variant of [`BlockType::STONE`] used for pre-built structures that are
/// known to be walkable even though they are stone.
pub const PREBUILT_STONE_VARIANT: u8 = 2;

/// A single voxel block.
///
/// Two bytes: the type id and a type-specific variant (slab half, stone
/// family member, ...). Two blocks are the same block state when both bytes
/// match.
///
/// An id that does not name a [`BlockType`] is treated as a solid full cube.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize`.
    pub block_type: BlockTypeSize,
    /// Type-specific variant.
    pub variant: u8,
}

impl Block {
    /// Empty space. Also the all-zero bit pattern.
    pub const AIR: Block = Block {
        block_type: BlockType::AIR as BlockTypeSize,
        variant: 0,
    };

    /// The pre-built stone state that the default obstruction oracle never treats as blocking.
    pub const PREBUILT: Block = Block {
        block_type: BlockType::STONE as BlockTypeSize,
        variant: PREBUILT_STONE_VARIANT,
    };

    /// Creates the default variant of `block_type`.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
            variant: 0,
        }
    }

    /// Creates a specific variant of `block_type`.
    pub fn with_variant(block_type: BlockType, variant: u8) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
            variant,
        }
    }

    /// The decoded type, if the id is known.
    pub fn kind(&self) -> Option<BlockType> {
        BlockType::from_id(self.block_type)
    }

    pub fn blocks_movement(&self) -> bool {
        self.kind().map_or(true, BlockType::blocks_movement)
    }

    pub fn is_full_cube(&self) -> bool {
        self.kind().map_or(true, BlockType::is_full_cube)
    }

    /// Collision boxes in block-local coordinates.
    pub fn shape(&self) -> &'static [ShapeBox] {
        match self.kind() {
            Some(kind) => kind.shape(self.variant),
            None => BlockType::DIRT.shape(0),
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::AIR
    }
}

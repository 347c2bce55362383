//! # Block Side Module
//!
//! The six faces of a voxel cell. A search steps from a cell to the
//! neighbour behind one of its faces, so the face order here is also the
//! order in which neighbours are expanded.

use cgmath::Vector3;

/// The six faces of a cell.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing positive Z
    FRONT = 0,

    /// Facing negative Z
    BACK = 1,

    /// Facing negative Y
    BOTTOM = 2,

    /// Facing positive Y
    TOP = 3,

    /// Facing negative X
    LEFT = 4,

    /// Facing positive X
    RIGHT = 5,
}

impl BlockSide {
    /// All six faces in a fixed order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit step from a cell to the neighbour across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }
}

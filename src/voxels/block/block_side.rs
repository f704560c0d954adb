//! # Block Side Module
//!
//! This module defines the six faces of a voxel block along with the
//! coordinate offsets and normals the mesher needs for face culling.

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a fixed integer value so it can index the
/// per-face offset, normal and tint tables.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

/// Neighbor offsets in `BlockSide` order: the block a face presses against.
const SIDE_OFFSETS: [[i32; 3]; 6] = [
    [0, 0, 1],
    [0, 0, -1],
    [0, -1, 0],
    [0, 1, 0],
    [-1, 0, 0],
    [1, 0, 0],
];

/// Outward unit normals in `BlockSide` order.
const SIDE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, -1.0, 0.0],
    [0.0, 1.0, 0.0],
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
];

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
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

    /// The offset from a block to the neighbor this face presses against.
    #[inline]
    pub fn offset(self) -> [i32; 3] {
        SIDE_OFFSETS[self as usize]
    }

    /// The outward unit normal of this face.
    #[inline]
    pub fn normal(self) -> [f32; 3] {
        SIDE_NORMALS[self as usize]
    }

    /// Index of the face family used by the tint and atlas tables:
    /// 0 = top, 1 = side, 2 = bottom.
    #[inline]
    pub fn family(self) -> usize {
        match self {
            BlockSide::TOP => 0,
            BlockSide::BOTTOM => 2,
            _ => 1,
        }
    }
}

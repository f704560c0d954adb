//! # Block Type Module
//!
//! This module defines the different materials a voxel can hold.
//! It provides functionality for block type identification, conversion from
//! the compact integer storage format, and the passability/transparency
//! queries the generator and mesher are built on.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// Each variant represents a distinct material. The discriminant doubles as
/// the compact storage value inside a chunk's block array, so the order here
/// is load-bearing: `AIR` must stay at zero (an empty cell) and new variants
/// must only ever be appended. The `FromPrimitive` derive allows conversion
/// back from the stored integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// An air block; denotes emptiness and is never rendered.
    AIR = 0,

    /// A grass block with a green top and dirt-brown sides.
    GRASS,

    /// A basic dirt block, found under grass surfaces.
    DIRT,

    /// The stone bulk that makes up most of a column.
    STONE,

    /// A sand block, surfacing low-lying and submerged columns.
    SAND,

    /// A tree trunk block.
    WOOD,

    /// A canopy leaf block.
    LEAVES,

    /// Coal ore embedded in the stone band.
    COAL_ORE,

    /// Iron ore embedded in the deeper stone band.
    IRON_ORE,

    /// A decorative flower; rendered as crossed quads, not a cube.
    FLOWER,

    /// A water block; meshed into the translucent geometry buffer.
    WATER,
}

/// The number of distinct block types, sizing every per-type count table.
pub const BLOCK_TYPE_COUNT: usize = 11;

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// This is used when reading the compact storage format back into the
    /// rich enum type.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `AIR` if the value does not map to
    /// a known variant.
    pub fn from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    /// Whether the block lets entities, tree roots and flower placement
    /// pass through it.
    ///
    /// Passable blocks are also the ones a surface scan skips when looking
    /// for standing ground.
    #[inline]
    pub fn is_passable(self) -> bool {
        matches!(self, BlockType::AIR | BlockType::FLOWER | BlockType::WATER)
    }

    /// Whether the block belongs in the liquid geometry buffer.
    #[inline]
    pub fn is_liquid(self) -> bool {
        self == BlockType::WATER
    }

    /// Whether a face of `self` pressed against `neighbor` is visible and
    /// must be emitted by the mesher.
    ///
    /// A solid face shows against air, flowers and water. A water face shows
    /// against anything that is not water, which keeps the waterline visible
    /// where water meets terrain.
    #[inline]
    pub fn face_visible_against(self, neighbor: BlockType) -> bool {
        if self == BlockType::WATER {
            neighbor != BlockType::WATER
        } else {
            matches!(
                neighbor,
                BlockType::AIR | BlockType::FLOWER | BlockType::WATER
            )
        }
    }
}

//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel
//! engine: block type definitions, block face handling, and the static
//! per-type appearance tables the mesher samples.

pub mod block_side;
pub mod block_type;

pub use block_side::BlockSide;
pub use block_type::{BlockType, BLOCK_TYPE_COUNT};

/// The underlying integer type used to represent block types in memory.
/// This is used for efficient storage of block data inside chunks.
pub type BlockTypeSize = u8;

/// Maps each block type to its base tint for each face family.
///
/// The outer array is indexed by `BlockType` as a `usize`. The inner array
/// holds [top, side, bottom] RGB tints. The mesher perturbs these with a
/// coordinate hash so identical block types still show believable variation.
pub static BLOCK_TYPE_TO_FACE_TINTS: [[[f32; 3]; 3]; BLOCK_TYPE_COUNT] = [
    [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]], // AIR (never sampled)
    [[0.30, 0.65, 0.20], [0.42, 0.48, 0.22], [0.45, 0.32, 0.18]], // GRASS
    [[0.45, 0.32, 0.18], [0.45, 0.32, 0.18], [0.42, 0.30, 0.16]], // DIRT
    [[0.52, 0.52, 0.54], [0.50, 0.50, 0.52], [0.46, 0.46, 0.48]], // STONE
    [[0.85, 0.80, 0.55], [0.82, 0.77, 0.52], [0.80, 0.75, 0.50]], // SAND
    [[0.48, 0.36, 0.20], [0.55, 0.40, 0.22], [0.48, 0.36, 0.20]], // WOOD
    [[0.20, 0.55, 0.15], [0.18, 0.50, 0.12], [0.16, 0.45, 0.11]], // LEAVES
    [[0.32, 0.32, 0.34], [0.30, 0.30, 0.32], [0.28, 0.28, 0.30]], // COAL_ORE
    [[0.58, 0.48, 0.40], [0.55, 0.45, 0.38], [0.52, 0.42, 0.35]], // IRON_ORE
    [[0.85, 0.30, 0.35], [0.80, 0.28, 0.32], [0.25, 0.50, 0.18]], // FLOWER
    [[0.15, 0.35, 0.75], [0.12, 0.30, 0.70], [0.10, 0.25, 0.65]], // WATER
];

/// Maps each block type to its atlas tile for each face family.
///
/// The outer array is indexed by `BlockType` as a `usize`; the inner array
/// holds [top, side, bottom] tile indices into an 8x4 texture atlas.
pub static BLOCK_TYPE_TO_TILE_INDICES: [[u32; 3]; BLOCK_TYPE_COUNT] = [
    [0, 0, 0],    // AIR (never sampled)
    [1, 2, 3],    // GRASS (distinct top, grassy side, dirt bottom)
    [3, 3, 3],    // DIRT
    [4, 4, 4],    // STONE
    [5, 5, 5],    // SAND
    [6, 7, 6],    // WOOD (rings on top/bottom, bark on sides)
    [8, 8, 8],    // LEAVES
    [9, 9, 9],    // COAL_ORE
    [10, 10, 10], // IRON_ORE
    [11, 11, 11], // FLOWER
    [12, 12, 12], // WATER
];

/// Number of tile columns in the texture atlas.
pub const ATLAS_TILES_X: u32 = 8;
/// Number of tile rows in the texture atlas.
pub const ATLAS_TILES_Y: u32 = 4;

/// Maps a tile index and a unit-square UV corner into atlas coordinates.
///
/// # Arguments
/// * `tile` - The atlas tile index from `BLOCK_TYPE_TO_TILE_INDICES`
/// * `u` - U coordinate within the tile (0.0 or 1.0)
/// * `v` - V coordinate within the tile (0.0 or 1.0)
///
/// # Returns
/// Normalized [u, v] coordinates into the full atlas texture.
#[inline]
pub fn atlas_uv(tile: u32, u: f32, v: f32) -> [f32; 2] {
    let col = (tile % ATLAS_TILES_X) as f32;
    let row = (tile / ATLAS_TILES_X) as f32;
    [
        (col + u) / ATLAS_TILES_X as f32,
        (row + v) / ATLAS_TILES_Y as f32,
    ]
}

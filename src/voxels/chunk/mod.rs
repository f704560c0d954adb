//! # Chunk Module
//!
//! This module provides the `Chunk` struct for managing one cuboid region of
//! voxel data, along with the `ChunkPos` coordinate type that addresses
//! chunks on the horizontal grid.
//!
//! ## Storage Strategy
//!
//! Chunks use a dense storage strategy:
//! - `blocks`: one `BlockType` per cell, addressed by
//!   `lx + SIZE_X * (lz + SIZE_Z * y)`
//! - `counts`: a per-block-type occurrence table kept incrementally
//!   consistent with every write
//!
//! The count table is statically sized to the block-type range, so every
//! cell is accounted for in exactly one bucket at all times and the table
//! never needs to grow at runtime.
//!
//! ### Performance Characteristics
//! - **Block Lookup**: O(1) via the linear index
//! - **Set**: O(1), including the count maintenance
//! - **Memory Usage**: 1 byte per cell plus the fixed count table

use std::sync::Arc;

use crate::meshing::ChunkGeometry;

use super::block::{BlockType, BLOCK_TYPE_COUNT};

/// The width of a chunk along the X axis, in blocks.
pub const CHUNK_SIZE_X: usize = 16;
/// The full vertical extent of a chunk, in blocks.
pub const CHUNK_HEIGHT: usize = 128;
/// The depth of a chunk along the Z axis, in blocks.
pub const CHUNK_SIZE_Z: usize = 16;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_X * CHUNK_HEIGHT * CHUNK_SIZE_Z;

/// Identifies a chunk by its integer coordinates on the horizontal grid.
///
/// A chunk's origin in world space is `(x * CHUNK_SIZE_X, 0, z * CHUNK_SIZE_Z)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChunkPos {
    /// Chunk coordinate along the world X axis.
    pub x: i32,
    /// Chunk coordinate along the world Z axis.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a new chunk position.
    pub fn new(x: i32, z: i32) -> Self {
        ChunkPos { x, z }
    }

    /// The chunk containing the given world-space column.
    ///
    /// # Arguments
    /// * `wx` - World X coordinate
    /// * `wz` - World Z coordinate
    ///
    /// # Returns
    /// The `ChunkPos` whose horizontal extent contains `(wx, wz)`.
    pub fn containing(wx: i32, wz: i32) -> Self {
        ChunkPos {
            x: wx.div_euclid(CHUNK_SIZE_X as i32),
            z: wz.div_euclid(CHUNK_SIZE_Z as i32),
        }
    }

    /// The world-space origin of this chunk (minimum X/Z corner).
    pub fn origin(&self) -> (i32, i32) {
        (
            self.x * CHUNK_SIZE_X as i32,
            self.z * CHUNK_SIZE_Z as i32,
        )
    }

    /// Squared horizontal distance from this chunk's center to a world-space
    /// point, used for rebuild prioritization.
    ///
    /// # Arguments
    /// * `px` - World X coordinate of the reference point
    /// * `pz` - World Z coordinate of the reference point
    pub fn distance_sq_to(&self, px: f32, pz: f32) -> f32 {
        let (ox, oz) = self.origin();
        let cx = ox as f32 + CHUNK_SIZE_X as f32 * 0.5;
        let cz = oz as f32 + CHUNK_SIZE_Z as f32 * 0.5;
        let dx = cx - px;
        let dz = cz - pz;
        dx * dx + dz * dz
    }
}

/// One cuboid region of the voxel world.
///
/// A chunk owns its block array, a per-type count table, a monotonically
/// increasing geometry version, and at most one solid and one liquid
/// geometry handle. Chunks hold pure data; generation, meshing and
/// scheduling live elsewhere and operate on this state.
pub struct Chunk {
    /// The position of this chunk on the horizontal chunk grid.
    pub position: ChunkPos,

    /// Dense block storage, addressed by `linear_index`.
    blocks: Vec<BlockType>,

    /// Per-block-type occurrence counts. The sum over all buckets always
    /// equals `CHUNK_VOLUME`.
    counts: [u32; BLOCK_TYPE_COUNT],

    /// Geometry version, bumped by the owning world on every content edit.
    /// Only ever increases for the lifetime of the chunk.
    version: u64,

    /// The renderable opaque surface, replaced wholesale on every
    /// successful rebuild delivery.
    pub solid_geometry: Option<Arc<ChunkGeometry>>,

    /// The renderable translucent (water) surface, kept separate from the
    /// solid surface because of blending order.
    pub liquid_geometry: Option<Arc<ChunkGeometry>>,
}

impl Chunk {
    /// Creates a new chunk filled entirely with air.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn new(position: ChunkPos) -> Self {
        let mut counts = [0u32; BLOCK_TYPE_COUNT];
        counts[BlockType::AIR as usize] = CHUNK_VOLUME as u32;
        Chunk {
            position,
            blocks: vec![BlockType::AIR; CHUNK_VOLUME],
            counts,
            version: 0,
            solid_geometry: None,
            liquid_geometry: None,
        }
    }

    #[inline]
    fn linear_index(lx: usize, y: usize, lz: usize) -> usize {
        lx + CHUNK_SIZE_X * (lz + CHUNK_SIZE_Z * y)
    }

    /// Whether the given local coordinates fall inside the chunk.
    #[inline]
    pub fn in_bounds(lx: i32, y: i32, lz: i32) -> bool {
        lx >= 0
            && (lx as usize) < CHUNK_SIZE_X
            && y >= 0
            && (y as usize) < CHUNK_HEIGHT
            && lz >= 0
            && (lz as usize) < CHUNK_SIZE_Z
    }

    /// Gets the block at the specified chunk-local coordinates.
    ///
    /// Out-of-bounds coordinates read as `AIR`; this never panics.
    #[inline]
    pub fn get(&self, lx: i32, y: i32, lz: i32) -> BlockType {
        if Self::in_bounds(lx, y, lz) {
            self.blocks[Self::linear_index(lx as usize, y as usize, lz as usize)]
        } else {
            BlockType::AIR
        }
    }

    /// Sets the block at the specified chunk-local coordinates.
    ///
    /// A write that leaves the cell unchanged, or that targets an
    /// out-of-bounds coordinate, is a no-op. A real write keeps the count
    /// table consistent: the previous type's bucket is decremented (floored
    /// at zero) and the new type's bucket incremented.
    ///
    /// Bumping the geometry version is deliberately not done here; it is the
    /// responsibility of the owning world, which knows whether a write is an
    /// edit or part of initial generation.
    ///
    /// # Returns
    /// `true` if the cell actually changed.
    pub fn set(&mut self, lx: i32, y: i32, lz: i32, block: BlockType) -> bool {
        if !Self::in_bounds(lx, y, lz) {
            return false;
        }
        let index = Self::linear_index(lx as usize, y as usize, lz as usize);
        let previous = self.blocks[index];
        if previous == block {
            return false;
        }
        self.blocks[index] = block;
        self.counts[previous as usize] = self.counts[previous as usize].saturating_sub(1);
        self.counts[block as usize] += 1;
        true
    }

    /// Read-only view of the per-type occurrence counts.
    pub fn counts(&self) -> &[u32; BLOCK_TYPE_COUNT] {
        &self.counts
    }

    /// The chunk's current geometry version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Advances the geometry version after a content edit.
    ///
    /// # Returns
    /// The new version value.
    pub fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Read-only view of the raw block array, in `linear_index` order.
    ///
    /// Used to snapshot the chunk for off-thread meshing.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    /// Replaces both geometry handles with freshly built buffers.
    ///
    /// The previous handles are dropped here, exactly once per replacement.
    ///
    /// # Arguments
    /// * `solid` - The new opaque surface, or `None` when no solid face is visible
    /// * `liquid` - The new translucent surface, or `None` when no water face is visible
    pub fn install_geometry(
        &mut self,
        solid: Option<Arc<ChunkGeometry>>,
        liquid: Option<Arc<ChunkGeometry>>,
    ) {
        self.solid_geometry = solid;
        self.liquid_geometry = liquid;
    }
}

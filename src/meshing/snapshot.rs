//! Immutable chunk snapshots for off-thread meshing.
//!
//! Worker threads never touch live chunk state. Before dispatch, the
//! scheduler copies the block array of the chunk being rebuilt plus the
//! arrays of its four loaded horizontal neighbors into a `MeshInput`; the
//! worker reads only that. Shipping full neighbor copies per rebuild trades
//! some memory traffic for a complete absence of shared mutable state.

use crate::voxels::block::BlockType;
use crate::voxels::chunk::{Chunk, ChunkPos, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};

/// A read-only copy of one chunk's block array.
#[derive(Clone)]
pub struct ChunkSnapshot {
    /// Position of the chunk this snapshot was taken from.
    pub position: ChunkPos,
    blocks: Vec<BlockType>,
}

impl ChunkSnapshot {
    /// Copies the block data out of a live chunk.
    pub fn of(chunk: &Chunk) -> Self {
        ChunkSnapshot {
            position: chunk.position,
            blocks: chunk.blocks().to_vec(),
        }
    }

    /// Gets the block at chunk-local coordinates; out of bounds reads as air.
    #[inline]
    pub fn get(&self, lx: i32, y: i32, lz: i32) -> BlockType {
        if Chunk::in_bounds(lx, y, lz) {
            self.blocks[lx as usize + CHUNK_SIZE_X * (lz as usize + CHUNK_SIZE_Z * y as usize)]
        } else {
            BlockType::AIR
        }
    }
}

/// Snapshots of the four horizontal neighbors of a chunk being meshed.
///
/// A `None` entry means that neighbor was not loaded at dispatch time; the
/// builder treats the whole side as air, which can over-generate boundary
/// faces that disappear once the neighbor loads and both chunks rebuild.
#[derive(Default)]
pub struct NeighborSnapshots {
    /// The chunk at `x - 1`.
    pub west: Option<ChunkSnapshot>,
    /// The chunk at `x + 1`.
    pub east: Option<ChunkSnapshot>,
    /// The chunk at `z - 1`.
    pub south: Option<ChunkSnapshot>,
    /// The chunk at `z + 1`.
    pub north: Option<ChunkSnapshot>,
}

/// Everything a worker needs to rebuild one chunk's geometry.
pub struct MeshInput {
    /// Snapshot of the chunk being rebuilt.
    pub center: ChunkSnapshot,
    /// Snapshots of its loaded horizontal neighbors.
    pub neighbors: NeighborSnapshots,
}

impl MeshInput {
    /// Samples a block at coordinates local to the center chunk, crossing
    /// into the neighbor snapshots when the offset leaves the chunk.
    ///
    /// Anything beyond the loaded snapshots (diagonals, unloaded neighbors,
    /// out-of-range y) reads as air.
    #[inline]
    pub fn sample(&self, lx: i32, y: i32, lz: i32) -> BlockType {
        if y < 0 || y >= CHUNK_HEIGHT as i32 {
            return BlockType::AIR;
        }
        let size_x = CHUNK_SIZE_X as i32;
        let size_z = CHUNK_SIZE_Z as i32;
        if (0..size_x).contains(&lx) && (0..size_z).contains(&lz) {
            return self.center.get(lx, y, lz);
        }
        let (neighbor, nx, nz) = if lx < 0 {
            (&self.neighbors.west, lx + size_x, lz)
        } else if lx >= size_x {
            (&self.neighbors.east, lx - size_x, lz)
        } else if lz < 0 {
            (&self.neighbors.south, lx, lz + size_z)
        } else {
            (&self.neighbors.north, lx, lz - size_z)
        };
        neighbor
            .as_ref()
            .map_or(BlockType::AIR, |snapshot| snapshot.get(nx, y, nz))
    }
}

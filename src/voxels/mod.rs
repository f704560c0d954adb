//! # Voxels Module
//!
//! The voxel data model: block types and faces, chunked block storage, and
//! the `World` that owns it all.

pub mod block;
pub mod chunk;
pub mod world;

pub use block::{BlockSide, BlockType, BLOCK_TYPE_COUNT};
pub use chunk::{Chunk, ChunkPos, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, CHUNK_VOLUME};
pub use world::{BlockChange, World};

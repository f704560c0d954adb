//! # Meshing Module
//!
//! Converts chunk block data into renderable surface geometry.
//!
//! The entry point is [`build_geometry`], which runs inside a worker thread
//! against an immutable [`MeshInput`] snapshot and produces a
//! [`GeometrySet`] of flat vertex/index buffers, split into an opaque and a
//! translucent surface. Nothing in this module touches live chunk state.

mod builder;
mod geometry;
mod snapshot;

pub use builder::build_geometry;
pub use geometry::{ChunkGeometry, GeometrySet, Vertex};
pub use snapshot::{ChunkSnapshot, MeshInput, NeighborSnapshots};

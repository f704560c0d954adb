#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! A real-time voxel terrain engine core: it stores a sparse 3D grid of
//! typed blocks partitioned into fixed-size chunks, procedurally generates
//! terrain content per chunk, converts block data into renderable surface
//! geometry, and keeps that geometry consistent as blocks change and as the
//! viewer moves through an unbounded world.
//!
//! ## Key Modules
//!
//! * `voxels` - Block types, chunked storage, and the `World` coordinator
//! * `terrain` - The deterministic procedural generator
//! * `meshing` - Face-culling surface geometry construction
//! * `remesh` - The asynchronous, priority-ordered, versioned rebuild
//!   pipeline
//! * `config` - Engine tunables, loadable from JSON
//!
//! ## Architecture
//!
//! One coordinating thread owns all chunk state. Geometry construction runs
//! on a small pool of worker threads that receive immutable snapshots and
//! return only derived buffers; a per-chunk geometry version, bumped on
//! every edit, guarantees a stale rebuild is never presented.
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_terrain::config::EngineConfig;
//! use voxel_terrain::voxels::{ChunkPos, World};
//!
//! let mut world = World::new(EngineConfig::default());
//! world.ensure_area(ChunkPos::new(0, 0), 2);
//! world.update_viewer(world.spawn_point());
//!
//! // Once per simulation tick:
//! world.pump();
//! for position in world.drain_refreshed() {
//!     if let Some(chunk) = world.chunk(position) {
//!         let _surfaces = (&chunk.solid_geometry, &chunk.liquid_geometry);
//!         // upload both surfaces
//!     }
//! }
//! ```

pub mod config;
pub mod meshing;
pub mod remesh;
pub mod terrain;
pub mod voxels;

/// Initializes logging to stdout, filtered by the `RUST_LOG` environment
/// variable. Call once from the host application before creating a world.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
}

//! # Remesh Job Types
//!
//! This module defines the unit of work shipped to a remesh worker and the
//! outcome shipped back.
//!
//! ## Job Lifecycle
//! 1. The scheduler snapshots a chunk and its loaded neighbors into a
//!    `RemeshJob` stamped with the chunk's geometry version at dispatch time
//! 2. A worker thread calls `process()`, which builds the geometry
//! 3. The resulting `RemeshOutcome` travels back to the coordinating thread
//! 4. The world applies the geometry only if the stamped version still
//!    matches the chunk's current version; otherwise the outcome is stale
//!    and silently dropped

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::warn;

use crate::meshing::{build_geometry, GeometrySet, MeshInput};
use crate::voxels::chunk::ChunkPos;

/// A unit of remeshing work owning everything it needs.
///
/// The job holds immutable snapshots only; workers never read or write
/// shared chunk state, which rules out data races by construction.
pub struct RemeshJob {
    /// The chunk this job rebuilds.
    pub position: ChunkPos,
    /// The chunk's geometry version at dispatch time.
    pub version: u64,
    /// Snapshot of the chunk and its loaded horizontal neighbors.
    pub input: MeshInput,
}

impl RemeshJob {
    /// Executes the job on a worker thread.
    ///
    /// A fault inside geometry construction is caught and logged; the
    /// outcome then carries no geometry, which frees the concurrency slot
    /// without crashing the coordinating thread and without an automatic
    /// retry. The next edit or viewer movement re-queues the chunk if
    /// anything still wants it rebuilt.
    pub fn process(self) -> RemeshOutcome {
        let position = self.position;
        let version = self.version;
        let input = self.input;

        let geometry = match catch_unwind(AssertUnwindSafe(move || build_geometry(&input))) {
            Ok(set) => Some(set),
            Err(_) => {
                warn!(
                    "remesh worker fault for chunk ({}, {}); no geometry produced this round",
                    position.x, position.z
                );
                None
            }
        };

        RemeshOutcome {
            position,
            version,
            geometry,
        }
    }
}

/// The result of a completed remesh job.
pub struct RemeshOutcome {
    /// The chunk the job rebuilt.
    pub position: ChunkPos,
    /// The geometry version the job was dispatched at.
    pub version: u64,
    /// The freshly built surfaces, or `None` when the worker faulted.
    pub geometry: Option<GeometrySet>,
}

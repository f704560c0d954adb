//! # World Module
//!
//! This module provides the `World` struct: the single coordinating owner of
//! the chunk map, the world-wide block-type totals, the terrain generator
//! and the remesh scheduler.
//!
//! ## Architecture
//!
//! The world is a sparse horizontal grid of chunks created lazily on
//! demand. All chunk state is owned and mutated on the thread that owns the
//! `World`; worker threads only ever see immutable snapshots and hand back
//! derived geometry. The single asynchronous seam is the remesh pipeline,
//! and its correctness rests on one rule: a delivered result is applied
//! only if the geometry version it was built at still matches the chunk's
//! current version.
//!
//! ## Residency
//!
//! Chunks are never dropped implicitly. An LRU list tracks every resident
//! chunk; when the count exceeds the configured budget, the least recently
//! used chunks outside the viewer's keep radius are disposed: their counts
//! leave the world totals, their geometry handles drop, and any rebuild
//! still referencing them is discarded when it surfaces.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace};
use lru::LruCache;

use crate::config::EngineConfig;
use crate::remesh::job::RemeshOutcome;
use crate::remesh::RemeshScheduler;
use crate::terrain::{TerrainGenerator, SEA_LEVEL};

use super::block::{BlockType, BLOCK_TYPE_COUNT};
use super::chunk::{Chunk, ChunkPos, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};

/// Vertical offset above sea level reported by `surface_height` for columns
/// whose chunk is not loaded.
pub const UNLOADED_SURFACE_OFFSET: i32 = 2;

/// Eye height added on top of the ground when computing the spawn point.
pub const PLAYER_EYE_HEIGHT: f32 = 1.62;

/// A successful block edit, reported for UI refresh.
#[derive(Debug, Clone, Copy)]
pub struct BlockChange {
    /// World-space position of the edited block.
    pub position: Point3<i32>,
    /// The block type before the edit.
    pub previous: BlockType,
    /// The block type after the edit.
    pub current: BlockType,
    /// The chunk the edit landed in.
    pub chunk: ChunkPos,
}

/// The voxel world: chunk map, block API, totals and the remesh pipeline.
pub struct World {
    chunks: HashMap<ChunkPos, Chunk>,
    totals: [u64; BLOCK_TYPE_COUNT],
    generator: TerrainGenerator,
    scheduler: RemeshScheduler,
    residency: LruCache<ChunkPos, ()>,
    config: EngineConfig,
    changes: Vec<BlockChange>,
    refreshed: Vec<ChunkPos>,
    viewer: Point3<f32>,
}

impl World {
    /// Creates an empty world with the given configuration.
    ///
    /// Spawns the remesh worker pool; no chunks exist until `ensure_chunk`
    /// or `ensure_area` is called.
    pub fn new(config: EngineConfig) -> Self {
        let generator = TerrainGenerator::new(config.seed);
        let scheduler = RemeshScheduler::new(config.worker_threads);
        World {
            chunks: HashMap::new(),
            totals: [0; BLOCK_TYPE_COUNT],
            generator,
            scheduler,
            residency: LruCache::unbounded(),
            config,
            changes: Vec::new(),
            refreshed: Vec::new(),
            viewer: Point3::new(0.0, 0.0, 0.0),
        }
    }

    /// Returns the chunk at the given position, creating and generating it
    /// exactly once if it does not exist yet.
    ///
    /// A fresh chunk's counts join the world totals and its first rebuild is
    /// queued, along with a rebuild for each already-loaded horizontal
    /// neighbor so the seam faces both sides over-generated while alone get
    /// re-culled.
    pub fn ensure_chunk(&mut self, position: ChunkPos) {
        if self.chunks.contains_key(&position) {
            self.residency.promote(&position);
            return;
        }

        let mut chunk = Chunk::new(position);
        self.generator.populate(&mut chunk);
        for (block, &count) in chunk.counts().iter().enumerate() {
            self.totals[block] += count as u64;
        }
        let version = chunk.version();
        self.chunks.insert(position, chunk);
        self.residency.push(position, ());
        debug!("generated chunk ({}, {})", position.x, position.z);

        self.scheduler.queue_rebuild(position, version);
        for (dx, dz) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            self.queue_neighbor_rebuild(position.x + dx, position.z + dz);
        }

        self.evict_over_budget();
        self.scheduler.drain(&self.chunks);
    }

    /// Ensures a square area of chunks around a center position.
    pub fn ensure_area(&mut self, center: ChunkPos, radius: i32) {
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                self.ensure_chunk(ChunkPos::new(center.x + dx, center.z + dz));
            }
        }
    }

    /// Reads the block at a world-space position.
    ///
    /// Out-of-range y and unloaded chunks read as air; this never fails.
    pub fn get_block(&self, wx: i32, wy: i32, wz: i32) -> BlockType {
        if wy < 0 || wy >= CHUNK_HEIGHT as i32 {
            return BlockType::AIR;
        }
        let position = ChunkPos::containing(wx, wz);
        let (origin_x, origin_z) = position.origin();
        self.chunks
            .get(&position)
            .map_or(BlockType::AIR, |chunk| {
                chunk.get(wx - origin_x, wy, wz - origin_z)
            })
    }

    /// Writes the block at a world-space position.
    ///
    /// Returns `false` without effect when the chunk is not loaded, the
    /// coordinate is out of vertical range, or the cell already holds the
    /// requested type. A successful write updates the chunk counts and the
    /// world totals, bumps the chunk's geometry version, records a
    /// `BlockChange`, and queues a rebuild for the edited chunk plus every
    /// loaded chunk sharing the edited block's boundary face.
    pub fn set_block(&mut self, wx: i32, wy: i32, wz: i32, block: BlockType) -> bool {
        if wy < 0 || wy >= CHUNK_HEIGHT as i32 {
            return false;
        }
        let position = ChunkPos::containing(wx, wz);
        let (origin_x, origin_z) = position.origin();
        let (lx, lz) = (wx - origin_x, wz - origin_z);

        let Some(chunk) = self.chunks.get_mut(&position) else {
            return false;
        };
        let previous = chunk.get(lx, wy, lz);
        if !chunk.set(lx, wy, lz, block) {
            return false;
        }
        let version = chunk.bump_version();

        self.totals[previous as usize] = self.totals[previous as usize].saturating_sub(1);
        self.totals[block as usize] += 1;
        self.changes.push(BlockChange {
            position: Point3::new(wx, wy, wz),
            previous,
            current: block,
            chunk: position,
        });
        self.residency.promote(&position);

        self.scheduler.queue_rebuild(position, version);
        if lx == 0 {
            self.queue_neighbor_rebuild(position.x - 1, position.z);
        }
        if lx == CHUNK_SIZE_X as i32 - 1 {
            self.queue_neighbor_rebuild(position.x + 1, position.z);
        }
        if lz == 0 {
            self.queue_neighbor_rebuild(position.x, position.z - 1);
        }
        if lz == CHUNK_SIZE_Z as i32 - 1 {
            self.queue_neighbor_rebuild(position.x, position.z + 1);
        }

        self.scheduler.drain(&self.chunks);
        true
    }

    /// The standing height of a world-space column: the topmost
    /// non-passable block's y plus one, scanning down from the column top.
    ///
    /// Columns in unloaded chunks report the documented fallback of
    /// `SEA_LEVEL + UNLOADED_SURFACE_OFFSET` instead of erroring.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let position = ChunkPos::containing(wx, wz);
        let Some(chunk) = self.chunks.get(&position) else {
            return SEA_LEVEL as i32 + UNLOADED_SURFACE_OFFSET;
        };
        let (origin_x, origin_z) = position.origin();
        for y in (0..CHUNK_HEIGHT as i32).rev() {
            if !chunk.get(wx - origin_x, y, wz - origin_z).is_passable() {
                return y + 1;
            }
        }
        0
    }

    /// Computes a deterministic, reproducible spawn location.
    ///
    /// Probes the generator's height function on a grid around the origin
    /// and returns the highest surface point found, lifted by eye height.
    /// Because only the pure height function is sampled, the result is
    /// independent of which chunks happen to be loaded.
    pub fn spawn_point(&self) -> Point3<f32> {
        let radius = self.config.spawn_probe_radius;
        let step = self.config.spawn_probe_step.max(1) as usize;
        let mut best = (0i32, 0i32, 0usize);
        for wx in (-radius..=radius).step_by(step) {
            for wz in (-radius..=radius).step_by(step) {
                let height = self.generator.column_height(wx, wz);
                if height > best.2 {
                    best = (wx, wz, height);
                }
            }
        }
        Point3::new(
            best.0 as f32 + 0.5,
            (best.2 + 1) as f32 + PLAYER_EYE_HEIGHT,
            best.1 as f32 + 0.5,
        )
    }

    /// Snapshot of the world-wide per-type block counts.
    pub fn block_totals(&self) -> [u64; BLOCK_TYPE_COUNT] {
        self.totals
    }

    /// Takes the block-change notifications recorded since the last call.
    pub fn drain_block_changes(&mut self) -> Vec<BlockChange> {
        std::mem::take(&mut self.changes)
    }

    /// Takes the positions whose geometry was replaced since the last call.
    ///
    /// A rendering collaborator uses this to know which chunk surfaces to
    /// re-upload; the handles themselves are read through `chunk()`.
    pub fn drain_refreshed(&mut self) -> Vec<ChunkPos> {
        std::mem::take(&mut self.refreshed)
    }

    /// Moves the viewer reference point and re-attempts dispatch, since a
    /// moving viewer can promote previously low-priority chunks.
    pub fn update_viewer(&mut self, viewer: Point3<f32>) {
        self.viewer = viewer;
        self.scheduler.update_viewer(viewer);
        self.scheduler.drain(&self.chunks);
    }

    /// Delivers completed rebuilds and re-enters the dispatch loop.
    ///
    /// Call once per simulation tick. Never blocks on a worker.
    pub fn pump(&mut self) {
        for outcome in self.scheduler.poll_completed() {
            self.apply_outcome(outcome);
        }
        self.scheduler.drain(&self.chunks);
    }

    /// Applies one worker outcome, enforcing the version check.
    fn apply_outcome(&mut self, outcome: RemeshOutcome) {
        let Some(chunk) = self.chunks.get_mut(&outcome.position) else {
            debug!(
                "dropping geometry for evicted chunk ({}, {})",
                outcome.position.x, outcome.position.z
            );
            return;
        };
        if outcome.version != chunk.version() {
            debug!(
                "discarding stale geometry for chunk ({}, {}): built at v{}, chunk is at v{}",
                outcome.position.x,
                outcome.position.z,
                outcome.version,
                chunk.version()
            );
            return;
        }
        // A faulted worker delivers no geometry; the previous surface stays
        // until something re-queues the chunk.
        let Some(set) = outcome.geometry else {
            return;
        };
        chunk.install_geometry(set.solid.map(Arc::new), set.liquid.map(Arc::new));
        self.refreshed.push(outcome.position);
        trace!(
            "installed geometry for chunk ({}, {}) at v{}",
            outcome.position.x,
            outcome.position.z,
            outcome.version
        );
    }

    /// Queues a rebuild for a neighbor chunk if it is loaded.
    fn queue_neighbor_rebuild(&mut self, x: i32, z: i32) {
        let position = ChunkPos::new(x, z);
        if let Some(chunk) = self.chunks.get(&position) {
            self.scheduler.queue_rebuild(position, chunk.version());
        }
    }

    /// Disposes least-recently-used chunks beyond the residency budget.
    ///
    /// Chunks within the keep radius of the viewer are re-promoted instead
    /// of disposed. Disposal removes the map entry (dropping both geometry
    /// handles) and subtracts the chunk's counts from the world totals.
    fn evict_over_budget(&mut self) {
        let budget = self.config.max_resident_chunks.max(1);
        let mut attempts = self.residency.len();
        while self.residency.len() > budget && attempts > 0 {
            attempts -= 1;
            let Some((position, ())) = self.residency.pop_lru() else {
                break;
            };
            if self.within_keep_radius(position) {
                self.residency.push(position, ());
                continue;
            }
            if let Some(chunk) = self.chunks.remove(&position) {
                for (block, &count) in chunk.counts().iter().enumerate() {
                    self.totals[block] = self.totals[block].saturating_sub(count as u64);
                }
                debug!("evicted chunk ({}, {})", position.x, position.z);
            }
        }
    }

    /// Whether a chunk lies within the eviction keep radius of the viewer.
    fn within_keep_radius(&self, position: ChunkPos) -> bool {
        let viewer_chunk = ChunkPos::containing(self.viewer.x as i32, self.viewer.z as i32);
        (position.x - viewer_chunk.x).abs() <= self.config.keep_radius
            && (position.z - viewer_chunk.z).abs() <= self.config.keep_radius
    }

    /// Read-only access to a resident chunk.
    pub fn chunk(&self, position: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Number of chunks currently resident.
    pub fn resident_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Whether a chunk has a rebuild pending or in flight.
    pub fn is_rebuild_scheduled(&self, position: ChunkPos) -> bool {
        self.scheduler.is_scheduled(position)
    }

    /// Number of coalesced rebuild requests waiting for dispatch.
    pub fn rebuilds_pending(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Number of rebuilds currently running on workers.
    pub fn rebuilds_in_flight(&self) -> usize {
        self.scheduler.in_flight_count()
    }

    /// Whether the remesh pipeline has nothing pending and nothing running.
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// The terrain generator this world was built with.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshing::GeometrySet;
    use std::thread;
    use std::time::{Duration, Instant};

    fn test_config(seed: u32) -> EngineConfig {
        EngineConfig {
            seed,
            worker_threads: Some(1),
            ..EngineConfig::default()
        }
    }

    fn pump_until_settled(world: &mut World) {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            world.pump();
            if world.is_settled() {
                return;
            }
            assert!(Instant::now() < deadline, "remesh pipeline never settled");
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn sum_of_chunk_counts(world: &World) -> [u64; BLOCK_TYPE_COUNT] {
        let mut sums = [0u64; BLOCK_TYPE_COUNT];
        for position in world.chunks.keys() {
            let chunk = &world.chunks[position];
            for (block, &count) in chunk.counts().iter().enumerate() {
                sums[block] += count as u64;
            }
        }
        sums
    }

    #[test]
    fn totals_mirror_chunk_counts_through_edits() {
        let mut world = World::new(test_config(5));
        world.ensure_area(ChunkPos::new(0, 0), 1);
        assert_eq!(world.block_totals(), sum_of_chunk_counts(&world));

        fastrand::seed(9);
        for _ in 0..200 {
            let wx = fastrand::i32(-16..32);
            let wz = fastrand::i32(-16..32);
            let wy = fastrand::i32(0..CHUNK_HEIGHT as i32);
            let block = BlockType::from_int(fastrand::u8(0..BLOCK_TYPE_COUNT as u8));
            world.set_block(wx, wy, wz, block);
        }
        assert_eq!(world.block_totals(), sum_of_chunk_counts(&world));
    }

    #[test]
    fn writes_outside_the_world_are_rejected() {
        let mut world = World::new(test_config(5));
        world.ensure_chunk(ChunkPos::new(0, 0));
        assert!(!world.set_block(500, 10, 500, BlockType::STONE));
        assert!(!world.set_block(5, -1, 5, BlockType::STONE));
        assert!(!world.set_block(5, CHUNK_HEIGHT as i32, 5, BlockType::STONE));
        assert_eq!(world.get_block(500, 10, 500), BlockType::AIR);
    }

    #[test]
    fn edits_bump_the_version_and_record_a_change() {
        let mut world = World::new(test_config(5));
        let position = ChunkPos::new(0, 0);
        world.ensure_chunk(position);
        let before = world.chunk(position).unwrap().version();

        let height = world.surface_height(8, 8) - 1;
        let previous = world.get_block(8, height, 8);
        assert!(world.set_block(8, height, 8, BlockType::AIR));
        assert_eq!(world.chunk(position).unwrap().version(), before + 1);

        let changes = world.drain_block_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].previous, previous);
        assert_eq!(changes[0].current, BlockType::AIR);
        assert_eq!(changes[0].chunk, position);
        assert!(world.drain_block_changes().is_empty());
    }

    #[test]
    fn stale_outcomes_are_discarded_and_current_ones_applied() {
        let mut world = World::new(test_config(5));
        let position = ChunkPos::new(0, 0);
        world.ensure_chunk(position);
        pump_until_settled(&mut world);
        assert!(world.chunk(position).unwrap().solid_geometry.is_some());

        let height = world.surface_height(8, 8) - 1;
        assert!(world.set_block(8, height, 8, BlockType::AIR));
        let current = world.chunk(position).unwrap().version();

        // A result built before the edit must never land.
        world.apply_outcome(RemeshOutcome {
            position,
            version: current - 1,
            geometry: Some(GeometrySet::default()),
        });
        assert!(world.chunk(position).unwrap().solid_geometry.is_some());

        // A result built at the current version replaces the handles.
        world.apply_outcome(RemeshOutcome {
            position,
            version: current,
            geometry: Some(GeometrySet::default()),
        });
        assert!(world.chunk(position).unwrap().solid_geometry.is_none());
    }

    #[test]
    fn worker_faults_leave_previous_geometry_in_place() {
        let mut world = World::new(test_config(5));
        let position = ChunkPos::new(0, 0);
        world.ensure_chunk(position);
        pump_until_settled(&mut world);
        assert!(world.chunk(position).unwrap().solid_geometry.is_some());

        let current = world.chunk(position).unwrap().version();
        world.apply_outcome(RemeshOutcome {
            position,
            version: current,
            geometry: None,
        });
        assert!(world.chunk(position).unwrap().solid_geometry.is_some());
    }

    #[test]
    fn boundary_edits_requeue_the_neighbor() {
        let mut world = World::new(test_config(5));
        world.ensure_chunk(ChunkPos::new(0, 0));
        world.ensure_chunk(ChunkPos::new(1, 0));
        pump_until_settled(&mut world);

        let height = world.surface_height(15, 8) - 1;
        assert!(world.set_block(15, height, 8, BlockType::AIR));
        assert!(world.is_rebuild_scheduled(ChunkPos::new(0, 0)));
        assert!(world.is_rebuild_scheduled(ChunkPos::new(1, 0)));
    }

    #[test]
    fn residency_stays_within_budget() {
        let config = EngineConfig {
            seed: 5,
            max_resident_chunks: 4,
            keep_radius: 0,
            worker_threads: Some(1),
            ..EngineConfig::default()
        };
        let mut world = World::new(config);
        for x in 0..9 {
            world.ensure_chunk(ChunkPos::new(x, 50));
            assert!(world.resident_chunks() <= 4);
            assert_eq!(world.block_totals(), sum_of_chunk_counts(&world));
        }
    }

    #[test]
    fn surface_height_reports_the_fallback_when_unloaded() {
        let world = World::new(test_config(5));
        assert_eq!(
            world.surface_height(1000, 1000),
            SEA_LEVEL as i32 + UNLOADED_SURFACE_OFFSET
        );
    }

    #[test]
    fn surface_height_matches_the_generated_column() {
        let mut world = World::new(test_config(77));
        world.ensure_chunk(ChunkPos::new(0, 0));
        let height = world.generator().column_height(8, 8) as i32;
        let surface = world.surface_height(8, 8);
        // Tree decoration (a trunk or an overhanging leaf) raises the
        // standing height; otherwise it sits exactly one above the
        // generated surface block.
        let covered = (height + 1..CHUNK_HEIGHT as i32)
            .any(|y| !world.get_block(8, y, 8).is_passable());
        if covered {
            assert!(surface > height + 1);
        } else {
            assert_eq!(surface, height + 1);
        }
    }
}

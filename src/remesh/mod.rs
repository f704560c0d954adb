//! # Remesh Scheduling
//!
//! This module provides the `RemeshScheduler`, which queues chunks needing a
//! geometry rebuild, ranks them by distance to the viewer, bounds how many
//! rebuilds run concurrently, and dispatches work to a small pool of worker
//! threads.
//!
//! ## Per-Chunk State Machine
//!
//! `Idle -> Pending(version) -> InFlight(version) -> Idle`
//!
//! A block edit while a chunk is `Idle` or `InFlight` moves it to
//! `Pending(new version)`, overwriting any existing pending entry: earlier
//! pending requests are coalesced, never queued separately. A chunk that is
//! `InFlight` is not dispatched again until its outcome returns.
//!
//! ## Staleness
//!
//! Jobs are stamped with the chunk's geometry version at dispatch. The
//! owner compares that stamp against the chunk's current version when the
//! outcome arrives and drops mismatches, so the applied geometry always
//! converges to the most recent edit regardless of completion order. An
//! in-flight job that gets superseded still runs to completion; its result
//! is simply discarded. Wasted work is traded for the absence of a
//! cancellation path.
//!
//! ## Worker Pool
//!
//! Workers are plain threads fed over mpsc channels, one job in flight per
//! channel. The pool size is derived once from the host's available
//! parallelism and clamped to a small fixed range so remeshing never
//! saturates the machine.

pub mod job;

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use cgmath::Point3;
use log::{debug, error, info};

use crate::meshing::{ChunkSnapshot, MeshInput, NeighborSnapshots};
use crate::voxels::chunk::{Chunk, ChunkPos};

use job::{RemeshJob, RemeshOutcome};

/// Lower bound of the worker pool size.
pub const MIN_REMESH_WORKERS: usize = 1;
/// Upper bound of the worker pool size.
pub const MAX_REMESH_WORKERS: usize = 4;

/// Maximum number of jobs in flight per worker channel.
///
/// Kept at 1 so a dispatched job is the only thing a worker is doing; the
/// scheduler's own pending map does all the queueing and coalescing.
const MAX_JOBS_PER_WORKER: usize = 1;

/// A communication channel between the coordinating thread and one worker.
///
/// Mirrors the lifetime of its worker thread: dropping the sender ends the
/// worker's receive loop.
struct WorkerChannel {
    job_sender: Sender<RemeshJob>,
    outcome_receiver: Receiver<RemeshOutcome>,
    jobs_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// A coalesced rebuild request for one chunk.
struct PendingRebuild {
    /// The chunk's geometry version when the request was (last) made.
    version: u64,
    /// Insertion order, used as the deterministic tie-breaker.
    sequence: u64,
}

/// Priority-ordered, concurrency-bounded dispatcher for chunk rebuilds.
pub struct RemeshScheduler {
    channels: Vec<WorkerChannel>,
    pending: HashMap<ChunkPos, PendingRebuild>,
    in_flight: HashMap<ChunkPos, u64>,
    viewer: Point3<f32>,
    next_sequence: u64,
    current_channel: usize,
}

impl RemeshScheduler {
    /// Creates the scheduler and spawns its worker pool.
    ///
    /// # Arguments
    /// * `worker_override` - Fixed worker count, or `None` to derive it from
    ///   the host's available parallelism. Either way the count is clamped
    ///   to `MIN_REMESH_WORKERS..=MAX_REMESH_WORKERS`.
    pub fn new(worker_override: Option<usize>) -> Self {
        let parallelism = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        info!("available parallelism: {}", parallelism);
        let num_workers = worker_override
            .unwrap_or(parallelism)
            .clamp(MIN_REMESH_WORKERS, MAX_REMESH_WORKERS);

        let mut channels = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let (job_tx, job_rx) = channel::<RemeshJob>();
            let (outcome_tx, outcome_rx) = channel::<RemeshOutcome>();

            let worker = thread::spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let _ = outcome_tx.send(job.process());
                }
            });

            channels.push(WorkerChannel {
                job_sender: job_tx,
                outcome_receiver: outcome_rx,
                jobs_in_flight: 0,
                _worker: worker,
            });
        }

        RemeshScheduler {
            channels,
            pending: HashMap::new(),
            in_flight: HashMap::new(),
            viewer: Point3::new(0.0, 0.0, 0.0),
            next_sequence: 0,
            current_channel: 0,
        }
    }

    /// The concurrency bound: the number of rebuilds that may be in flight.
    pub fn max_concurrency(&self) -> usize {
        self.channels.len() * MAX_JOBS_PER_WORKER
    }

    /// Marks a chunk pending at the given version.
    ///
    /// An existing pending entry for the chunk is overwritten in place
    /// (request coalescing); its queue position is kept. The owner is
    /// expected to call `drain` afterwards.
    pub fn queue_rebuild(&mut self, position: ChunkPos, version: u64) {
        match self.pending.get_mut(&position) {
            Some(entry) => entry.version = version,
            None => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                self.pending.insert(position, PendingRebuild { version, sequence });
            }
        }
    }

    /// Updates the reference point used for rebuild prioritization.
    ///
    /// The owner is expected to call `drain` afterwards; a moving viewer can
    /// promote previously low-priority chunks.
    pub fn update_viewer(&mut self, viewer: Point3<f32>) {
        self.viewer = viewer;
    }

    /// Dispatches pending rebuilds while concurrency slots are free.
    ///
    /// Picks the pending chunk with the smallest squared horizontal distance
    /// from its center to the viewer (ties broken by insertion order),
    /// snapshots it together with its four loaded horizontal neighbors, and
    /// ships the job to a worker. Pending entries for chunks that no longer
    /// exist (evicted before dispatch) are discarded; chunks currently in
    /// flight stay pending until their outcome returns.
    pub fn drain(&mut self, chunks: &HashMap<ChunkPos, Chunk>) {
        while self.in_flight.len() < self.max_concurrency() {
            let Some(position) = self.select_next() else {
                break;
            };
            let Some(entry) = self.pending.remove(&position) else {
                break;
            };

            let Some(chunk) = chunks.get(&position) else {
                debug!(
                    "dropping rebuild for unloaded chunk ({}, {})",
                    position.x, position.z
                );
                continue;
            };

            let Some(channel_index) = self.find_available_channel() else {
                self.pending.insert(position, entry);
                break;
            };

            let job = RemeshJob {
                position,
                version: entry.version,
                input: MeshInput {
                    center: ChunkSnapshot::of(chunk),
                    neighbors: Self::neighbor_snapshots(chunks, position),
                },
            };

            match self.channels[channel_index].job_sender.send(job) {
                Ok(()) => {
                    self.channels[channel_index].jobs_in_flight += 1;
                    self.in_flight.insert(position, entry.version);
                    self.current_channel = (channel_index + 1) % self.channels.len();
                }
                Err(_) => {
                    error!("remesh worker channel disconnected; requeueing chunk");
                    self.pending.insert(position, entry);
                    break;
                }
            }
        }
    }

    /// Collects every outcome the workers have finished so far.
    ///
    /// Never blocks; frees the concurrency slot of each returned outcome.
    /// The owner is responsible for the version check before applying any
    /// geometry, and for calling `drain` again afterwards.
    pub fn poll_completed(&mut self) -> Vec<RemeshOutcome> {
        let mut outcomes = Vec::new();
        for channel in &mut self.channels {
            while let Ok(outcome) = channel.outcome_receiver.try_recv() {
                channel.jobs_in_flight -= 1;
                self.in_flight.remove(&outcome.position);
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Number of coalesced rebuild requests waiting for dispatch.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of rebuilds currently running on workers.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a chunk is anywhere in the rebuild pipeline.
    pub fn is_scheduled(&self, position: ChunkPos) -> bool {
        self.pending.contains_key(&position) || self.in_flight.contains_key(&position)
    }

    /// Whether nothing is pending and nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn pending_version(&self, position: ChunkPos) -> Option<u64> {
        self.pending.get(&position).map(|entry| entry.version)
    }

    /// Picks the dispatchable pending chunk nearest to the viewer.
    fn select_next(&self) -> Option<ChunkPos> {
        let mut best: Option<(ChunkPos, f32, u64)> = None;
        for (&position, entry) in &self.pending {
            if self.in_flight.contains_key(&position) {
                continue;
            }
            let distance = position.distance_sq_to(self.viewer.x, self.viewer.z);
            let candidate = (position, distance, entry.sequence);
            best = match best {
                None => Some(candidate),
                Some(current) => {
                    if distance < current.1 || (distance == current.1 && entry.sequence < current.2)
                    {
                        Some(candidate)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best.map(|(position, _, _)| position)
    }

    /// Finds the next worker channel that can accept a job, round-robin from
    /// the last channel used so load spreads evenly.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }
        let start_channel = self.current_channel;
        let mut current = start_channel;
        loop {
            if self.channels[current].jobs_in_flight < MAX_JOBS_PER_WORKER {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Snapshots the four loaded horizontal neighbors of a chunk.
    fn neighbor_snapshots(
        chunks: &HashMap<ChunkPos, Chunk>,
        position: ChunkPos,
    ) -> NeighborSnapshots {
        let snap = |x: i32, z: i32| chunks.get(&ChunkPos::new(x, z)).map(ChunkSnapshot::of);
        NeighborSnapshots {
            west: snap(position.x - 1, position.z),
            east: snap(position.x + 1, position.z),
            south: snap(position.x, position.z - 1),
            north: snap(position.x, position.z + 1),
        }
    }
}

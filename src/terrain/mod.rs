//! # Terrain Generation Module
//!
//! This module provides the `TerrainGenerator`, a stateless algorithm that
//! fills a fresh chunk's blocks from coordinate-deterministic noise plus
//! secondary decoration passes (trees, flowers).
//!
//! ## Determinism
//!
//! Generation is a pure function of world coordinates and the shared seed.
//! The height field comes from multi-octave Perlin noise; every secondary
//! probability roll (ores, trees, leaves, flowers) derives from a hash of
//! the world coordinates, the seed and a distinguishing salt constant per
//! decision. There is no runtime random source anywhere, so regenerating a
//! chunk reproduces the same terrain bit-for-bit and neighboring chunks
//! agree without storing intermediate noise.

use noise::{NoiseFn, Perlin};

use crate::voxels::block::BlockType;
use crate::voxels::chunk::{Chunk, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};

mod decoration;

/// The water surface height; columns below it are flooded up to this level.
pub const SEA_LEVEL: usize = 32;

/// Number of noise octaves summed into the height field.
const HEIGHT_OCTAVES: u32 = 4;
/// Base sampling frequency of the first height octave.
const BASE_FREQUENCY: f64 = 0.012;
/// Amplitude multiplier applied per octave.
const OCTAVE_GAIN: f64 = 0.5;
/// Frequency multiplier applied per octave.
const OCTAVE_LACUNARITY: f64 = 1.9;
/// Distance between the noise planes the octaves sample from.
const OCTAVE_PLANE_STEP: f64 = 31.7;
/// Mean terrain elevation before noise displacement.
const BASE_ELEVATION: f64 = 36.0;
/// Peak-to-mean displacement of the height field.
const HEIGHT_AMPLITUDE: f64 = 28.0;
/// Thickness of the dirt band under the surface block.
const DIRT_DEPTH: usize = 3;

/// Salt for ore placement rolls.
const SALT_ORE: u32 = 0x9d2c_5681;
/// Salt for the per-column tree attempt roll.
const SALT_TREE: u32 = 0x41c6_4e6d;
/// Salt for the trunk height roll.
const SALT_TREE_HEIGHT: u32 = 0x6c07_8965;
/// Salt for per-voxel canopy leaf rolls.
const SALT_LEAF: u32 = 0x2545_f491;
/// Salt for lone flower rolls.
const SALT_FLOWER: u32 = 0xb504_f32d;
/// Salt for flowers sprouting next to a trunk.
const SALT_TRUNK_FLOWER: u32 = 0x85eb_ca77;

/// Chance that a grass column attempts a tree.
const TREE_CHANCE: f32 = 0.01;
/// Chance of a lone flower on a grass column that grew no tree.
const FLOWER_CHANCE: f32 = 0.02;

/// Coordinate-deterministic terrain generator.
///
/// Holds the shared world seed and the Perlin source derived from it. All
/// methods are read-only on the generator itself; `populate` is the single
/// entry point that fills a chunk.
pub struct TerrainGenerator {
    seed: u32,
    perlin: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator for the given world seed.
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            seed,
            perlin: Perlin::new(seed),
        }
    }

    /// The shared world seed this generator was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Fills every column of a freshly created chunk, deterministically.
    ///
    /// Runs two passes: the height-field fill first, then decoration. The
    /// split matters because tree clearance checks read neighboring columns,
    /// which must already hold their final terrain before any tree commits.
    ///
    /// # Arguments
    /// * `chunk` - A chunk whose cells are still all air
    pub fn populate(&self, chunk: &mut Chunk) {
        let (origin_x, origin_z) = chunk.position.origin();
        let mut heights = [0usize; CHUNK_SIZE_X * CHUNK_SIZE_Z];

        for lz in 0..CHUNK_SIZE_Z as i32 {
            for lx in 0..CHUNK_SIZE_X as i32 {
                let wx = origin_x + lx;
                let wz = origin_z + lz;
                let height = self.column_height(wx, wz);
                heights[lx as usize + CHUNK_SIZE_X * lz as usize] = height;
                self.fill_column(chunk, lx, lz, wx, wz, height);
            }
        }

        for lz in 0..CHUNK_SIZE_Z as i32 {
            for lx in 0..CHUNK_SIZE_X as i32 {
                let wx = origin_x + lx;
                let wz = origin_z + lz;
                let height = heights[lx as usize + CHUNK_SIZE_X * lz as usize];
                self.decorate_column(chunk, lx, lz, wx, wz, height);
            }
        }
    }

    /// The terrain height of a world-space column.
    ///
    /// Sums `HEIGHT_OCTAVES` octaves of 3D Perlin noise sampled at
    /// `(x * f, seed_plane + octave * step, z * f)` with amplitude halving
    /// and ~1.9x frequency scaling per octave, then offsets by the base
    /// elevation and clamps into `[2, CHUNK_HEIGHT - 2]`.
    ///
    /// This is also the function the spawn-point scan probes, so it must
    /// stay consistent with what `populate` actually builds.
    pub fn column_height(&self, wx: i32, wz: i32) -> usize {
        let seed_plane = (self.seed % 4096) as f64;
        let mut amplitude = 1.0;
        let mut frequency = BASE_FREQUENCY;
        let mut sum = 0.0;
        let mut norm = 0.0;

        for octave in 0..HEIGHT_OCTAVES {
            let plane = seed_plane + octave as f64 * OCTAVE_PLANE_STEP;
            sum += amplitude
                * self
                    .perlin
                    .get([wx as f64 * frequency, plane, wz as f64 * frequency]);
            norm += amplitude;
            amplitude *= OCTAVE_GAIN;
            frequency *= OCTAVE_LACUNARITY;
        }

        let height = BASE_ELEVATION + (sum / norm) * HEIGHT_AMPLITUDE;
        (height.round() as i64).clamp(2, (CHUNK_HEIGHT - 2) as i64) as usize
    }

    /// The surface block a column of the given height carries.
    ///
    /// Sand caps low-lying and submerged columns, grass everything else.
    pub fn surface_block(height: usize) -> BlockType {
        if height <= SEA_LEVEL + 1 {
            BlockType::SAND
        } else {
            BlockType::GRASS
        }
    }

    /// Fills one column: stone bulk with ore rolls, the dirt band, the
    /// surface block, and the water fill for submerged columns.
    fn fill_column(&self, chunk: &mut Chunk, lx: i32, lz: i32, wx: i32, wz: i32, height: usize) {
        let surface = Self::surface_block(height);
        let dirt_floor = height.saturating_sub(DIRT_DEPTH);

        for y in 0..=height {
            let block = if y == height {
                surface
            } else if y >= dirt_floor {
                BlockType::DIRT
            } else {
                self.stone_or_ore(wx, y as i32, wz)
            };
            chunk.set(lx, y as i32, lz, block);
        }

        if height < SEA_LEVEL {
            for y in (height + 1)..=SEA_LEVEL {
                chunk.set(lx, y as i32, lz, BlockType::WATER);
            }
        }
    }

    /// Rolls the ore table for one stone cell.
    fn stone_or_ore(&self, wx: i32, wy: i32, wz: i32) -> BlockType {
        let roll = self.roll(wx, wy, wz, SALT_ORE);
        if wy < 24 && roll < 0.015 {
            BlockType::IRON_ORE
        } else if roll < 0.05 {
            BlockType::COAL_ORE
        } else {
            BlockType::STONE
        }
    }

    /// Deterministic roll in `[0, 1)` from world coordinates, the shared
    /// seed and a salt constant distinguishing the decision being made.
    fn roll(&self, wx: i32, wy: i32, wz: i32, salt: u32) -> f32 {
        let mut h = self.seed ^ salt;
        h ^= (wx as u32).wrapping_mul(0x85eb_ca6b);
        h = h.rotate_left(13);
        h ^= (wy as u32).wrapping_mul(0xc2b2_ae35);
        h = h.rotate_left(13);
        h ^= (wz as u32).wrapping_mul(0x27d4_eb2f);
        h ^= h >> 16;
        h = h.wrapping_mul(0x045d_9f3b);
        h ^= h >> 16;
        (h & 0xFFFF) as f32 / 65536.0
    }

    /// Two-coordinate variant of `roll` for per-column decisions.
    fn roll2(&self, wx: i32, wz: i32, salt: u32) -> f32 {
        self.roll(wx, 0, wz, salt)
    }
}

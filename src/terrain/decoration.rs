//! # Decoration Pass
//!
//! The secondary generation pass: trees and flowers placed on top of the
//! filled height field. Runs strictly after every column of the chunk holds
//! its final terrain, because tree clearance checks read neighboring
//! columns.
//!
//! Decoration never crosses a chunk boundary; trees are rejected within two
//! blocks of the horizontal edge so the canopy always fits inside the chunk
//! being generated.

use crate::voxels::block::BlockType;
use crate::voxels::chunk::{Chunk, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};

use super::{
    TerrainGenerator, FLOWER_CHANCE, SALT_FLOWER, SALT_LEAF, SALT_TREE, SALT_TREE_HEIGHT,
    SALT_TRUNK_FLOWER, TREE_CHANCE,
};

/// Minimum trunk height of a generated tree.
const TRUNK_MIN_HEIGHT: usize = 4;
/// Number of trunk height variants (`TRUNK_MIN_HEIGHT..TRUNK_MIN_HEIGHT + 3`).
const TRUNK_HEIGHT_VARIANTS: f32 = 3.0;
/// Horizontal clearance radius a tree needs before it commits.
const TREE_CLEARANCE_RADIUS: i32 = 2;
/// How close to the chunk's horizontal edge a tree may stand.
const TREE_EDGE_MARGIN: i32 = 2;
/// Manhattan radius of each canopy layer, bottom to top.
const CANOPY_LAYER_RADII: [i32; 4] = [2, 2, 1, 1];
/// Chance that an outermost canopy cell actually grows a leaf.
const CANOPY_EDGE_LEAF_CHANCE: f32 = 0.6;
/// Chance of a flower in each cell ringing a freshly planted trunk.
const TRUNK_FLOWER_CHANCE: f32 = 0.12;

impl TerrainGenerator {
    /// Decorates one generated column: a tree attempt first, then a
    /// low-probability lone flower if no tree grew.
    pub(super) fn decorate_column(
        &self,
        chunk: &mut Chunk,
        lx: i32,
        lz: i32,
        wx: i32,
        wz: i32,
        height: usize,
    ) {
        if Self::surface_block(height) != BlockType::GRASS {
            return;
        }

        let planted = self.roll2(wx, wz, SALT_TREE) < TREE_CHANCE
            && self.try_place_tree(chunk, lx, lz, wx, wz, height);

        if !planted
            && self.roll2(wx, wz, SALT_FLOWER) < FLOWER_CHANCE
            && chunk.get(lx, height as i32 + 1, lz) == BlockType::AIR
        {
            chunk.set(lx, height as i32 + 1, lz, BlockType::FLOWER);
        }
    }

    /// Attempts to grow a tree rooted on the surface block of a column.
    ///
    /// Placement is rejected near the chunk's horizontal edge (decoration
    /// never crosses chunks), when there is not enough vertical room, or
    /// when the cylindrical volume the tree needs is not fully passable.
    /// Only once all checks pass does anything get written.
    ///
    /// # Returns
    /// `true` if the tree was committed.
    pub(crate) fn try_place_tree(
        &self,
        chunk: &mut Chunk,
        lx: i32,
        lz: i32,
        wx: i32,
        wz: i32,
        ground: usize,
    ) -> bool {
        if lx < TREE_EDGE_MARGIN
            || lx >= CHUNK_SIZE_X as i32 - TREE_EDGE_MARGIN
            || lz < TREE_EDGE_MARGIN
            || lz >= CHUNK_SIZE_Z as i32 - TREE_EDGE_MARGIN
        {
            return false;
        }

        let trunk_height = TRUNK_MIN_HEIGHT
            + (self.roll2(wx, wz, SALT_TREE_HEIGHT) * TRUNK_HEIGHT_VARIANTS) as usize;
        let crown_top = ground + trunk_height + 2;
        if crown_top >= CHUNK_HEIGHT {
            return false;
        }

        // Clearance: a passable cylinder of radius 2 over the full height of
        // the tree, checked before anything is written.
        for y in (ground as i32 + 1)..=(crown_top as i32) {
            for dz in -TREE_CLEARANCE_RADIUS..=TREE_CLEARANCE_RADIUS {
                for dx in -TREE_CLEARANCE_RADIUS..=TREE_CLEARANCE_RADIUS {
                    if dx * dx + dz * dz > TREE_CLEARANCE_RADIUS * TREE_CLEARANCE_RADIUS {
                        continue;
                    }
                    if !chunk.get(lx + dx, y, lz + dz).is_passable() {
                        return false;
                    }
                }
            }
        }

        for y in (ground + 1)..=(ground + trunk_height) {
            chunk.set(lx, y as i32, lz, BlockType::WOOD);
        }

        self.place_canopy(chunk, lx, lz, wx, wz, ground + trunk_height);
        self.place_trunk_flowers(chunk, lx, lz, wx, wz, ground);
        true
    }

    /// Writes the layered canopy around the trunk top.
    ///
    /// Each layer is a Manhattan-distance diamond; outermost cells grow a
    /// leaf probabilistically from a per-voxel roll so no two canopies look
    /// alike.
    fn place_canopy(&self, chunk: &mut Chunk, lx: i32, lz: i32, wx: i32, wz: i32, trunk_top: usize) {
        for (layer, &radius) in CANOPY_LAYER_RADII.iter().enumerate() {
            let y = trunk_top as i32 - 1 + layer as i32;
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    let manhattan = dx.abs() + dz.abs();
                    if manhattan > radius {
                        continue;
                    }
                    if dx == 0 && dz == 0 && y <= trunk_top as i32 {
                        continue; // the trunk itself
                    }
                    if manhattan == radius
                        && self.roll(wx + dx, y, wz + dz, SALT_LEAF) >= CANOPY_EDGE_LEAF_CHANCE
                    {
                        continue;
                    }
                    if chunk.get(lx + dx, y, lz + dz) == BlockType::AIR {
                        chunk.set(lx + dx, y, lz + dz, BlockType::LEAVES);
                    }
                }
            }
        }
    }

    /// Rolls a flower for each grass cell ringing a freshly planted trunk.
    fn place_trunk_flowers(
        &self,
        chunk: &mut Chunk,
        lx: i32,
        lz: i32,
        wx: i32,
        wz: i32,
        ground: usize,
    ) {
        let y = ground as i32 + 1;
        for (dx, dz) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            if self.roll(wx + dx, y, wz + dz, SALT_TRUNK_FLOWER) >= TRUNK_FLOWER_CHANCE {
                continue;
            }
            if chunk.get(lx + dx, y, lz + dz) == BlockType::AIR
                && chunk.get(lx + dx, y - 1, lz + dz) == BlockType::GRASS
            {
                chunk.set(lx + dx, y, lz + dz, BlockType::FLOWER);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::chunk::ChunkPos;

    /// A flat grass platform at the given ground height.
    fn platform(ground: usize) -> Chunk {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        for lz in 0..CHUNK_SIZE_Z as i32 {
            for lx in 0..CHUNK_SIZE_X as i32 {
                for y in 0..ground {
                    chunk.set(lx, y as i32, lz, BlockType::DIRT);
                }
                chunk.set(lx, ground as i32, lz, BlockType::GRASS);
            }
        }
        chunk
    }

    #[test]
    fn tree_commits_on_open_ground() {
        let generator = TerrainGenerator::new(11);
        let ground = 40;
        let mut chunk = platform(ground);
        assert!(generator.try_place_tree(&mut chunk, 8, 8, 8, 8, ground));
        assert_eq!(chunk.get(8, ground as i32 + 1, 8), BlockType::WOOD);
        assert!(chunk.counts()[BlockType::LEAVES as usize] > 0);
    }

    #[test]
    fn tree_rejected_near_chunk_edge() {
        let generator = TerrainGenerator::new(11);
        let ground = 40;
        let mut chunk = platform(ground);
        assert!(!generator.try_place_tree(&mut chunk, 1, 8, 1, 8, ground));
        assert!(!generator.try_place_tree(&mut chunk, 8, 15, 8, 15, ground));
        assert_eq!(chunk.counts()[BlockType::WOOD as usize], 0);
    }

    #[test]
    fn tree_rejected_when_volume_is_blocked() {
        let generator = TerrainGenerator::new(11);
        let ground = 40;
        let mut chunk = platform(ground);
        // An obstruction one block to the side, within the clearance radius.
        chunk.set(9, ground as i32 + 3, 8, BlockType::STONE);
        assert!(!generator.try_place_tree(&mut chunk, 8, 8, 8, 8, ground));
        assert_eq!(chunk.counts()[BlockType::WOOD as usize], 0);
    }

    #[test]
    fn tree_rejected_without_vertical_room() {
        let generator = TerrainGenerator::new(11);
        let ground = CHUNK_HEIGHT - 4;
        let mut chunk = platform(ground);
        assert!(!generator.try_place_tree(&mut chunk, 8, 8, 8, 8, ground));
    }

    #[test]
    fn canopy_stays_within_the_edge_margin() {
        let generator = TerrainGenerator::new(23);
        let ground = 40;
        let mut chunk = platform(ground);
        assert!(generator.try_place_tree(
            &mut chunk,
            TREE_EDGE_MARGIN,
            TREE_EDGE_MARGIN,
            TREE_EDGE_MARGIN,
            TREE_EDGE_MARGIN,
            ground
        ));
        // Nothing may have landed out of bounds; counts must still sum to
        // the chunk volume.
        let total: u64 = chunk.counts().iter().map(|&c| c as u64).sum();
        assert_eq!(total, crate::voxels::chunk::CHUNK_VOLUME as u64);
    }
}

//! Visibility-driven mesh construction.
//!
//! This module turns a chunk snapshot (plus read-only neighbor borders) into
//! renderable surface geometry. Every non-air block contributes only the
//! faces that can actually be seen: a face is culled when the adjacent
//! block fully hides it. Opaque terrain and translucent water are emitted
//! into separate buffers because they render in different passes.

use crate::voxels::block::{
    atlas_uv, BlockSide, BlockType, BLOCK_TYPE_TO_FACE_TINTS, BLOCK_TYPE_TO_TILE_INDICES,
};
use crate::voxels::chunk::{CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};

use super::geometry::{ChunkGeometry, GeometrySet};
use super::snapshot::MeshInput;

/// Quad corner offsets within the unit cube, per `BlockSide`, wound
/// counter-clockwise as seen from outside the block.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // FRONT (+z)
    [
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ],
    // BACK (-z)
    [
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
    ],
    // BOTTOM (-y)
    [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
    ],
    // TOP (+y)
    [
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 1.0, 0.0],
    ],
    // LEFT (-x)
    [
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [0.0, 1.0, 0.0],
    ],
    // RIGHT (+x)
    [
        [1.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [1.0, 1.0, 1.0],
    ],
];

/// Unit-square UV corners matching the `FACE_CORNERS` winding.
const FACE_UV_CORNERS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// Strength of the per-face tint variation.
const TINT_JITTER: f32 = 0.15;

/// Builds the surface geometry for one chunk from its snapshot.
///
/// Iterates every non-air block and emits each of its six faces only when
/// the adjacent block (looked up through the neighbor borders at chunk
/// edges, air where no neighbor is loaded) does not hide it. Flowers are
/// emitted as crossed quads outside the face-cull loop. Water lands in the
/// liquid buffer, everything else in the solid buffer; a buffer that ends
/// up empty is reported as absent.
pub fn build_geometry(input: &MeshInput) -> GeometrySet {
    let mut solid = ChunkGeometry::new();
    let mut liquid = ChunkGeometry::new();
    let (origin_x, origin_z) = input.center.position.origin();

    for y in 0..CHUNK_HEIGHT as i32 {
        for lz in 0..CHUNK_SIZE_Z as i32 {
            for lx in 0..CHUNK_SIZE_X as i32 {
                let block = input.center.get(lx, y, lz);
                if block == BlockType::AIR {
                    continue;
                }

                let wx = origin_x + lx;
                let wz = origin_z + lz;

                if block == BlockType::FLOWER {
                    emit_flower(&mut solid, wx, y, wz);
                    continue;
                }

                let target = if block.is_liquid() {
                    &mut liquid
                } else {
                    &mut solid
                };

                for side in BlockSide::all() {
                    let offset = side.offset();
                    let neighbor = input.sample(lx + offset[0], y + offset[1], lz + offset[2]);
                    if block.face_visible_against(neighbor) {
                        emit_face(target, block, side, wx, y, wz);
                    }
                }
            }
        }
    }

    GeometrySet {
        solid: (!solid.is_empty()).then_some(solid),
        liquid: (!liquid.is_empty()).then_some(liquid),
    }
}

/// Emits one culled-cube face at the given world position.
fn emit_face(geometry: &mut ChunkGeometry, block: BlockType, side: BlockSide, wx: i32, y: i32, wz: i32) {
    let family = side.family();
    let tile = BLOCK_TYPE_TO_TILE_INDICES[block as usize][family];
    let color = face_tint(block, family, wx, y, wz);

    let mut corners = FACE_CORNERS[side as usize];
    for corner in &mut corners {
        corner[0] += wx as f32;
        corner[1] += y as f32;
        corner[2] += wz as f32;
    }

    let uvs = FACE_UV_CORNERS.map(|[u, v]| atlas_uv(tile, u, v));
    geometry.push_quad(corners, side.normal(), color, uvs);
}

/// Emits a flower as two crossing quads spanning the cell diagonals.
fn emit_flower(geometry: &mut ChunkGeometry, wx: i32, y: i32, wz: i32) {
    let (x, fy, z) = (wx as f32, y as f32, wz as f32);
    let tile = BLOCK_TYPE_TO_TILE_INDICES[BlockType::FLOWER as usize][1];
    let color = face_tint(BlockType::FLOWER, 1, wx, y, wz);
    let uvs = FACE_UV_CORNERS.map(|[u, v]| atlas_uv(tile, u, v));
    let diag = std::f32::consts::FRAC_1_SQRT_2;

    geometry.push_quad(
        [
            [x, fy, z],
            [x + 1.0, fy, z + 1.0],
            [x + 1.0, fy + 1.0, z + 1.0],
            [x, fy + 1.0, z],
        ],
        [-diag, 0.0, diag],
        color,
        uvs,
    );
    geometry.push_quad(
        [
            [x + 1.0, fy, z],
            [x, fy, z + 1.0],
            [x, fy + 1.0, z + 1.0],
            [x + 1.0, fy + 1.0, z],
        ],
        [-diag, 0.0, -diag],
        color,
        uvs,
    );
}

/// Synthesizes the tint for one face from the block's base tint and a
/// coordinate hash, so visually identical block types still vary from cell
/// to cell without any per-block texture storage.
fn face_tint(block: BlockType, family: usize, wx: i32, wy: i32, wz: i32) -> [f32; 3] {
    let base = BLOCK_TYPE_TO_FACE_TINTS[block as usize][family];
    let jitter = 1.0 + (tint_roll(wx, wy, wz) - 0.5) * TINT_JITTER;
    [
        (base[0] * jitter).clamp(0.0, 1.0),
        (base[1] * jitter).clamp(0.0, 1.0),
        (base[2] * jitter).clamp(0.0, 1.0),
    ]
}

/// Deterministic per-cell roll in `[0, 1)` used only for visual variation.
fn tint_roll(wx: i32, wy: i32, wz: i32) -> f32 {
    let mut h = 0x811c_9dc5u32;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshing::snapshot::{ChunkSnapshot, NeighborSnapshots};
    use crate::voxels::chunk::{Chunk, ChunkPos};

    fn input_of(chunk: &Chunk) -> MeshInput {
        MeshInput {
            center: ChunkSnapshot::of(chunk),
            neighbors: NeighborSnapshots::default(),
        }
    }

    #[test]
    fn lone_block_emits_six_faces() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set(8, 40, 8, BlockType::STONE);
        let set = build_geometry(&input_of(&chunk));
        let solid = set.solid.expect("solid geometry");
        assert_eq!(solid.vertices.len(), 24);
        assert_eq!(solid.indices.len(), 36);
        assert!(set.liquid.is_none());
    }

    #[test]
    fn touching_faces_are_culled() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set(8, 40, 8, BlockType::STONE);
        chunk.set(9, 40, 8, BlockType::DIRT);
        let set = build_geometry(&input_of(&chunk));
        // Two cubes sharing one face: 10 visible faces instead of 12.
        assert_eq!(set.solid.unwrap().vertices.len(), 40);
    }

    #[test]
    fn buried_blocks_emit_nothing() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        for y in 40..43 {
            for lz in 6..9 {
                for lx in 6..9 {
                    chunk.set(lx, y, lz, BlockType::STONE);
                }
            }
        }
        let set = build_geometry(&input_of(&chunk));
        // A 3x3x3 cube exposes 9 faces per side; the core block is invisible.
        assert_eq!(set.solid.unwrap().vertices.len(), 6 * 9 * 4);
    }

    #[test]
    fn loaded_neighbor_culls_the_seam_face() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set(0, 40, 8, BlockType::STONE);

        let alone = build_geometry(&input_of(&chunk));
        assert_eq!(alone.solid.unwrap().vertices.len(), 24);

        let mut west = Chunk::new(ChunkPos::new(-1, 0));
        west.set(CHUNK_SIZE_X as i32 - 1, 40, 8, BlockType::STONE);
        let input = MeshInput {
            center: ChunkSnapshot::of(&chunk),
            neighbors: NeighborSnapshots {
                west: Some(ChunkSnapshot::of(&west)),
                ..Default::default()
            },
        };
        let culled = build_geometry(&input);
        assert_eq!(culled.solid.unwrap().vertices.len(), 20);
    }

    #[test]
    fn water_meshes_into_the_liquid_buffer() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set(8, 40, 8, BlockType::STONE);
        chunk.set(8, 41, 8, BlockType::WATER);
        let set = build_geometry(&input_of(&chunk));
        // The stone keeps all six faces (water does not hide them) and the
        // water cube emits all six of its own against air and stone.
        assert_eq!(set.solid.unwrap().vertices.len(), 24);
        assert_eq!(set.liquid.unwrap().vertices.len(), 24);
    }

    #[test]
    fn flowers_emit_crossed_quads() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set(8, 40, 8, BlockType::FLOWER);
        let set = build_geometry(&input_of(&chunk));
        let solid = set.solid.unwrap();
        assert_eq!(solid.vertices.len(), 8);
        assert_eq!(solid.indices.len(), 12);
    }

    #[test]
    fn positions_are_world_space() {
        let mut chunk = Chunk::new(ChunkPos::new(1, 0));
        chunk.set(0, 40, 0, BlockType::STONE);
        let set = build_geometry(&input_of(&chunk));
        let solid = set.solid.unwrap();
        assert!(solid
            .vertices
            .iter()
            .all(|v| v.position[0] >= 16.0 && v.position[0] <= 17.0));
    }

    #[test]
    fn empty_chunk_produces_no_geometry() {
        let chunk = Chunk::new(ChunkPos::new(0, 0));
        let set = build_geometry(&input_of(&chunk));
        assert!(set.solid.is_none());
        assert!(set.liquid.is_none());
    }
}

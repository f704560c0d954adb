//! Integration tests driving the full generate -> edit -> remesh pipeline
//! through the public `World` API, with real worker threads.

use std::thread;
use std::time::{Duration, Instant};

use voxel_terrain::config::EngineConfig;
use voxel_terrain::meshing::ChunkGeometry;
use voxel_terrain::terrain::{TerrainGenerator, SEA_LEVEL};
use voxel_terrain::voxels::world::UNLOADED_SURFACE_OFFSET;
use voxel_terrain::voxels::{BlockType, ChunkPos, World};

fn test_config(seed: u32) -> EngineConfig {
    EngineConfig {
        seed,
        worker_threads: Some(2),
        ..EngineConfig::default()
    }
}

fn pump_until_settled(world: &mut World) {
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        world.pump();
        if world.is_settled() {
            return;
        }
        assert!(Instant::now() < deadline, "remesh pipeline never settled");
        thread::sleep(Duration::from_millis(2));
    }
}

/// Finds an undecorated surface column among the given candidates: plain
/// surface block on top, dirt underneath, nothing but air or water above.
/// Keeps the edit tests independent of where trees and flowers landed.
fn find_plain_column(world: &World, candidates: &[(i32, i32)]) -> (i32, i32, i32) {
    for &(wx, wz) in candidates {
        let top = world.surface_height(wx, wz) - 1;
        let surface = world.get_block(wx, top, wz);
        let above = world.get_block(wx, top + 1, wz);
        let below = world.get_block(wx, top - 1, wz);
        if matches!(surface, BlockType::GRASS | BlockType::SAND)
            && matches!(above, BlockType::AIR | BlockType::WATER)
            && below == BlockType::DIRT
        {
            return (wx, wz, top);
        }
    }
    panic!("no plain surface column among the candidates");
}

/// Whether the geometry contains the upward-facing quad covering exactly the
/// cell `(wx, wz)` at the plane `y`.
fn has_top_face_quad(geometry: &ChunkGeometry, wx: i32, y: i32, wz: i32) -> bool {
    let plane = y as f32;
    let (x0, x1) = (wx as f32, wx as f32 + 1.0);
    let (z0, z1) = (wz as f32, wz as f32 + 1.0);

    geometry.vertices.chunks_exact(4).any(|quad| {
        quad.iter()
            .all(|v| v.position[1] == plane && v.normal == [0.0, 1.0, 0.0])
            && quad.iter().any(|v| v.position[0] == x0)
            && quad.iter().any(|v| v.position[0] == x1)
            && quad.iter().any(|v| v.position[2] == z0)
            && quad.iter().any(|v| v.position[2] == z1)
    })
}

/// All interior columns of chunk (0, 0).
fn interior_columns() -> Vec<(i32, i32)> {
    let mut columns = Vec::new();
    for wz in 1..15 {
        for wx in 1..15 {
            columns.push((wx, wz));
        }
    }
    columns
}

#[test]
fn fixed_seed_columns_match_the_height_function() {
    let mut world = World::new(test_config(424242));
    world.ensure_chunk(ChunkPos::new(0, 0));

    let generator = TerrainGenerator::new(424242);
    for (wx, wz) in [(3, 3), (8, 8), (12, 5)] {
        let height = generator.column_height(wx, wz) as i32;
        let surface = TerrainGenerator::surface_block(height as usize);
        assert_eq!(world.get_block(wx, height, wz), surface);
        assert_eq!(world.get_block(wx, height - 1, wz), BlockType::DIRT);
        assert!(matches!(
            world.get_block(wx, 2, wz),
            BlockType::STONE | BlockType::COAL_ORE | BlockType::IRON_ORE
        ));
        if (height as usize) < SEA_LEVEL {
            assert_eq!(world.get_block(wx, SEA_LEVEL as i32, wz), BlockType::WATER);
        }
    }
}

#[test]
fn removing_a_block_removes_its_face_after_the_rebuild() {
    let mut world = World::new(test_config(7));
    let position = ChunkPos::new(0, 0);
    world.ensure_chunk(position);
    pump_until_settled(&mut world);

    let (wx, wz, top) = find_plain_column(&world, &interior_columns());
    {
        let solid = world
            .chunk(position)
            .unwrap()
            .solid_geometry
            .as_ref()
            .expect("generated chunk has solid geometry");
        assert!(has_top_face_quad(solid, wx, top + 1, wz));
    }

    assert!(world.set_block(wx, top, wz, BlockType::AIR));
    assert!(world.is_rebuild_scheduled(position));
    pump_until_settled(&mut world);

    let solid = world
        .chunk(position)
        .unwrap()
        .solid_geometry
        .as_ref()
        .expect("chunk still has solid geometry");
    assert!(!has_top_face_quad(solid, wx, top + 1, wz));
    // The block underneath is exposed now.
    assert!(has_top_face_quad(solid, wx, top, wz));
}

#[test]
fn boundary_edits_requeue_the_adjacent_chunk() {
    let mut world = World::new(test_config(7));
    world.ensure_chunk(ChunkPos::new(0, 0));
    world.ensure_chunk(ChunkPos::new(-1, 0));
    pump_until_settled(&mut world);

    // A column on the shared boundary of the two chunks (local x == 0).
    let candidates: Vec<(i32, i32)> = (0..16).map(|wz| (0, wz)).collect();
    let (wx, wz, top) = find_plain_column(&world, &candidates);

    assert!(world.set_block(wx, top, wz, BlockType::AIR));
    assert!(world.is_rebuild_scheduled(ChunkPos::new(0, 0)));
    assert!(world.is_rebuild_scheduled(ChunkPos::new(-1, 0)));
    pump_until_settled(&mut world);
}

#[test]
fn rapid_edits_only_ever_apply_the_final_state() {
    let mut world = World::new(test_config(7));
    let position = ChunkPos::new(0, 0);
    world.ensure_chunk(position);

    // Two edits issued back to back, racing the initial rebuild.
    let (wx, wz, top) = find_plain_column(&world, &interior_columns());
    assert!(world.set_block(wx, top, wz, BlockType::AIR));
    assert!(world.set_block(wx, top - 1, wz, BlockType::AIR));
    pump_until_settled(&mut world);

    let solid = world
        .chunk(position)
        .unwrap()
        .solid_geometry
        .as_ref()
        .expect("chunk has solid geometry");
    // No face of any intermediate state survives: both removed cells are
    // open and the cube below the second one is the exposed surface.
    assert!(!has_top_face_quad(solid, wx, top + 1, wz));
    assert!(!has_top_face_quad(solid, wx, top, wz));
    assert!(has_top_face_quad(solid, wx, top - 1, wz));
}

#[test]
fn surface_height_falls_back_over_unloaded_chunks() {
    let world = World::new(test_config(7));
    assert_eq!(
        world.surface_height(12345, -9876),
        SEA_LEVEL as i32 + UNLOADED_SURFACE_OFFSET
    );
}

#[test]
fn spawn_point_is_reproducible() {
    let world_a = World::new(test_config(2024));
    let world_b = World::new(test_config(2024));
    let spawn_a = world_a.spawn_point();
    let spawn_b = world_b.spawn_point();
    assert_eq!(spawn_a.x, spawn_b.x);
    assert_eq!(spawn_a.y, spawn_b.y);
    assert_eq!(spawn_a.z, spawn_b.z);
    // The spawn stands on generated ground, above the world floor.
    assert!(spawn_a.y > 2.0);
}

#[test]
fn block_totals_track_a_burst_of_edits() {
    let mut world = World::new(test_config(31));
    world.ensure_area(ChunkPos::new(0, 0), 1);
    pump_until_settled(&mut world);

    let before = world.block_totals();
    let (wx, wz, top) = find_plain_column(&world, &interior_columns());
    let removed = world.get_block(wx, top, wz);
    assert!(world.set_block(wx, top, wz, BlockType::AIR));

    let after = world.block_totals();
    assert_eq!(after[removed as usize], before[removed as usize] - 1);
    assert_eq!(
        after[BlockType::AIR as usize],
        before[BlockType::AIR as usize] + 1
    );
    let total_before: u64 = before.iter().sum();
    let total_after: u64 = after.iter().sum();
    assert_eq!(total_before, total_after);
}

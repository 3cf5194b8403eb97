use glam::{IVec2, UVec2, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use tileworld::geometry::Rect;
use tileworld::tiles::{AtlasRegion, TileRegistryBuilder};
use tileworld::{CacheState, Chunk, ChunkError, Tile, TileRegistry, VertexSink};

// ── Fixtures ──────────────────────────────────────────────────────────────

fn registry() -> TileRegistry {
    let mut b = TileRegistryBuilder::new(256, 256);
    b.insert("minecraft:stone", AtlasRegion::new(0, 0, 16, 16), false)
        .insert("minecraft:dirt", AtlasRegion::new(16, 0, 16, 16), false)
        .insert("minecraft:grass", AtlasRegion::new(32, 0, 16, 16), true);
    b.build()
}

fn chunk_at(location: Vec2, w: u32, h: u32) -> Chunk {
    Chunk::new(UVec2::new(w, h), location, Vec2::splat(16.0))
}

fn positions(sink: &VertexSink) -> Vec<[f32; 2]> {
    sink.vertices.iter().map(|v| v.position).collect()
}

// ── get / set ─────────────────────────────────────────────────────────────

#[test]
fn set_then_get_returns_the_tile_everywhere_in_bounds() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 5, 3);
    for y in 0..3 {
        for x in 0..5 {
            let pos = IVec2::new(x, y);
            let tile = Tile::new("minecraft:dirt", &reg).with_world_position(pos.as_vec2());
            c.set(pos, tile.clone()).unwrap();
            assert_eq!(c.get(pos), Some(&tile), "cell ({x}, {y})");
        }
    }
    assert_eq!(c.tile_count(), 15);
}

#[test]
fn out_of_bounds_get_is_empty_and_set_changes_nothing() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 4, 4);
    c.fill_all(Tile::new("minecraft:stone", &reg));

    for pos in [IVec2::new(4, 0), IVec2::new(0, 4), IVec2::new(-1, 2), IVec2::new(2, -1), IVec2::new(9, 9)] {
        assert!(c.get(pos).is_none(), "{pos} should read as empty");
        let err = c.set(pos, Tile::new("minecraft:dirt", &reg)).unwrap_err();
        assert!(matches!(err, ChunkError::OutOfBounds { .. }));
    }
    assert_eq!(c.tile_count(), 16);
    assert!((0..4).all(|y| (0..4).all(|x| c.get(IVec2::new(x, y)).unwrap().type_id() == "minecraft:stone")));
}

#[test]
fn one_axis_in_range_is_still_out_of_bounds() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 16, 16);
    assert!(c.set(IVec2::new(3, 16), Tile::new("minecraft:dirt", &reg)).is_err());
    assert!(c.set(IVec2::new(16, 3), Tile::new("minecraft:dirt", &reg)).is_err());
    assert_eq!(c.tile_count(), 0);
}

#[test]
fn set_returns_chunk_for_chaining() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 2, 2);
    c.set(IVec2::new(0, 0), Tile::new("minecraft:dirt", &reg))
        .unwrap()
        .set(IVec2::new(1, 1), Tile::new("minecraft:grass", &reg))
        .unwrap();
    assert_eq!(c.tile_count(), 2);
}

// ── fill ──────────────────────────────────────────────────────────────────

#[test]
fn fill_excludes_the_end_corner() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 4, 4);
    c.fill(IVec2::new(0, 0), IVec2::new(2, 2), Tile::new("minecraft:stone", &reg)).unwrap();

    for pos in [IVec2::new(0, 0), IVec2::new(0, 1), IVec2::new(1, 0), IVec2::new(1, 1)] {
        assert!(c.get(pos).is_some(), "{pos} should be filled");
    }
    assert!(c.get(IVec2::new(2, 2)).is_none());
    assert!(c.get(IVec2::new(2, 0)).is_none());
    assert!(c.get(IVec2::new(0, 2)).is_none());
    assert_eq!(c.tile_count(), 4);
}

#[test]
fn fill_with_an_out_of_bounds_corner_writes_nothing() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 4, 4);
    let err = c.fill(IVec2::new(0, 0), IVec2::new(4, 4), Tile::new("minecraft:stone", &reg)).unwrap_err();
    assert_eq!(err, ChunkError::OutOfBounds { x: 4, y: 4, width: 4, height: 4 });
    assert_eq!(c.tile_count(), 0);
}

#[test]
fn filled_tiles_are_independent_copies_of_the_same_region() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 3, 3);
    c.fill(IVec2::new(0, 0), IVec2::new(2, 2), Tile::new("minecraft:dirt", &reg)).unwrap();
    let a = c.get(IVec2::new(0, 0)).unwrap();
    let b = c.get(IVec2::new(1, 1)).unwrap();
    assert_eq!(a.region(), b.region());
    assert!(!std::ptr::eq(a, b));
}

// ── Cache invalidation ────────────────────────────────────────────────────

#[test]
fn draw_caches_and_resubmits_without_rebuilding() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 2, 2);
    c.set(IVec2::new(0, 0), Tile::new("minecraft:stone", &reg)).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let mut first = VertexSink::new();
    assert!(c.draw(&mut first, &mut rng), "first draw builds the batch");
    assert_eq!(c.cache_state(), CacheState::Clean);

    let mut second = VertexSink::new();
    assert!(!c.draw(&mut second, &mut rng), "second draw reuses it");
    assert_eq!(first.vertices, second.vertices);
}

#[test]
fn set_after_draw_forces_rebuild_from_current_grid() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 2, 2);
    c.set(IVec2::new(0, 0), Tile::new("minecraft:stone", &reg)).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let mut before = VertexSink::new();
    c.draw(&mut before, &mut rng);
    assert_eq!(before.vertices.len(), 6);

    c.set(IVec2::new(1, 1), Tile::new("minecraft:dirt", &reg)).unwrap();
    assert_eq!(c.cache_state(), CacheState::Dirty);

    let mut after = VertexSink::new();
    assert!(c.draw(&mut after, &mut rng));
    assert_eq!(after.vertices.len(), 12, "new tile appears in the rebuilt batch");
}

#[test]
fn fill_after_draw_invalidates() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 3, 3);
    let mut rng = StdRng::seed_from_u64(1);
    c.draw(&mut VertexSink::new(), &mut rng);
    assert_eq!(c.cache_state(), CacheState::Clean);

    c.fill(IVec2::new(0, 0), IVec2::new(2, 2), Tile::new("minecraft:stone", &reg)).unwrap();
    assert_eq!(c.cache_state(), CacheState::Dirty);
    let mut sink = VertexSink::new();
    c.draw(&mut sink, &mut rng);
    assert_eq!(sink.vertices.len(), 4 * 6);
}

#[test]
fn rejected_edit_keeps_the_cache() {
    let reg = registry();
    let mut c = chunk_at(Vec2::ZERO, 2, 2);
    c.draw(&mut VertexSink::new(), &mut StdRng::seed_from_u64(0));
    let _ = c.set(IVec2::new(5, 5), Tile::new("minecraft:stone", &reg));
    assert_eq!(c.cache_state(), CacheState::Clean);
}

#[test]
fn invalidate_forces_rebuild() {
    let mut c = chunk_at(Vec2::ZERO, 1, 1);
    let mut rng = StdRng::seed_from_u64(0);
    c.draw(&mut VertexSink::new(), &mut rng);
    c.invalidate();
    assert_eq!(c.cache_state(), CacheState::Dirty);
    assert!(c.draw(&mut VertexSink::new(), &mut rng));
}

// ── Placement convention ──────────────────────────────────────────────────

#[test]
fn column_maps_to_x_and_row_maps_to_y() {
    let reg = registry();
    let mut c = Chunk::new(UVec2::new(4, 4), Vec2::new(100.0, 200.0), Vec2::new(8.0, 16.0));
    // Column 3, row 1.
    c.set(IVec2::new(3, 1), Tile::new("minecraft:stone", &reg)).unwrap();
    let mut sink = VertexSink::new();
    c.draw(&mut sink, &mut StdRng::seed_from_u64(0));

    let pos = positions(&sink);
    let min_x = pos.iter().map(|p| p[0]).fold(f32::MAX, f32::min);
    let min_y = pos.iter().map(|p| p[1]).fold(f32::MAX, f32::min);
    let max_x = pos.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
    let max_y = pos.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
    assert_eq!((min_x, min_y), (100.0 + 3.0 * 8.0, 200.0 + 16.0));
    assert_eq!((max_x, max_y), (100.0 + 4.0 * 8.0, 200.0 + 2.0 * 16.0));
}

#[test]
fn every_quad_lies_inside_the_chunk_bounds() {
    let reg = registry();
    let mut c = Chunk::new(UVec2::new(3, 5), Vec2::new(-40.0, 10.0), Vec2::new(16.0, 8.0));
    c.fill_all(Tile::new("minecraft:grass", &reg));
    let mut sink = VertexSink::new();
    c.draw(&mut sink, &mut StdRng::seed_from_u64(11));
    let b = c.bounds();
    for [x, y] in positions(&sink) {
        assert!(x >= b.min.x && x <= b.max.x && y >= b.min.y && y <= b.max.y, "({x}, {y}) outside {b:?}");
    }
    assert_eq!(sink.vertices.len(), 15 * 6);
}

// ── Rotation ──────────────────────────────────────────────────────────────

#[test]
fn rotation_is_reproducible_for_a_seeded_rng() {
    let reg = registry();
    let build = |seed| {
        let mut c = chunk_at(Vec2::ZERO, 4, 4);
        c.fill_all(Tile::new("minecraft:grass", &reg));
        let mut sink = VertexSink::new();
        c.draw(&mut sink, &mut StdRng::seed_from_u64(seed));
        sink.vertices
    };
    assert_eq!(build(42), build(42));
}

#[test]
fn unrotated_tiles_ignore_the_rng() {
    let reg = registry();
    let build = |seed| {
        let mut c = chunk_at(Vec2::ZERO, 4, 4);
        c.fill_all(Tile::new("minecraft:stone", &reg));
        let mut sink = VertexSink::new();
        c.draw(&mut sink, &mut StdRng::seed_from_u64(seed));
        sink.vertices
    };
    assert_eq!(build(1), build(2));
}

// ── Visibility ────────────────────────────────────────────────────────────

#[test]
fn chunk_overlapping_viewport_is_visible() {
    let c = chunk_at(Vec2::new(900.0, 600.0), 16, 16);
    let viewport = Rect::from_origin_size(Vec2::ZERO, Vec2::new(1024.0, 768.0));
    assert!(c.is_visible(&viewport));
}

#[test]
fn chunk_far_to_the_right_is_not_visible() {
    let c = chunk_at(Vec2::new(10_000.0, 0.0), 16, 16);
    let viewport = Rect::from_origin_size(Vec2::ZERO, Vec2::new(1024.0, 768.0));
    assert!(!c.is_visible(&viewport));
}

#[test]
fn culling_uses_the_real_height() {
    // 16 columns but only 2 rows: 256 wide, 32 tall.
    let c = Chunk::new(UVec2::new(16, 2), Vec2::new(0.0, -100.0), Vec2::splat(16.0));
    let viewport = Rect::from_origin_size(Vec2::ZERO, Vec2::new(1024.0, 768.0));
    // Its bottom edge is y = -68, so it must not be considered visible.
    assert!(!c.is_visible(&viewport));
}

#[test]
fn chunk_above_or_left_of_viewport_is_not_visible() {
    let viewport = Rect::from_origin_size(Vec2::ZERO, Vec2::new(1024.0, 768.0));
    assert!(!chunk_at(Vec2::new(-256.0, 0.0), 16, 16).is_visible(&viewport));
    assert!(!chunk_at(Vec2::new(0.0, -300.0), 16, 16).is_visible(&viewport));
}

pub mod tile;

pub use tile::Tile;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{UVec2, Vec2};

use crate::geometry::Rect;

// ── AtlasRegion ──────────────────────────────────────────────────────────────

/// Pixel rectangle inside the atlas canvas.
///
/// Stored in image space: the origin is the canvas' top-left corner and y grows
/// downwards, so a tile packed at the top edge has `min.y == 0`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AtlasRegion {
    pub min: UVec2,
    pub max: UVec2,
}

impl AtlasRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { min: UVec2::new(x, y), max: UVec2::new(x + width, y + height) }
    }

    pub fn width(&self) -> u32 {
        self.max.x.saturating_sub(self.min.x)
    }

    pub fn height(&self) -> u32 {
        self.max.y.saturating_sub(self.min.y)
    }

    /// True for the zero-area region handed out for unknown tile types.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// The same region with a bottom-left origin (y up), as consumed by y-up
    /// renderers. For a tile packed at the top edge this is
    /// `[x0, canvas_h] .. [x1, canvas_h - h]` normalised into a [`Rect`].
    pub fn flipped_y(&self, canvas_height: u32) -> Rect {
        let top = canvas_height as f32 - self.min.y as f32;
        let bottom = canvas_height as f32 - self.max.y as f32;
        Rect::new(
            Vec2::new(self.min.x as f32, top),
            Vec2::new(self.max.x as f32, bottom),
        )
    }

    /// Normalised `(uv_min, uv_max)` against a canvas of `canvas` pixels.
    pub fn uv(&self, canvas: UVec2) -> ([f32; 2], [f32; 2]) {
        if canvas.x == 0 || canvas.y == 0 {
            return ([0.0; 2], [0.0; 2]);
        }
        let w = canvas.x as f32;
        let h = canvas.y as f32;
        (
            [self.min.x as f32 / w, self.min.y as f32 / h],
            [self.max.x as f32 / w, self.max.y as f32 / h],
        )
    }
}

// ── TileDefinition ───────────────────────────────────────────────────────────

/// One entry of the tile definition table: where a tile type lives in the
/// atlas and how its instances are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TileDefinition {
    pub region: AtlasRegion,
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    /// Instances get a random quarter-turn each time their chunk is rebuilt.
    pub random_rotation: bool,
}

impl TileDefinition {
    /// Zero-area definition used when a tile type is not in the table.
    pub fn degenerate() -> Self {
        Self::default()
    }
}

// ── TileRegistry ─────────────────────────────────────────────────────────────

/// Accumulates definitions while the atlas is being packed.
///
/// This is the only mutable form of the table. Calling [`build`](Self::build)
/// freezes it into a [`TileRegistry`].
#[derive(Debug)]
pub struct TileRegistryBuilder {
    canvas_size: UVec2,
    definitions: HashMap<String, TileDefinition>,
}

impl TileRegistryBuilder {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self { canvas_size: UVec2::new(canvas_width, canvas_height), definitions: HashMap::new() }
    }

    /// Record the placement of `id`. A repeated id replaces the earlier entry.
    pub fn insert(&mut self, id: impl Into<String>, region: AtlasRegion, random_rotation: bool) -> &mut Self {
        let (uv_min, uv_max) = region.uv(self.canvas_size);
        self.definitions
            .insert(id.into(), TileDefinition { region, uv_min, uv_max, random_rotation });
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn build(self) -> TileRegistry {
        TileRegistry {
            canvas_size: self.canvas_size,
            definitions: self.definitions,
            misses: AtomicU64::new(0),
        }
    }
}

/// Read-only tile definition table produced by one atlas build.
///
/// Shared behind an `Arc` once built; nothing can add or remove entries. Lookups
/// of unknown ids are counted so blank cells caused by typos stay visible.
#[derive(Debug)]
pub struct TileRegistry {
    canvas_size: UVec2,
    definitions: HashMap<String, TileDefinition>,
    misses: AtomicU64,
}

impl TileRegistry {
    /// A table with no entries for a canvas of the given size.
    pub fn empty(canvas_width: u32, canvas_height: u32) -> Self {
        TileRegistryBuilder::new(canvas_width, canvas_height).build()
    }

    pub fn get(&self, id: &str) -> Option<&TileDefinition> {
        self.definitions.get(id)
    }

    /// Look `id` up, falling back to [`TileDefinition::degenerate`].
    ///
    /// A miss is logged and counted rather than reported as an error.
    pub fn resolve(&self, id: &str) -> TileDefinition {
        match self.definitions.get(id) {
            Some(def) => *def,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                log::warn!("tile registry: unknown tile type '{id}', rendering as blank");
                TileDefinition::degenerate()
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Number of [`resolve`](Self::resolve) calls that hit an unknown id.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn canvas_size(&self) -> UVec2 {
        self.canvas_size
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Tile ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_dimensions() {
        let r = AtlasRegion::new(16, 0, 16, 24);
        assert_eq!(r.width(), 16);
        assert_eq!(r.height(), 24);
        assert!(!r.is_empty());
        assert!(AtlasRegion::default().is_empty());
    }

    #[test]
    fn flipped_region_uses_top_edge_as_baseline() {
        // Second 16×16 tile on a 256×256 canvas: [16, 256] .. [32, 240].
        let r = AtlasRegion::new(16, 0, 16, 16);
        let f = r.flipped_y(256);
        assert_eq!(f.min, Vec2::new(16.0, 240.0));
        assert_eq!(f.max, Vec2::new(32.0, 256.0));
    }

    #[test]
    fn uv_is_normalised_against_canvas() {
        let r = AtlasRegion::new(64, 0, 64, 128);
        let (uv_min, uv_max) = r.uv(UVec2::new(256, 256));
        assert_eq!(uv_min, [0.25, 0.0]);
        assert_eq!(uv_max, [0.5, 0.5]);
    }

    #[test]
    fn uv_on_zero_canvas_is_zero() {
        let (uv_min, uv_max) = AtlasRegion::new(0, 0, 4, 4).uv(UVec2::ZERO);
        assert_eq!(uv_min, [0.0; 2]);
        assert_eq!(uv_max, [0.0; 2]);
    }

    #[test]
    fn builder_computes_uvs_on_insert() {
        let mut b = TileRegistryBuilder::new(256, 256);
        b.insert("stone", AtlasRegion::new(0, 0, 16, 16), true);
        let reg = b.build();
        let def = reg.get("stone").unwrap();
        assert_eq!(def.uv_max, [16.0 / 256.0, 16.0 / 256.0]);
        assert!(def.random_rotation);
    }

    #[test]
    fn resolve_unknown_counts_a_miss() {
        let reg = TileRegistry::empty(256, 256);
        assert_eq!(reg.misses(), 0);
        let def = reg.resolve("nope");
        assert!(def.region.is_empty());
        assert!(!def.random_rotation);
        assert_eq!(reg.misses(), 1);
    }

    #[test]
    fn resolve_known_does_not_count() {
        let mut b = TileRegistryBuilder::new(32, 32);
        b.insert("dirt", AtlasRegion::new(0, 0, 16, 16), false);
        let reg = b.build();
        reg.resolve("dirt");
        assert_eq!(reg.misses(), 0);
    }

    #[test]
    fn ids_are_sorted() {
        let mut b = TileRegistryBuilder::new(64, 16);
        b.insert("b", AtlasRegion::new(0, 0, 16, 16), false)
            .insert("a", AtlasRegion::new(16, 0, 16, 16), false);
        assert_eq!(b.build().ids(), vec!["a", "b"]);
    }
}

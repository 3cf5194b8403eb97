use glam::{IVec2, UVec2, Vec2};

use crate::batch::RenderTarget;
use crate::chunk::{Chunk, ChunkError};
use crate::config::WorldConfig;
use crate::geometry::{Rect, align_to_grid};
use crate::tiles::Tile;

/// Per-frame counters returned by [`World::render`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Chunks submitted to the target.
    pub drawn: usize,
    /// Chunks skipped by the visibility test.
    pub culled: usize,
    /// Drawn chunks whose batch had to be rebuilt.
    pub rebuilt: usize,
}

/// Owns every chunk and drives culling and drawing each frame.
#[derive(Debug, Default)]
pub struct World {
    chunks: Vec<Chunk>,
    config: WorldConfig,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self { chunks: Vec::new(), config }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_mut(&mut self, index: usize) -> Option<&mut Chunk> {
        self.chunks.get_mut(index)
    }

    /// Add a chunk and return its index.
    pub fn push(&mut self, chunk: Chunk) -> usize {
        self.chunks.push(chunk);
        self.chunks.len() - 1
    }

    /// Create an empty chunk shaped by the world config whose origin is
    /// `location` snapped to the spawn grid.
    pub fn spawn_chunk(&mut self, location: Vec2) -> usize {
        let origin = align_to_grid(location, self.config.spawn_alignment);
        self.push(Chunk::new(self.config.chunk_size, origin, self.config.cell_size))
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Index of the topmost chunk whose bounds contain `point`.
    ///
    /// Chunks are drawn in order, so when several overlap the last one is the
    /// one on screen.
    pub fn chunk_at_world(&self, point: Vec2) -> Option<usize> {
        self.chunks.iter().rposition(|c| c.bounds().contains(point))
    }

    /// Place `tile` in whichever chunk covers `point`.
    ///
    /// Returns `Ok(None)` when no chunk covers the point.
    pub fn set_tile_at_world(&mut self, point: Vec2, tile: Tile) -> Result<Option<(usize, IVec2)>, ChunkError> {
        let Some(index) = self.chunk_at_world(point) else { return Ok(None) };
        let chunk = &mut self.chunks[index];
        let Some(cell) = chunk.cell_at_world(point) else { return Ok(None) };
        chunk.set(cell, tile)?;
        Ok(Some((index, cell)))
    }

    /// Cull against `viewport`, then draw every visible chunk into `target`.
    ///
    /// Visibility is decided for all chunks before any of them is drawn.
    pub fn render<T, R>(&mut self, viewport: &Rect, target: &mut T, rng: &mut R) -> FrameStats
    where
        T: RenderTarget + ?Sized,
        R: rand::Rng + ?Sized,
    {
        let visible: Vec<bool> = self.chunks.iter().map(|c| c.is_visible(viewport)).collect();

        let mut stats = FrameStats::default();
        for (chunk, visible) in self.chunks.iter_mut().zip(visible) {
            if !visible {
                stats.culled += 1;
                continue;
            }
            if chunk.draw(target, rng) {
                stats.rebuilt += 1;
            }
            stats.drawn += 1;
        }
        stats
    }

    /// Total occupied cells across all chunks.
    pub fn tile_count(&self) -> usize {
        self.chunks.iter().map(Chunk::tile_count).sum()
    }

    /// Cell dimensions of chunks made by [`spawn_chunk`](Self::spawn_chunk).
    pub fn chunk_size(&self) -> UVec2 {
        self.config.chunk_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::VertexSink;
    use crate::tiles::{AtlasRegion, TileRegistry, TileRegistryBuilder};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn registry() -> TileRegistry {
        let mut b = TileRegistryBuilder::new(32, 16);
        b.insert("stone", AtlasRegion::new(0, 0, 16, 16), false);
        b.build()
    }

    #[test]
    fn spawn_chunk_snaps_to_alignment() {
        let mut w = World::new(WorldConfig::default());
        let i = w.spawn_chunk(Vec2::new(300.0, 120.0));
        assert_eq!(w.chunks()[i].location(), Vec2::new(256.0, 0.0));
        assert_eq!(w.chunks()[i].size(), UVec2::new(16, 16));
    }

    #[test]
    fn set_tile_at_world_routes_to_owning_chunk() {
        let reg = registry();
        let mut w = World::new(WorldConfig::default());
        w.spawn_chunk(Vec2::ZERO);
        w.spawn_chunk(Vec2::new(256.0, 0.0));

        let hit = w.set_tile_at_world(Vec2::new(256.0 + 40.0, 20.0), Tile::new("stone", &reg)).unwrap();
        assert_eq!(hit, Some((1, IVec2::new(2, 1))));
        assert_eq!(w.chunks()[1].tile_count(), 1);
        assert_eq!(w.chunks()[0].tile_count(), 0);

        let miss = w.set_tile_at_world(Vec2::new(-5.0, -5.0), Tile::new("stone", &reg)).unwrap();
        assert_eq!(miss, None);
    }

    #[test]
    fn render_counts_rebuilds_only_once() {
        let reg = registry();
        let mut w = World::new(WorldConfig::default());
        let i = w.spawn_chunk(Vec2::ZERO);
        w.chunk_mut(i).unwrap().fill_all(Tile::new("stone", &reg));

        let viewport = Rect::from_origin_size(Vec2::ZERO, Vec2::new(1024.0, 768.0));
        let mut rng = StdRng::seed_from_u64(3);
        let mut sink = VertexSink::new();

        let first = w.render(&viewport, &mut sink, &mut rng);
        assert_eq!(first, FrameStats { drawn: 1, culled: 0, rebuilt: 1 });
        let second = w.render(&viewport, &mut sink, &mut rng);
        assert_eq!(second, FrameStats { drawn: 1, culled: 0, rebuilt: 0 });
        assert_eq!(sink.submissions, 2);
    }
}

use glam::{IVec2, UVec2, Vec2};
use thiserror::Error;

use crate::batch::{Batch, RenderTarget, Rotation};
use crate::geometry::Rect;
use crate::tiles::Tile;

/// Rejected chunk edit.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    #[error("cell ({x}, {y}) is outside the {width}×{height} chunk")]
    OutOfBounds { x: i32, y: i32, width: u32, height: u32 },
}

/// Validity of a chunk's cached batch relative to its grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// The cached batch reflects the current grid.
    Clean,
    /// No batch is cached; the next draw rebuilds it.
    Dirty,
}

/// Fixed-size rectangular grid of tiles occupying a contiguous world area.
///
/// Cells are addressed as `(x, y)` = `(column, row)`. Column `x` is placed at
/// `location.x + x * cell_size.x` and row `y` at `location.y + y * cell_size.y`;
/// [`bounds`](Self::bounds) uses the same convention.
///
/// A rendered batch is cached after the first draw and dropped by every
/// successful edit, so untouched chunks cost one submit per frame.
#[derive(Debug)]
pub struct Chunk {
    /// Row-major, `width * height` cells.
    grid: Vec<Option<Tile>>,
    size: UVec2,
    location: Vec2,
    cell_size: Vec2,
    cache: Option<Batch>,
}

impl Chunk {
    /// Empty chunk of `size` cells at world position `location`.
    pub fn new(size: UVec2, location: Vec2, cell_size: Vec2) -> Self {
        Self {
            grid: vec![None; (size.x * size.y) as usize],
            size,
            location,
            cell_size,
            cache: None,
        }
    }

    /// Chunk over an existing row-major grid.
    ///
    /// The grid is truncated or padded with empty cells to `size`.
    pub fn from_cells(mut cells: Vec<Option<Tile>>, size: UVec2, location: Vec2, cell_size: Vec2) -> Self {
        cells.resize((size.x * size.y) as usize, None);
        Self { grid: cells, size, location, cell_size, cache: None }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn size(&self) -> UVec2 { self.size }
    pub fn width(&self) -> u32 { self.size.x }
    pub fn height(&self) -> u32 { self.size.y }
    pub fn location(&self) -> Vec2 { self.location }
    pub fn cell_size(&self) -> Vec2 { self.cell_size }

    /// Move the chunk. Cached vertices are in world space, so this invalidates.
    pub fn set_location(&mut self, location: Vec2) {
        if location != self.location {
            self.location = location;
            self.invalidate();
        }
    }

    pub fn cache_state(&self) -> CacheState {
        if self.cache.is_some() { CacheState::Clean } else { CacheState::Dirty }
    }

    /// Number of occupied cells.
    pub fn tile_count(&self) -> usize {
        self.grid.iter().filter(|c| c.is_some()).count()
    }

    /// World-space area covered by the grid.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.location, self.cell_size * self.size.as_vec2())
    }

    // ── Grid access ────────────────────────────────────────────────────────

    /// True if `pos` lies inside the grid on both axes.
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.size.x && (pos.y as u32) < self.size.y
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y as u32 * self.size.x + pos.x as u32) as usize)
    }

    fn check(&self, pos: IVec2) -> Result<usize, ChunkError> {
        self.index(pos).ok_or(ChunkError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.size.x,
            height: self.size.y,
        })
    }

    /// Tile at `pos`, or `None` if the cell is empty or outside the grid.
    pub fn get(&self, pos: IVec2) -> Option<&Tile> {
        self.index(pos).and_then(|i| self.grid[i].as_ref())
    }

    /// Place `tile` at `pos`. Out-of-bounds positions leave the grid untouched.
    pub fn set(&mut self, pos: IVec2, tile: Tile) -> Result<&mut Self, ChunkError> {
        let i = self.check(pos)?;
        self.grid[i] = Some(tile);
        self.invalidate();
        Ok(self)
    }

    /// Empty the cell at `pos`.
    pub fn clear(&mut self, pos: IVec2) -> Result<Option<Tile>, ChunkError> {
        let i = self.check(pos)?;
        let old = self.grid[i].take();
        self.invalidate();
        Ok(old)
    }

    /// Write `tile` into every cell walked from `from` towards `to`.
    ///
    /// Each axis steps by ±1 until it reaches `to`, and `to` itself is never
    /// written: `fill((0,0), (2,2))` covers the 2×2 block `(0..2, 0..2)`, and an
    /// axis where `from == to` writes nothing. Both corners must be inside the
    /// grid; otherwise nothing is written.
    pub fn fill(&mut self, from: IVec2, to: IVec2, tile: Tile) -> Result<&mut Self, ChunkError> {
        self.check(from)?;
        self.check(to)?;

        let step = IVec2::new(
            if to.x > from.x { 1 } else { -1 },
            if to.y > from.y { 1 } else { -1 },
        );

        let mut x = from.x;
        while x != to.x {
            let mut y = from.y;
            while y != to.y {
                let i = (y as u32 * self.size.x + x as u32) as usize;
                self.grid[i] = Some(tile.clone());
                y += step.y;
            }
            x += step.x;
        }

        self.invalidate();
        Ok(self)
    }

    /// Write `tile` into every cell.
    pub fn fill_all(&mut self, tile: Tile) -> &mut Self {
        self.grid.fill(Some(tile));
        self.invalidate();
        self
    }

    /// Map a world-space point to the cell containing it.
    pub fn cell_at_world(&self, point: Vec2) -> Option<IVec2> {
        if !self.bounds().contains(point) {
            return None;
        }
        let cell = ((point - self.location) / self.cell_size).floor().as_ivec2();
        self.in_bounds(cell).then_some(cell)
    }

    // ── Rendering ──────────────────────────────────────────────────────────

    /// Drop the cached batch; the next [`draw`](Self::draw) rebuilds it.
    pub fn invalidate(&mut self) -> &mut Self {
        self.cache = None;
        self
    }

    /// Strict overlap of the chunk's world bounds with `viewport`.
    pub fn is_visible(&self, viewport: &Rect) -> bool {
        self.bounds().overlaps(viewport)
    }

    /// Submit the chunk's batch to `target`, rebuilding it first if dirty.
    ///
    /// Tiles flagged for random rotation get a fresh quarter-turn from `rng`
    /// on every rebuild. Returns `true` if a rebuild happened.
    pub fn draw<T, R>(&mut self, target: &mut T, rng: &mut R) -> bool
    where
        T: RenderTarget + ?Sized,
        R: rand::Rng + ?Sized,
    {
        let rebuilt = self.cache.is_none();
        if rebuilt {
            let batch = self.build_batch(rng);
            log::debug!(
                "chunk at ({}, {}): rebuilt batch with {} quads",
                self.location.x, self.location.y, batch.quad_count()
            );
            self.cache = Some(batch);
        }
        if let Some(batch) = &self.cache {
            target.submit(batch);
        }
        rebuilt
    }

    fn build_batch<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Batch {
        let mut batch = Batch::with_capacity(self.tile_count());
        for row in 0..self.size.y {
            for col in 0..self.size.x {
                let Some(tile) = &self.grid[(row * self.size.x + col) as usize] else { continue };
                if tile.is_degenerate() {
                    continue;
                }
                let origin = self.location + Vec2::new(col as f32, row as f32) * self.cell_size;
                let rotation = if tile.random_rotation() { Rotation::random(rng) } else { Rotation::R0 };
                batch.push_quad(origin, self.cell_size, tile.definition(), rotation);
            }
        }
        batch
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use glam::Vec2;

use crate::tiles::TileDefinition;

/// Vertex of a textured tile quad, laid out for direct GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileVertex {
    /// World-space position.
    pub position: [f32; 2],
    /// Normalised atlas coordinate.
    pub uv: [f32; 2],
}

/// Quarter-turn applied to a tile's texture inside its cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    pub fn from_quarter_turns(turns: u32) -> Self {
        Self::ALL[(turns % 4) as usize]
    }

    pub fn quarter_turns(self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn degrees(self) -> f32 {
        self.quarter_turns() as f32 * 90.0
    }

    /// Pick one of the four rotations uniformly from `rng`.
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_quarter_turns(rng.gen_range(0..4))
    }
}

/// A prebuilt list of textured triangles submitted to a [`RenderTarget`] in one
/// call. Every tile contributes one quad (two triangles, six vertices).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    vertices: Vec<TileVertex>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(quads: usize) -> Self {
        Self { vertices: Vec::with_capacity(quads * 6) }
    }

    /// Append a quad covering `origin .. origin + size`, textured with
    /// `definition`'s atlas region turned by `rotation`.
    pub fn push_quad(&mut self, origin: Vec2, size: Vec2, definition: &TileDefinition, rotation: Rotation) {
        let [u0, v0] = definition.uv_min;
        let [u1, v1] = definition.uv_max;
        // Texture corners in clockwise order starting top-left. A quarter turn
        // shifts which texture corner lands on which screen corner.
        let tex = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];
        let shift = rotation.quarter_turns() as usize;
        let uv = |corner: usize| tex[(corner + 4 - shift) % 4];

        let (x0, y0) = (origin.x, origin.y);
        let (x1, y1) = (origin.x + size.x, origin.y + size.y);

        let tl = TileVertex { position: [x0, y0], uv: uv(0) };
        let tr = TileVertex { position: [x1, y0], uv: uv(1) };
        let br = TileVertex { position: [x1, y1], uv: uv(2) };
        let bl = TileVertex { position: [x0, y1], uv: uv(3) };
        self.vertices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }

    pub fn vertices(&self) -> &[TileVertex] {
        &self.vertices
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

// ── RenderTarget ─────────────────────────────────────────────────────────────

/// Anything a chunk can draw into.
///
/// The core only ever asks a target to accept a finished batch; transforms and
/// GPU state belong to the implementation.
pub trait RenderTarget {
    fn submit(&mut self, batch: &Batch);
}

/// Collects every submitted vertex in order. Used by the renderer to gather a
/// frame's chunk batches, and handy in tests.
#[derive(Debug, Default)]
pub struct VertexSink {
    pub vertices: Vec<TileVertex>,
    /// Number of `submit` calls since the last [`clear`](Self::clear).
    pub submissions: usize,
}

impl VertexSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.submissions = 0;
    }
}

impl RenderTarget for VertexSink {
    fn submit(&mut self, batch: &Batch) {
        self.vertices.extend_from_slice(batch.vertices());
        self.submissions += 1;
    }
}

use glam::Vec2;

use crate::chunk::Chunk;
use crate::geometry::Rect;

/// Untextured vertex for the debug overlay.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OutlineVertex {
    /// World-space position.
    pub position: [f32; 2],
    pub color: [f32; 4],
}

pub const OUTLINE_RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Edge width in world units.
pub const OUTLINE_THICKNESS: f32 = 5.0;

/// Collects solid-colour outlines of chunk bounds, drawn after the tile pass.
///
/// Every outlined rectangle becomes four edge quads (six vertices each), each
/// centred on one side of the rectangle.
#[derive(Debug)]
pub struct ChunkOutlines {
    pub thickness: f32,
    pub color: [f32; 4],
    vertices: Vec<OutlineVertex>,
}

impl Default for ChunkOutlines {
    fn default() -> Self {
        Self::new(OUTLINE_THICKNESS, OUTLINE_RED)
    }
}

impl ChunkOutlines {
    pub fn new(thickness: f32, color: [f32; 4]) -> Self {
        Self { thickness, color, vertices: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[OutlineVertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Outline every chunk's world bounds, in draw order.
    pub fn push_chunks(&mut self, chunks: &[Chunk]) {
        self.vertices.reserve(chunks.len() * 24);
        for chunk in chunks {
            self.push_rect(&chunk.bounds());
        }
    }

    pub fn push_rect(&mut self, rect: &Rect) {
        let h = self.thickness * 0.5;
        let (min, max) = (rect.min, rect.max);
        // Horizontal edges span the corners; vertical edges fill the gap between them.
        let edges = [
            Rect::new(Vec2::new(min.x - h, min.y - h), Vec2::new(max.x + h, min.y + h)),
            Rect::new(Vec2::new(min.x - h, max.y - h), Vec2::new(max.x + h, max.y + h)),
            Rect::new(Vec2::new(min.x - h, min.y + h), Vec2::new(min.x + h, max.y - h)),
            Rect::new(Vec2::new(max.x - h, min.y + h), Vec2::new(max.x + h, max.y - h)),
        ];
        for edge in &edges {
            self.push_quad(edge);
        }
    }

    fn push_quad(&mut self, r: &Rect) {
        let color = self.color;
        let v = |x: f32, y: f32| OutlineVertex { position: [x, y], color };
        let (tl, bl) = (v(r.min.x, r.min.y), v(r.min.x, r.max.y));
        let (tr, br) = (v(r.max.x, r.min.y), v(r.max.x, r.max.y));
        self.vertices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }
}

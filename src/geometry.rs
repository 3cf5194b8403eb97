// =============================================================================
// GEOMETRY.RS: World-space rectangles and grid snapping
//
// Small geometric helpers shared by chunk culling, the camera and the world:
// - Axis-aligned rectangles (chunk bounds, viewport bounds)
// - Overlap / containment tests
// - Snapping a world position onto a regular grid
// =============================================================================

use glam::Vec2;

/// Axis-aligned rectangle in world units.
///
/// `min` is the corner with the smallest coordinates, `max` the one with the
/// largest.  Constructors normalise their inputs so `min <= max` on both axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build a rectangle from two opposite corners, in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Build a rectangle from its `origin` (min corner) and `size`.
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap test on both axes.
    ///
    /// Rectangles that merely share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Half-open containment: `min` is inside, `max` is not.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }
}

// =============================================================================
// GRID SNAPPING
// =============================================================================

/// Round `point` to the nearest multiple of `spacing` on each axis.
///
/// Axes with a non-positive spacing are left untouched.
pub fn align_to_grid(point: Vec2, spacing: Vec2) -> Vec2 {
    let snap = |v: f32, s: f32| if s > 0.0 { (v / s).round() * s } else { v };
    Vec2::new(snap(point.x, spacing.x), snap(point.y, spacing.y))
}

use glam::Vec2;

use crate::geometry::Rect;

/// Camera uniform uploaded to the GPU: contains the combined view-projection matrix.
///
/// Layout (column-major, matching WGSL `mat4x4<f32>`):
/// ```text
/// col0: [sx,  0,   0,  0]
/// col1: [0,   sy,  0,  0]
/// col2: [0,   0,   1,  0]
/// col3: [tx,  ty,  0,  1]
/// ```
/// where `sx = 2z/w`, `sy = -2z/h`, `tx = -sx*cx`, `ty = -sy*cy`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// 2D camera over world space: a centre point and a zoom factor.
///
/// World y grows downwards on screen, matching the chunk grid's row order.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// World position shown at the centre of the screen.
    pub position: Vec2,
    /// 1.0 = one world unit per pixel, >1 zooms in.
    pub zoom: f32,
}

impl Camera {
    /// Zoom multiplier per wheel notch.
    pub const ZOOM_STEP: f32 = 1.2;
    const MIN_ZOOM: f32 = 0.05;

    pub fn new(center_x: f32, center_y: f32) -> Self {
        Self { position: Vec2::new(center_x, center_y), zoom: 1.0 }
    }

    /// Move by a screen-space delta (e.g. a mouse drag), converted to world units.
    pub fn pan_screen(&mut self, delta: Vec2) {
        self.position -= delta / self.zoom.max(Self::MIN_ZOOM);
    }

    /// Apply `notches` of wheel scroll; positive zooms in.
    pub fn scroll_zoom(&mut self, notches: f32) {
        self.zoom = (self.zoom * Self::ZOOM_STEP.powf(notches)).max(Self::MIN_ZOOM);
    }

    /// World-space rectangle visible through a `width × height` pixel viewport.
    pub fn visible_rect(&self, width: f32, height: f32) -> Rect {
        let half = Vec2::new(width, height) * 0.5 / self.zoom.max(Self::MIN_ZOOM);
        Rect::new(self.position - half, self.position + half)
    }

    /// Build the GPU-ready `CameraUniform` for the given viewport dimensions.
    ///
    /// Derivation (y-down pixel space → NDC):
    /// ```text
    /// x_ndc = sx * world_x + tx    (sx = 2z/w,  tx = -sx*cx)
    /// y_ndc = sy * world_y + ty    (sy = -2z/h, ty = -sy*cy)
    /// ```
    pub fn build_view_proj(&self, width: f32, height: f32) -> CameraUniform {
        let z = self.zoom.max(Self::MIN_ZOOM);
        let sx = 2.0 * z / width;
        let sy = -2.0 * z / height;
        let tx = -sx * self.position.x;
        let ty = -sy * self.position.y;

        CameraUniform {
            view_proj: [
                [sx,  0.0, 0.0, 0.0], // col0
                [0.0, sy,  0.0, 0.0], // col1
                [0.0, 0.0, 1.0, 0.0], // col2
                [tx,  ty,  0.0, 1.0], // col3
            ],
        }
    }
}

use glam::UVec2;

use super::AtlasError;

/// One tile's position inside the packed canvas.
#[derive(Debug, PartialEq, Eq)]
pub struct PlacedTile {
    pub id: String,
    /// Top-left pixel coordinate inside the canvas.
    pub atlas_x: u32,
    pub atlas_y: u32,
    pub pixel_w: u32,
    pub pixel_h: u32,
}

/// Single-row strip packing, pure (no I/O).
///
/// `items` is a slice of `(id, pixel_w, pixel_h)` placed left to right along
/// the top edge in the given order, each starting where the previous one
/// ended. Anything that would cross the right or bottom edge of `canvas` fails
/// the whole pack.
pub fn pack_strip(items: &[(String, u32, u32)], canvas: UVec2) -> Result<Vec<PlacedTile>, AtlasError> {
    let mut placements = Vec::with_capacity(items.len());
    let mut cursor = 0u32;

    for (id, w, h) in items {
        let end = cursor.checked_add(*w).filter(|&end| end <= canvas.x);
        let Some(end) = end.filter(|_| *h <= canvas.y) else {
            return Err(AtlasError::Overflow {
                id: id.clone(),
                needed: UVec2::new(cursor.saturating_add(*w), *h),
                canvas,
            });
        };

        placements.push(PlacedTile {
            id: id.clone(),
            atlas_x: cursor,
            atlas_y: 0,
            pixel_w: *w,
            pixel_h: *h,
        });
        cursor = end;
    }

    Ok(placements)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

pub mod builder;
pub mod manifest;
pub mod pack;

pub use builder::{AtlasBuilder, PendingAtlas};
pub use manifest::{Manifest, ManifestEntry};

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use glam::UVec2;
use image::RgbaImage;
use thiserror::Error;

use crate::tiles::{Tile, TileRegistry};

/// Why an atlas build failed. Every variant aborts the whole build.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("could not read tile manifest {path:?}: {source}")]
    ManifestIo { path: PathBuf, source: std::io::Error },
    #[error("malformed tile manifest {path:?}: {source}")]
    ManifestParse { path: PathBuf, source: serde_json::Error },
    #[error("could not open texture {path:?}: {source}")]
    TextureIo { path: PathBuf, source: std::io::Error },
    #[error("could not decode texture {path:?}: {source}")]
    TextureDecode { path: PathBuf, source: image::ImageError },
    #[error("tile '{id}' needs {needed} px but the atlas canvas is {canvas} px")]
    Overflow { id: String, needed: UVec2, canvas: UVec2 },
    #[error("could not write atlas {path:?}: {source}")]
    Encode { path: PathBuf, source: image::ImageError },
    #[error("atlas build did not finish within {0:?}")]
    Timeout(Duration),
    #[error("atlas build thread exited without a result")]
    WorkerLost,
}

// ── Atlas ────────────────────────────────────────────────────────────────────

/// A packed tile canvas together with the table that indexes it.
#[derive(Debug)]
pub struct Atlas {
    image: RgbaImage,
    registry: Arc<TileRegistry>,
    /// Where the canvas was written; `None` when there was nothing to pack.
    path: Option<PathBuf>,
}

impl Atlas {
    pub fn new(image: RgbaImage, registry: TileRegistry, path: Option<PathBuf>) -> Self {
        Self { image, registry: Arc::new(registry), path }
    }

    /// Build a tile of type `id` against this atlas' table.
    pub fn tile(&self, id: &str) -> Tile {
        Tile::new(id, &self.registry)
    }

    pub fn registry(&self) -> &Arc<TileRegistry> {
        &self.registry
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.image.width(), self.image.height())
    }

    /// True when the manifest had no entries.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

// ── AtlasHandle ──────────────────────────────────────────────────────────────

/// Shared slot holding the atlas that new tiles are built against.
///
/// A rebuild never edits the live table: it produces a new [`Atlas`] and swaps
/// it in here. Tiles already placed keep the definitions they copied.
#[derive(Debug)]
pub struct AtlasHandle {
    current: RwLock<Arc<Atlas>>,
}

impl AtlasHandle {
    pub fn new(atlas: Atlas) -> Self {
        Self { current: RwLock::new(Arc::new(atlas)) }
    }

    pub fn current(&self) -> Arc<Atlas> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Install `atlas` for future lookups and return the one it replaced.
    pub fn replace(&self, atlas: Atlas) -> Arc<Atlas> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, Arc::new(atlas))
    }

    pub fn tile(&self, id: &str) -> Tile {
        self.current().tile(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{AtlasRegion, TileRegistryBuilder};

    fn atlas_with(id: &str, x: u32) -> Atlas {
        let mut b = TileRegistryBuilder::new(64, 16);
        b.insert(id, AtlasRegion::new(x, 0, 16, 16), false);
        Atlas::new(RgbaImage::new(64, 16), b.build(), None)
    }

    #[test]
    fn handle_swap_leaves_existing_tiles_alone() {
        let handle = AtlasHandle::new(atlas_with("stone", 0));
        let before = handle.tile("stone");

        let old = handle.replace(atlas_with("stone", 32));
        assert_eq!(old.registry().get("stone").unwrap().region.min.x, 0);

        let after = handle.tile("stone");
        assert_eq!(before.region().min.x, 0);
        assert_eq!(after.region().min.x, 32);
    }

    #[test]
    fn atlas_reports_size_and_emptiness() {
        let a = atlas_with("dirt", 0);
        assert_eq!(a.size(), UVec2::new(64, 16));
        assert!(!a.is_empty());
        assert!(a.path().is_none());
    }
}

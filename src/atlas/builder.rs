use std::io::BufWriter;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use glam::UVec2;
use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};

use super::manifest::{Manifest, texture_path};
use super::pack::pack_strip;
use super::{Atlas, AtlasError};
use crate::config::AtlasConfig;
use crate::tiles::{AtlasRegion, TileRegistry, TileRegistryBuilder};

/// Packs the tile images named in a manifest into one atlas canvas.
///
/// A build is all-or-nothing: every texture is decoded and placed before the
/// canvas is written, so a failure never leaves a partial atlas on disk.
#[derive(Clone, Debug)]
pub struct AtlasBuilder {
    config: AtlasConfig,
}

impl AtlasBuilder {
    pub fn new(config: AtlasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Run the build on the calling thread.
    pub fn build(&self) -> Result<Atlas, AtlasError> {
        let manifest = Manifest::load(&self.config.manifest_path)?;
        self.build_from_manifest(&manifest)
    }

    /// Build from an already-parsed manifest.
    pub fn build_from_manifest(&self, manifest: &Manifest) -> Result<Atlas, AtlasError> {
        let canvas = UVec2::new(self.config.canvas_width, self.config.canvas_height);

        if manifest.is_empty() {
            log::info!("atlas: manifest has no tiles; nothing to render");
            return Ok(Atlas::new(
                RgbaImage::new(canvas.x, canvas.y),
                TileRegistry::empty(canvas.x, canvas.y),
                None,
            ));
        }

        // ── 1. Decode every texture ──────────────────────────────────────
        let entries = manifest.entries();
        let mut loaded: Vec<RgbaImage> = Vec::with_capacity(entries.len());
        for entry in &entries {
            let path = texture_path(&self.config.textures_dir, &entry.texture);
            let img = image::open(&path).map_err(|e| match e {
                ImageError::IoError(source) => AtlasError::TextureIo { path: path.clone(), source },
                source => AtlasError::TextureDecode { path: path.clone(), source },
            })?;
            log::debug!("atlas: loaded {:?} ({}×{}) for '{}'", path, img.width(), img.height(), entry.id);
            loaded.push(DynamicImage::into_rgba8(img));
        }

        // ── 2. Pack (pure) ───────────────────────────────────────────────
        let dims: Vec<(String, u32, u32)> = entries
            .iter()
            .zip(&loaded)
            .map(|(entry, img)| (entry.id.clone(), img.width(), img.height()))
            .collect();
        let placements = pack_strip(&dims, canvas)?;

        // ── 3. Composite and index ───────────────────────────────────────
        let mut atlas_img = RgbaImage::new(canvas.x, canvas.y);
        log::info!("atlas: created {}×{} canvas", canvas.x, canvas.y);
        let mut registry = TileRegistryBuilder::new(canvas.x, canvas.y);

        for ((p, entry), img) in placements.iter().zip(&entries).zip(&loaded) {
            for dy in 0..p.pixel_h {
                for dx in 0..p.pixel_w {
                    atlas_img.put_pixel(p.atlas_x + dx, p.atlas_y + dy, *img.get_pixel(dx, dy));
                }
            }
            registry.insert(
                entry.id.as_str(),
                AtlasRegion::new(p.atlas_x, p.atlas_y, p.pixel_w, p.pixel_h),
                entry.random_rotation,
            );
        }

        // ── 4. Write the canvas ──────────────────────────────────────────
        write_atomically(&atlas_img, &self.config.output_path)?;
        let out = &self.config.output_path;
        log::info!("atlas: packed {} tiles into {:?}", registry.len(), out);

        Ok(Atlas::new(atlas_img, registry.build(), Some(out.clone())))
    }

    /// Run the build on a background thread.
    ///
    /// Nothing built by the worker is visible until [`PendingAtlas::wait`]
    /// hands it over.
    pub fn spawn(self) -> PendingAtlas {
        let (tx, rx) = mpsc::sync_channel(1);
        let worker = std::thread::spawn(move || {
            // The receiver may already be gone if the caller gave up waiting.
            let _ = tx.send(self.build());
        });
        PendingAtlas { rx, worker: Some(worker) }
    }
}

/// Encode `img` as PNG next to `out`, then rename it into place. A failed
/// encode leaves `out` untouched and removes the temporary file.
fn write_atomically(img: &RgbaImage, out: &Path) -> Result<(), AtlasError> {
    let encode_err = |source: ImageError| AtlasError::Encode { path: out.to_path_buf(), source };
    let io_err = |e: std::io::Error| encode_err(ImageError::IoError(e));

    let dir = match out.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(io_err)?;
            parent
        }
        None => Path::new("."),
    };

    let tmp = tempfile::Builder::new()
        .prefix(".atlas-")
        .suffix(".png.tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        img.write_to(&mut writer, ImageFormat::Png).map_err(encode_err)?;
        writer.into_inner().map_err(|e| io_err(e.into_error()))?;
    }
    tmp.persist(out).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// An atlas build running on another thread.
#[derive(Debug)]
pub struct PendingAtlas {
    rx: Receiver<Result<Atlas, AtlasError>>,
    worker: Option<JoinHandle<()>>,
}

impl PendingAtlas {
    /// Block until the build finishes. There is no timeout.
    pub fn wait(mut self) -> Result<Atlas, AtlasError> {
        let result = self.rx.recv().map_err(|_| AtlasError::WorkerLost)?;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("atlas: builder thread panicked after sending its result");
            }
        }
        result
    }

    /// Block for at most `timeout`. On [`AtlasError::Timeout`] the build keeps
    /// running and the call may be repeated.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Atlas, AtlasError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(AtlasError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(AtlasError::WorkerLost),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

use std::path::PathBuf;

use glam::{UVec2, Vec2};

// ── AtlasConfig ───────────────────────────────────────────────────────────────

/// Where the atlas builder reads from and writes to.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasConfig {
    /// JSON manifest mapping tile ids to texture names.
    pub manifest_path: PathBuf,
    /// Directory the manifest's texture names are relative to.
    pub textures_dir: PathBuf,
    /// Destination of the packed PNG.
    pub output_path: PathBuf,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for AtlasConfig {
    /// `resources/tiles.json`, `resources/textures/tiles`, `spritesheet.png`,
    /// 256 × 256 canvas.
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("resources/tiles.json"),
            textures_dir:  PathBuf::from("resources/textures/tiles"),
            output_path:   PathBuf::from("spritesheet.png"),
            canvas_width:  256,
            canvas_height: 256,
        }
    }
}

// ── WorldConfig ───────────────────────────────────────────────────────────────

/// Shape of newly created chunks.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Cells per chunk (columns × rows).
    pub chunk_size: UVec2,
    /// World units per cell.
    pub cell_size: Vec2,
    /// Grid that spawned chunk origins snap to.
    pub spawn_alignment: Vec2,
}

impl Default for WorldConfig {
    /// 16 × 16 cells of 16 × 16 units, snapped to a 256-unit grid.
    fn default() -> Self {
        Self {
            chunk_size:      UVec2::new(16, 16),
            cell_size:       Vec2::new(16.0, 16.0),
            spawn_alignment: Vec2::new(256.0, 256.0),
        }
    }
}

impl WorldConfig {
    /// World-space extent of one chunk.
    pub fn chunk_extent(&self) -> Vec2 {
        self.cell_size * self.chunk_size.as_vec2()
    }
}

// ── AppConfig ─────────────────────────────────────────────────────────────────

/// Everything the binary needs at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub atlas: AtlasConfig,
    pub world: WorldConfig,
    /// Log at `debug` instead of `info`.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title:         "tileworld".to_string(),
            window_width:  1024,
            window_height: 768,
            atlas:         AtlasConfig::default(),
            world:         WorldConfig::default(),
            debug:         false,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by command-line flags:
    /// `--debug`, `--manifest <file>`, `--textures <dir>`, `--atlas-out <file>`.
    ///
    /// Unknown flags and flags missing their value are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut cfg = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" => cfg.debug = true,
                "--manifest" => {
                    if let Some(v) = args.next() { cfg.atlas.manifest_path = v.into(); }
                }
                "--textures" => {
                    if let Some(v) = args.next() { cfg.atlas.textures_dir = v.into(); }
                }
                "--atlas-out" => {
                    if let Some(v) = args.next() { cfg.atlas.output_path = v.into(); }
                }
                _ => {}
            }
        }
        cfg
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug { log::LevelFilter::Debug } else { log::LevelFilter::Info }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

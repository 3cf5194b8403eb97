pub mod atlas;
pub mod batch;
pub mod camera;
pub mod chunk;
pub mod config;
pub mod geometry;
pub mod overlay;
pub mod renderer;
pub mod tiles;
pub mod world;

pub use atlas::{Atlas, AtlasBuilder, AtlasError, AtlasHandle, PendingAtlas};
pub use batch::{Batch, RenderTarget, Rotation, TileVertex, VertexSink};
pub use chunk::{CacheState, Chunk, ChunkError};
pub use overlay::{ChunkOutlines, OutlineVertex};
pub use tiles::{AtlasRegion, Tile, TileDefinition, TileRegistry};
pub use world::{FrameStats, World};

/// Tile ids used by the demo binary's generated chunks.
pub const STONE: &str = "minecraft:stone";
pub const DIRT: &str = "minecraft:dirt";
pub const GRASS: &str = "minecraft:grass";

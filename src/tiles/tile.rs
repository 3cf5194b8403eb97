use std::sync::Arc;

use glam::Vec2;

use super::{AtlasRegion, TileDefinition, TileRegistry};

/// A placed tile: its type id plus a copy of the definition it resolved to.
///
/// The definition is copied rather than referenced, so a tile keeps drawing the
/// region it was built with even if a newer atlas replaces the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    type_id: Arc<str>,
    definition: TileDefinition,
    /// Kept as instance state; drawing uses the owning chunk's placement.
    world_position: Vec2,
}

impl Tile {
    /// Resolve `type_id` against `registry`.
    ///
    /// Unknown ids produce a tile with a zero-area region (drawn as a blank
    /// cell) and are counted by [`TileRegistry::misses`].
    pub fn new(type_id: &str, registry: &TileRegistry) -> Self {
        Self {
            type_id: Arc::from(type_id),
            definition: registry.resolve(type_id),
            world_position: Vec2::ZERO,
        }
    }

    pub fn with_world_position(mut self, position: Vec2) -> Self {
        self.world_position = position;
        self
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn definition(&self) -> &TileDefinition {
        &self.definition
    }

    pub fn region(&self) -> AtlasRegion {
        self.definition.region
    }

    pub fn random_rotation(&self) -> bool {
        self.definition.random_rotation
    }

    pub fn world_position(&self) -> Vec2 {
        self.world_position
    }

    /// True if the type was unknown when the tile was built.
    pub fn is_degenerate(&self) -> bool {
        self.definition.region.is_empty()
    }
}

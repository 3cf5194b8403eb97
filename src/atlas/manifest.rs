use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::AtlasError;

/// One tile type as written in the manifest.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ManifestTile {
    /// Source image, relative to the textures directory. `.png` is implied
    /// when no extension is given.
    #[serde(rename = "textures")]
    pub texture: String,
    #[serde(rename = "applyRotation", default)]
    pub apply_rotation: bool,
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    data: BTreeMap<String, ManifestTile>,
}

/// Flattened manifest entry handed to the packer.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestEntry {
    pub id: String,
    pub texture: String,
    pub random_rotation: bool,
}

/// Parsed tile manifest:
///
/// ```json
/// { "data": { "minecraft:stone": { "textures": "stone", "applyRotation": true } } }
/// ```
///
/// Entries are kept sorted by tile id so the packed layout is reproducible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifest {
    tiles: BTreeMap<String, ManifestTile>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, AtlasError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| AtlasError::ManifestIo { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
            .map_err(|source| AtlasError::ManifestParse { path: path.to_path_buf(), source })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: ManifestFile = serde_json::from_str(text)?;
        Ok(Self { tiles: file.data })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ManifestTile> {
        self.tiles.get(id)
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> Vec<ManifestEntry> {
        self.tiles
            .iter()
            .map(|(id, tile)| ManifestEntry {
                id: id.clone(),
                texture: tile.texture.clone(),
                random_rotation: tile.apply_rotation,
            })
            .collect()
    }
}

/// Resolve a manifest texture name against `textures_dir`.
pub fn texture_path(textures_dir: &Path, texture: &str) -> PathBuf {
    let mut path = textures_dir.join(texture);
    if path.extension().is_none() {
        path.set_extension("png");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_sorted_by_id() {
        let m = Manifest::from_json(
            r#"{ "data": {
                "minecraft:stone": { "textures": "stone", "applyRotation": true },
                "minecraft:dirt":  { "textures": "dirt" }
            } }"#,
        )
        .unwrap();
        let entries = m.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "minecraft:dirt");
        assert!(!entries[0].random_rotation, "applyRotation defaults to false");
        assert_eq!(entries[1].id, "minecraft:stone");
        assert!(entries[1].random_rotation);
    }

    #[test]
    fn missing_data_is_an_empty_manifest() {
        let m = Manifest::from_json("{}").unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn entry_without_texture_is_rejected() {
        assert!(Manifest::from_json(r#"{ "data": { "a": { "applyRotation": true } } }"#).is_err());
    }

    #[test]
    fn texture_path_appends_png_only_when_needed() {
        let dir = Path::new("tiles");
        assert_eq!(texture_path(dir, "stone"), PathBuf::from("tiles/stone.png"));
        assert_eq!(texture_path(dir, "grass.png"), PathBuf::from("tiles/grass.png"));
    }
}

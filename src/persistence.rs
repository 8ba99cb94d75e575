//! Terrain save files.
//!
//! A save stores only the corner elevations and edge modifiers of each tile.
//! Neighbour links and meshes are derived data and are rebuilt on load.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::direction::TileCoord;
use crate::elevation::{CornerElevations, EdgeModifiers, HeightField};
use crate::error::{TerrainError, TerrainResult};
use crate::terrain::Terrain;

const SAVE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub coord: TileCoord,
    pub elevations: CornerElevations,
    pub modifiers: EdgeModifiers,
}

/// On-disk wrapper around the tile records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainSaveFile {
    /// Format version for forward compatibility
    pub version: u32,
    /// Local time the file was written, RFC 3339
    #[serde(default)]
    pub saved_at: String,
    pub tiles: Vec<TileRecord>,
}

impl TerrainSaveFile {
    pub fn from_terrain(terrain: &Terrain) -> Self {
        let tiles = terrain
            .coords()
            .into_iter()
            .filter_map(|coord| terrain.tile(coord))
            .map(|tile| TileRecord {
                coord: tile.coord(),
                elevations: *tile.elevations(),
                modifiers: *tile.modifiers(),
            })
            .collect();
        Self {
            version: SAVE_VERSION,
            saved_at: Local::now().to_rfc3339(),
            tiles,
        }
    }

    /// Rebuild a terrain. An empty tile list yields a fresh single-tile terrain.
    pub fn into_terrain(self) -> TerrainResult<Terrain> {
        if self.version > SAVE_VERSION {
            return Err(TerrainError::UnsupportedVersion {
                found: self.version,
                supported: SAVE_VERSION,
            });
        }
        if self.tiles.is_empty() {
            warn!("Save file has no tiles, starting from a single tile");
            return Ok(Terrain::new());
        }

        let mut seen = HashSet::new();
        for record in &self.tiles {
            if !seen.insert(record.coord) {
                warn!("Duplicate record for {}, keeping the last one", record.coord);
            }
        }

        let terrain = Terrain::from_fields(
            self.tiles
                .into_iter()
                .map(|r| (r.coord, HeightField::new(r.elevations, r.modifiers))),
        );

        let violations = terrain.check_seams();
        if !violations.is_empty() {
            warn!("Loaded terrain has {} seam violations", violations.len());
            for v in &violations {
                warn!("  {}", v);
            }
        }
        Ok(terrain)
    }
}

pub fn to_json(terrain: &Terrain) -> TerrainResult<String> {
    Ok(serde_json::to_string_pretty(&TerrainSaveFile::from_terrain(terrain))?)
}

pub fn from_json(json: &str) -> TerrainResult<Terrain> {
    let save: TerrainSaveFile = serde_json::from_str(json)?;
    save.into_terrain()
}

pub fn save_terrain(terrain: &Terrain, path: &Path) -> TerrainResult<()> {
    fs::write(path, to_json(terrain)?)?;
    info!("Saved {} tiles to {}", terrain.len(), path.display());
    Ok(())
}

pub fn load_terrain(path: &Path) -> TerrainResult<Terrain> {
    let json = fs::read_to_string(path)?;
    let terrain = from_json(&json)?;
    info!("Loaded {} tiles from {}", terrain.len(), path.display());
    Ok(terrain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::{Anchor, Corner, Edge};
    use crate::modifier::ModifierShape;

    fn sample_terrain() -> Terrain {
        let mut terrain = Terrain::new();
        let east = terrain.add_tile(TileCoord::ORIGIN, Anchor::Right).unwrap();
        terrain.add_tile(east, Anchor::Top).unwrap();
        terrain.set_top_right_elevation(TileCoord::ORIGIN, 5).unwrap();
        terrain.set_right_modifier(east, ModifierShape::HalfHill).unwrap();
        terrain.set_top_modifier(TileCoord::ORIGIN, ModifierShape::Cliff).unwrap();
        terrain
    }

    #[test]
    fn test_reload_preserves_fields_and_links() {
        let terrain = sample_terrain();
        let loaded = from_json(&to_json(&terrain).unwrap()).unwrap();

        assert_eq!(loaded.coords(), terrain.coords());
        for coord in terrain.coords() {
            let (a, b) = (terrain.tile(coord).unwrap(), loaded.tile(coord).unwrap());
            assert_eq!(a.field(), b.field());
            assert_eq!(a.mesh(), b.mesh());
            assert_eq!(
                a.neighbors().collect::<Vec<_>>(),
                b.neighbors().collect::<Vec<_>>()
            );
        }
        assert!(loaded.check_seams().is_empty());
    }

    #[test]
    fn test_rejects_newer_version() {
        let json = r#"{ "version": 99, "saved_at": "", "tiles": [] }"#;
        assert!(matches!(
            from_json(json),
            Err(TerrainError::UnsupportedVersion { found: 99, supported: 1 })
        ));
    }

    #[test]
    fn test_empty_tile_list() {
        let json = r#"{ "version": 1, "tiles": [] }"#;
        let terrain = from_json(json).unwrap();
        assert_eq!(terrain.coords(), vec![TileCoord::ORIGIN]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(from_json("{ not json"), Err(TerrainError::Json(_))));
    }

    #[test]
    fn test_hand_written_record() {
        let json = r#"{
            "version": 1,
            "tiles": [{
                "coord": { "x": 2, "y": -1 },
                "elevations": { "top_left": 3, "top_right": 0, "bottom_left": 0, "bottom_right": -2 },
                "modifiers": { "top": "FullHill", "left": "Flat", "right": "Cliff", "bottom": "Flat" }
            }]
        }"#;
        let terrain = from_json(json).unwrap();
        let tile = terrain.tile(TileCoord::new(2, -1)).unwrap();
        assert_eq!(tile.elevation(Corner::TopLeft), 3);
        assert_eq!(tile.elevation(Corner::BottomRight), -2);
        assert_eq!(tile.modifier(Edge::Top), ModifierShape::FullHill);
        assert_eq!(tile.modifier(Edge::Right), ModifierShape::Cliff);
    }

    #[test]
    fn test_save_and_load_file() {
        let terrain = sample_terrain();
        let path = std::env::temp_dir().join(format!("landscape_tiles_{}.json", std::process::id()));
        save_terrain(&terrain, &path).unwrap();
        let loaded = load_terrain(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.len(), terrain.len());
    }
}

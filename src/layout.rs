//! Scripted terrain edits.
//!
//! A layout file is a JSON list of edit commands replayed in order against a
//! terrain, the same operations an interactive editor would issue.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::direction::{Anchor, Corner, Edge, TileCoord};
use crate::error::TerrainResult;
use crate::modifier::ModifierShape;
use crate::terrain::Terrain;

/// One editing operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddTile { from: TileCoord, anchor: Anchor },
    SetModifier { tile: TileCoord, edge: Edge, shape: ModifierShape },
    SetElevation { tile: TileCoord, corner: Corner, elevation: i32 },
    RaiseTile { tile: TileCoord, amount: i32 },
}

impl Terrain {
    /// Run one command through the propagating setters.
    pub fn apply(&mut self, command: &EditCommand) -> TerrainResult<()> {
        debug!("Applying {:?}", command);
        match *command {
            EditCommand::AddTile { from, anchor } => self.add_tile(from, anchor).map(|_| ()),
            EditCommand::SetModifier { tile, edge, shape } => self.set_edge_modifier(tile, edge, shape),
            EditCommand::SetElevation { tile, corner, elevation } => {
                self.set_corner_elevation(tile, corner, elevation)
            }
            EditCommand::RaiseTile { tile, amount } => self.raise_tile(tile, amount),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub commands: Vec<EditCommand>,
}

impl Layout {
    pub fn from_json(json: &str) -> TerrainResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> TerrainResult<Self> {
        let layout = Self::from_json(&fs::read_to_string(path)?)?;
        info!("Loaded {} edit commands from {}", layout.commands.len(), path.display());
        Ok(layout)
    }

    /// Apply every command in order, stopping at the first failure. Commands
    /// before the failing one stay applied.
    pub fn apply_to(&self, terrain: &mut Terrain) -> TerrainResult<()> {
        for (i, command) in self.commands.iter().enumerate() {
            if let Err(e) = terrain.apply(command) {
                warn!("Edit command {} failed: {}", i, e);
                return Err(e);
            }
        }
        Ok(())
    }
}

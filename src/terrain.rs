//! Sparse tile grid with neighbour propagation.
//!
//! Tiles live in a coordinate-keyed arena. Shared values are mirrored one hop:
//! setting an edge updates the opposite edge of the tile across it, setting a
//! corner updates the coinciding corner of the (up to) three other tiles
//! touching it. Propagation never cascades further, and a missing neighbour
//! is simply skipped.

use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::direction::{Anchor, Corner, Edge, TileCoord, HALF_TILE, TILE_SIZE};
use crate::elevation::HeightField;
use crate::error::{TerrainError, TerrainResult};
use crate::modifier::ModifierShape;
use crate::tile::Tile;

/// A collection of tiles addressed by grid coordinate.
#[derive(Clone, Debug)]
pub struct Terrain {
    tiles: HashMap<TileCoord, Tile>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new()
    }
}

impl Terrain {
    /// A terrain holding a single level tile at the origin.
    pub fn new() -> Self {
        let mut tiles = HashMap::new();
        tiles.insert(TileCoord::ORIGIN, Tile::new(TileCoord::ORIGIN));
        Self { tiles }
    }

    /// Rebuild a terrain from stored height fields. Neighbour links are
    /// derived from coordinates and every mesh is resampled.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (TileCoord, HeightField)>,
    {
        let tiles = fields
            .into_iter()
            .map(|(coord, field)| (coord, Tile::with_field(coord, field)))
            .collect();
        let mut terrain = Self { tiles };
        terrain.relink_all();
        terrain
    }

    /// Drop every tile and start over with a single tile at the origin.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Find a tile by its `Tile_{x}_{y}` name.
    pub fn find_by_name(&self, name: &str) -> Option<&Tile> {
        name.parse::<TileCoord>().ok().and_then(|c| self.tile(c))
    }

    /// All tiles, in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Tile coordinates sorted by row then column, for deterministic walks.
    pub fn coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.tiles.keys().copied().collect();
        coords.sort_by_key(|c| (c.y, c.x));
        coords
    }

    /// Inclusive bounding box `(min, max)` of all tile coordinates.
    pub fn bounds(&self) -> Option<(TileCoord, TileCoord)> {
        let mut iter = self.tiles.keys();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), c| {
            (
                TileCoord::new(min.x.min(c.x), min.y.min(c.y)),
                TileCoord::new(max.x.max(c.x), max.y.max(c.y)),
            )
        });
        Some((min, max))
    }

    // =========================================================================
    // Edge modifiers
    // =========================================================================

    /// Set `edge` of the tile at `coord` and mirror it onto the opposite edge
    /// of the tile across it.
    pub fn set_edge_modifier(
        &mut self,
        coord: TileCoord,
        edge: Edge,
        shape: ModifierShape,
    ) -> TerrainResult<()> {
        if self.write_edge(coord, edge, shape, true) {
            Ok(())
        } else {
            Err(TerrainError::TileNotFound(coord))
        }
    }

    pub fn set_top_modifier(&mut self, coord: TileCoord, shape: ModifierShape) -> TerrainResult<()> {
        self.set_edge_modifier(coord, Edge::Top, shape)
    }

    pub fn set_left_modifier(&mut self, coord: TileCoord, shape: ModifierShape) -> TerrainResult<()> {
        self.set_edge_modifier(coord, Edge::Left, shape)
    }

    pub fn set_right_modifier(&mut self, coord: TileCoord, shape: ModifierShape) -> TerrainResult<()> {
        self.set_edge_modifier(coord, Edge::Right, shape)
    }

    pub fn set_bottom_modifier(&mut self, coord: TileCoord, shape: ModifierShape) -> TerrainResult<()> {
        self.set_edge_modifier(coord, Edge::Bottom, shape)
    }

    /// Returns false when no tile exists at `coord`.
    fn write_edge(&mut self, coord: TileCoord, edge: Edge, shape: ModifierShape, recurse: bool) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return false;
        };
        tile.set_modifier(edge, shape);
        tile.refresh_mesh();
        let across = tile.neighbor(edge.anchor());

        if recurse {
            if let Some(other) = across {
                debug!("Mirroring {} edge of {} onto {} ({})", edge, coord, other, shape);
                self.write_edge(other, edge.opposite(), shape, false);
            }
        }
        true
    }

    // =========================================================================
    // Corner elevations
    // =========================================================================

    /// Set `corner` of the tile at `coord` and mirror it onto the three other
    /// tiles sharing that corner.
    pub fn set_corner_elevation(
        &mut self,
        coord: TileCoord,
        corner: Corner,
        elevation: i32,
    ) -> TerrainResult<()> {
        if self.write_corner(coord, corner, elevation, true) {
            Ok(())
        } else {
            Err(TerrainError::TileNotFound(coord))
        }
    }

    pub fn set_top_left_elevation(&mut self, coord: TileCoord, elevation: i32) -> TerrainResult<()> {
        self.set_corner_elevation(coord, Corner::TopLeft, elevation)
    }

    pub fn set_top_right_elevation(&mut self, coord: TileCoord, elevation: i32) -> TerrainResult<()> {
        self.set_corner_elevation(coord, Corner::TopRight, elevation)
    }

    pub fn set_bottom_left_elevation(&mut self, coord: TileCoord, elevation: i32) -> TerrainResult<()> {
        self.set_corner_elevation(coord, Corner::BottomLeft, elevation)
    }

    pub fn set_bottom_right_elevation(&mut self, coord: TileCoord, elevation: i32) -> TerrainResult<()> {
        self.set_corner_elevation(coord, Corner::BottomRight, elevation)
    }

    fn write_corner(&mut self, coord: TileCoord, corner: Corner, elevation: i32, recurse: bool) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return false;
        };
        tile.set_elevation(corner, elevation);
        tile.refresh_mesh();

        if recurse {
            let targets: Vec<(TileCoord, Corner)> = corner
                .shared_with()
                .into_iter()
                .filter_map(|(anchor, other)| tile.neighbor(anchor).map(|c| (c, other)))
                .collect();
            for (other, other_corner) in targets {
                debug!(
                    "Mirroring {} elevation {} of {} onto {} {}",
                    corner, elevation, coord, other, other_corner
                );
                self.write_corner(other, other_corner, elevation, false);
            }
        }
        true
    }

    /// Shift all four corners of a tile by `delta` through the propagating
    /// setters. Saturates at the `i32` range.
    pub fn raise_tile(&mut self, coord: TileCoord, delta: i32) -> TerrainResult<()> {
        let elevations = *self
            .tile(coord)
            .ok_or(TerrainError::TileNotFound(coord))?
            .elevations();
        for corner in Corner::ALL {
            let raised = elevations.get(corner).saturating_add(delta);
            self.set_corner_elevation(coord, corner, raised)?;
        }
        Ok(())
    }

    // =========================================================================
    // Tile creation
    // =========================================================================

    /// Create a tile next to `center` in direction `anchor`.
    ///
    /// The new tile is linked to every existing tile around it (not only
    /// `center`) and inherits the shared corner elevations and edge modifiers
    /// from each of them, visiting neighbours in [`Anchor::ALL`] order.
    pub fn add_tile(&mut self, center: TileCoord, anchor: Anchor) -> TerrainResult<TileCoord> {
        if !self.contains(center) {
            return Err(TerrainError::TileNotFound(center));
        }
        let coord = center.neighbor(anchor);
        if self.contains(coord) {
            return Err(TerrainError::TileExists(coord));
        }

        let mut tile = Tile::new(coord);
        for dir in Anchor::ALL {
            let neighbor_coord = coord.neighbor(dir);
            let Some(neighbor) = self.tiles.get_mut(&neighbor_coord) else {
                continue;
            };

            tile.link(dir, neighbor_coord);
            neighbor.link(dir.opposite(), coord);

            for corner in Corner::ALL {
                for (shared_dir, their_corner) in corner.shared_with() {
                    if shared_dir == dir {
                        tile.set_elevation(corner, neighbor.elevation(their_corner));
                    }
                }
            }
            if let Some(edge) = dir.edge() {
                tile.set_modifier(edge, neighbor.modifier(edge.opposite()));
            }
        }
        tile.refresh_mesh();

        info!("Added {} ({} neighbours)", coord, tile.neighbors().count());
        self.tiles.insert(coord, tile);
        Ok(coord)
    }

    /// Rebuild every neighbour link from tile coordinates.
    pub fn relink_all(&mut self) {
        let coords: Vec<TileCoord> = self.tiles.keys().copied().collect();
        for coord in coords {
            let links: Vec<(Anchor, TileCoord)> = Anchor::ALL
                .into_iter()
                .map(|a| (a, coord.neighbor(a)))
                .filter(|(_, c)| self.tiles.contains_key(c))
                .collect();
            if let Some(tile) = self.tiles.get_mut(&coord) {
                tile.clear_links();
                for (anchor, other) in links {
                    tile.link(anchor, other);
                }
            }
        }
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Height at local `(x, z)` of the tile at `coord`.
    pub fn elevation_at(&self, coord: TileCoord, x: f32, z: f32) -> Option<f32> {
        self.tile(coord).map(|t| t.elevation_at(x, z))
    }

    /// Height at a world-space `(x, z)` point, `None` over empty grid slots.
    pub fn world_elevation_at(&self, world_x: f32, world_z: f32) -> Option<f32> {
        let coord = TileCoord::containing(world_x, world_z);
        let local_x = (world_x - coord.x as f32 * TILE_SIZE).clamp(-HALF_TILE, HALF_TILE);
        let local_z = (world_z - coord.y as f32 * TILE_SIZE).clamp(-HALF_TILE, HALF_TILE);
        self.elevation_at(coord, local_x, local_z)
    }

    /// Resample every tile mesh. Tiles are independent, so this runs in parallel.
    pub fn refresh_all_meshes(&mut self) {
        self.tiles.par_iter_mut().for_each(|(_, tile)| tile.refresh_mesh());
    }

    // =========================================================================
    // Consistency
    // =========================================================================

    /// Every shared edge or corner whose two sides disagree. Each mismatch is
    /// reported once, from the tile with the smaller coordinate.
    pub fn check_seams(&self) -> Vec<SeamViolation> {
        let mut violations = Vec::new();

        for coord in self.coords() {
            let tile = &self.tiles[&coord];

            for edge in Edge::ALL {
                let Some(other) = tile.neighbor(edge.anchor()).and_then(|c| self.tile(c)) else {
                    continue;
                };
                if other.coord() < coord {
                    continue;
                }
                let ours = tile.modifier(edge);
                let theirs = other.modifier(edge.opposite());
                if ours != theirs {
                    violations.push(SeamViolation::Edge {
                        tile: coord,
                        edge,
                        neighbor: other.coord(),
                        ours,
                        theirs,
                    });
                }
            }

            for corner in Corner::ALL {
                for (anchor, their_corner) in corner.shared_with() {
                    let Some(other) = tile.neighbor(anchor).and_then(|c| self.tile(c)) else {
                        continue;
                    };
                    if other.coord() < coord {
                        continue;
                    }
                    let ours = tile.elevation(corner);
                    let theirs = other.elevation(their_corner);
                    if ours != theirs {
                        violations.push(SeamViolation::Corner {
                            tile: coord,
                            corner,
                            neighbor: other.coord(),
                            ours,
                            theirs,
                        });
                    }
                }
            }
        }

        violations
    }
}

/// A shared edge or corner whose values differ between two tiles.
#[derive(Clone, Debug, PartialEq)]
pub enum SeamViolation {
    Edge {
        tile: TileCoord,
        edge: Edge,
        neighbor: TileCoord,
        ours: ModifierShape,
        theirs: ModifierShape,
    },
    Corner {
        tile: TileCoord,
        corner: Corner,
        neighbor: TileCoord,
        ours: i32,
        theirs: i32,
    },
}

impl fmt::Display for SeamViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeamViolation::Edge { tile, edge, neighbor, ours, theirs } => write!(
                f,
                "{} {} edge is {} but {} has {}",
                tile, edge, ours, neighbor, theirs
            ),
            SeamViolation::Corner { tile, corner, neighbor, ours, theirs } => write!(
                f,
                "{} {} corner is {} but {} has {}",
                tile, corner, ours, neighbor, theirs
            ),
        }
    }
}

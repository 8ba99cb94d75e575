//! A single terrain tile.

use crate::direction::{Anchor, Corner, Edge, TileCoord};
use crate::elevation::{CornerElevations, EdgeModifiers, HeightField};
use crate::mesh::TileMesh;
use crate::modifier::ModifierShape;

/// One 10×10 square of terrain.
///
/// Setters on `Tile` touch only this tile. Use the `Terrain` methods to edit
/// shared edges and corners so that neighbours stay in sync.
#[derive(Clone, Debug)]
pub struct Tile {
    coord: TileCoord,
    field: HeightField,
    /// Adjacency by coordinate, indexed by `Anchor::index`.
    neighbors: [Option<TileCoord>; 8],
    mesh: TileMesh,
}

impl Tile {
    /// Level tile with flat edges and no neighbours.
    pub fn new(coord: TileCoord) -> Self {
        Self::with_field(coord, HeightField::default())
    }

    pub fn with_field(coord: TileCoord, field: HeightField) -> Self {
        let mut tile = Self {
            coord,
            field,
            neighbors: [None; 8],
            mesh: TileMesh::flat(),
        };
        tile.refresh_mesh();
        tile
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn name(&self) -> String {
        self.coord.name()
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn elevations(&self) -> &CornerElevations {
        &self.field.elevations
    }

    pub fn modifiers(&self) -> &EdgeModifiers {
        &self.field.modifiers
    }

    pub fn elevation(&self, corner: Corner) -> i32 {
        self.field.elevations.get(corner)
    }

    pub fn modifier(&self, edge: Edge) -> ModifierShape {
        self.field.modifiers.get(edge)
    }

    pub(crate) fn set_elevation(&mut self, corner: Corner, elevation: i32) {
        self.field.elevations.set(corner, elevation);
    }

    pub(crate) fn set_modifier(&mut self, edge: Edge, shape: ModifierShape) {
        self.field.modifiers.set(edge, shape);
    }

    pub fn neighbor(&self, anchor: Anchor) -> Option<TileCoord> {
        self.neighbors[anchor.index()]
    }

    pub fn has_neighbor(&self, anchor: Anchor) -> bool {
        self.neighbors[anchor.index()].is_some()
    }

    /// Linked neighbours as `(anchor, coord)` pairs.
    pub fn neighbors(&self) -> impl Iterator<Item = (Anchor, TileCoord)> + '_ {
        Anchor::ALL
            .into_iter()
            .filter_map(move |anchor| self.neighbor(anchor).map(|c| (anchor, c)))
    }

    pub(crate) fn link(&mut self, anchor: Anchor, coord: TileCoord) {
        self.neighbors[anchor.index()] = Some(coord);
    }

    pub(crate) fn clear_links(&mut self) {
        self.neighbors = [None; 8];
    }

    /// Height at local `(x, z)`; see [`HeightField::elevation_at`].
    pub fn elevation_at(&self, x: f32, z: f32) -> f32 {
        self.field.elevation_at(x, z)
    }

    /// World-space position of the tile centre.
    pub fn world_position(&self) -> [f32; 3] {
        self.coord.world_offset()
    }

    /// The render mesh; the same geometry serves as the collision surface.
    pub fn mesh(&self) -> &TileMesh {
        &self.mesh
    }

    /// Resample the mesh from the current height field.
    pub fn refresh_mesh(&mut self) {
        let field = self.field;
        self.mesh.refresh(|x, z| field.elevation_at(x, z));
    }
}

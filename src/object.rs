//! Objects that walk on the terrain surface.

use crate::direction::{TileCoord, HALF_TILE, TILE_SIZE};
use crate::error::{TerrainError, TerrainResult};
use crate::terrain::Terrain;

/// Largest climb allowed in a single step.
pub const MAX_STEP_HEIGHT: f32 = 2.0;

/// A point object resting on a tile, positioned in that tile's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainObject {
    tile: TileCoord,
    position: [f32; 3],
}

/// Which axes of a move were accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Movement {
    pub along_z: bool,
    pub along_x: bool,
}

impl TerrainObject {
    /// Drop an object onto the surface at `(x, z)` relative to `tile`.
    /// Points outside the tile footprint land on the tile that contains them.
    pub fn place(terrain: &Terrain, tile: TileCoord, x: f32, z: f32) -> TerrainResult<Self> {
        let (tile, x, z) = rebase(tile, x, z);
        let y = terrain
            .elevation_at(tile, x, z)
            .ok_or(TerrainError::TileNotFound(tile))?;
        Ok(Self { tile, position: [x, y, z] })
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    pub fn local_position(&self) -> [f32; 3] {
        self.position
    }

    pub fn world_position(&self) -> [f32; 3] {
        let [ox, oy, oz] = self.tile.world_offset();
        [self.position[0] + ox, self.position[1] + oy, self.position[2] + oz]
    }

    /// Move by `(dx, dz)`, the z step first and then the x step. Each step is
    /// dropped if it would climb more than [`MAX_STEP_HEIGHT`] or leave the
    /// terrain.
    pub fn move_by(&mut self, terrain: &Terrain, dx: f32, dz: f32) -> Movement {
        Movement {
            along_z: self.step(terrain, 0.0, dz),
            along_x: self.step(terrain, dx, 0.0),
        }
    }

    fn step(&mut self, terrain: &Terrain, dx: f32, dz: f32) -> bool {
        // Crossing a border hands the object to the tile containing the target
        let (tile, x, z) = rebase(self.tile, self.position[0] + dx, self.position[2] + dz);

        let Some(elevation) = terrain.elevation_at(tile, x, z) else {
            return false;
        };
        if elevation - self.position[1] > MAX_STEP_HEIGHT {
            return false;
        }

        self.tile = tile;
        self.position = [x, elevation, z];
        true
    }
}

/// Move a local point into the footprint of the tile that contains it.
/// Points on a border stay with the current tile.
fn rebase(tile: TileCoord, x: f32, z: f32) -> (TileCoord, f32, f32) {
    let shift_x = border_shift(x);
    let shift_z = border_shift(z);
    (
        TileCoord::new(tile.x + shift_x, tile.y + shift_z),
        x - shift_x as f32 * TILE_SIZE,
        z - shift_z as f32 * TILE_SIZE,
    )
}

/// Whole tiles to move so that `v` ends up in `[-HALF_TILE, HALF_TILE]`.
fn border_shift(v: f32) -> i32 {
    if v.abs() <= HALF_TILE {
        0
    } else {
        let tiles = ((v.abs() - HALF_TILE) / TILE_SIZE).ceil() as i32;
        tiles * v.signum() as i32
    }
}

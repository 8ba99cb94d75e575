//! Dense raster of terrain samples.
//!
//! The tile grid is sparse and unbounded; exporters work on this dense
//! rectangle instead. Row 0 is the northern (highest z) edge of the terrain.

use crate::direction::{TILE_SIZE, HALF_TILE};
use crate::terrain::Terrain;

/// A 2D grid of values, row-major.
#[derive(Clone, Debug)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }
}

impl Tilemap<Option<f32>> {
    /// Lowest and highest sampled value, ignoring empty cells.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Sample the terrain into a raster with `samples_per_tile` cells along each
/// tile side, covering the bounding box of all tiles. Cells over empty grid
/// slots are `None`.
pub fn rasterize(terrain: &Terrain, samples_per_tile: usize) -> Tilemap<Option<f32>> {
    let samples_per_tile = samples_per_tile.max(1);
    let Some((min, max)) = terrain.bounds() else {
        return Tilemap::new(0, 0);
    };

    let cols = (max.x - min.x + 1) as usize;
    let rows = (max.y - min.y + 1) as usize;
    let width = cols * samples_per_tile;
    let height = rows * samples_per_tile;
    let step = TILE_SIZE / samples_per_tile as f32;

    let west = min.x as f32 * TILE_SIZE - HALF_TILE;
    let north = max.y as f32 * TILE_SIZE + HALF_TILE;

    let mut map = Tilemap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let world_x = west + (x as f32 + 0.5) * step;
            let world_z = north - (y as f32 + 0.5) * step;
            map.set(x, y, terrain.world_elevation_at(world_x, world_z));
        }
    }
    map
}

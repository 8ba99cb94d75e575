//! Procedural landscape generation.
//!
//! Grows a rectangular patch of tiles from the origin, samples fractal
//! Perlin noise at every lattice corner and gives each edge a random shape.
//! All edits go through the propagating `Terrain` setters, so the result is
//! seamless by construction.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use noise::{NoiseFn, Perlin};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::direction::{Anchor, Corner, Edge, TileCoord};
use crate::error::TerrainResult;
use crate::modifier::ModifierShape;
use crate::terrain::Terrain;

/// Parameters for [`generate_landscape`].
#[derive(Clone, Debug)]
pub struct GeneratorParams {
    /// Tiles along x, growing east from the origin
    pub width: u32,
    /// Tiles along y, growing north from the origin
    pub height: u32,
    pub seed: u64,
    /// Peak corner elevation magnitude
    pub amplitude: f32,
    /// Noise frequency per lattice step
    pub frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Relative likelihood of each edge shape
    pub shape_weights: Vec<(ModifierShape, f64)>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            seed: 42,
            amplitude: 8.0,
            frequency: 0.35,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            shape_weights: vec![
                (ModifierShape::Flat, 0.55),
                (ModifierShape::FullHill, 0.1),
                (ModifierShape::FullDip, 0.1),
                (ModifierShape::HalfHill, 0.1),
                (ModifierShape::HalfDip, 0.1),
                (ModifierShape::Cliff, 0.05),
            ],
        }
    }
}

/// Derive a sub-seed for one generation stage from the master seed.
pub fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

/// Fractional Brownian motion over `noise`, normalised to roughly [-1, 1].
fn fbm_noise(
    noise: &impl NoiseFn<f64, 2>,
    x: f64,
    y: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves.max(1) {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Build a `width × height` landscape with tile `(0, 0)` at its south-west
/// corner. The same parameters always produce the same terrain.
pub fn generate_landscape(params: &GeneratorParams) -> TerrainResult<Terrain> {
    let width = params.width.max(1) as i32;
    let height = params.height.max(1) as i32;

    let mut terrain = Terrain::new();
    grow_patch(&mut terrain, width, height)?;
    sample_elevations(&mut terrain, params, width, height)?;
    assign_modifiers(&mut terrain, params)?;

    info!(
        "Generated {}x{} landscape ({} tiles, seed {})",
        width,
        height,
        terrain.len(),
        params.seed
    );
    Ok(terrain)
}

fn grow_patch(terrain: &mut Terrain, width: i32, height: i32) -> TerrainResult<()> {
    for y in 0..height {
        for x in 0..width {
            if x == 0 && y == 0 {
                continue;
            }
            if x > 0 {
                terrain.add_tile(TileCoord::new(x - 1, y), Anchor::Right)?;
            } else {
                terrain.add_tile(TileCoord::new(x, y - 1), Anchor::Top)?;
            }
        }
    }
    Ok(())
}

/// Write one noise sample per lattice corner. A lattice point `(gx, gy)` is
/// the south-west corner of tile `(gx, gy)`; the other tiles sharing it pick
/// the value up through propagation.
fn sample_elevations(
    terrain: &mut Terrain,
    params: &GeneratorParams,
    width: i32,
    height: i32,
) -> TerrainResult<()> {
    let perlin = Perlin::new(derive_seed(params.seed, "elevation") as u32);

    // Perlin noise is zero on integer lattice points
    const OFFSET_X: f64 = 0.318;
    const OFFSET_Y: f64 = 0.731;

    for gy in 0..=height {
        for gx in 0..=width {
            let n = fbm_noise(
                &perlin,
                gx as f64 * params.frequency + OFFSET_X,
                gy as f64 * params.frequency + OFFSET_Y,
                params.octaves,
                params.persistence,
                params.lacunarity,
            );
            let elevation = (n as f32 * params.amplitude).round() as i32;

            let (coord, corner) = if gx < width && gy < height {
                (TileCoord::new(gx, gy), Corner::BottomLeft)
            } else if gy < height {
                (TileCoord::new(gx - 1, gy), Corner::BottomRight)
            } else if gx < width {
                (TileCoord::new(gx, gy - 1), Corner::TopLeft)
            } else {
                (TileCoord::new(gx - 1, gy - 1), Corner::TopRight)
            };
            terrain.set_corner_elevation(coord, corner, elevation)?;
        }
    }
    Ok(())
}

/// Give every edge one random shape. Each tile draws its top and right
/// edges; tiles on the south and west rims also draw their outer edge.
fn assign_modifiers(terrain: &mut Terrain, params: &GeneratorParams) -> TerrainResult<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(params.seed, "modifiers"));
    let dist = match WeightedIndex::new(params.shape_weights.iter().map(|(_, w)| *w)) {
        Ok(dist) => Some(dist),
        Err(e) => {
            warn!("Invalid shape weights ({}), using flat edges", e);
            None
        }
    };

    for coord in terrain.coords() {
        let Some(tile) = terrain.tile(coord) else {
            continue;
        };
        let mut edges = vec![Edge::Top, Edge::Right];
        if !tile.has_neighbor(Anchor::Bottom) {
            edges.push(Edge::Bottom);
        }
        if !tile.has_neighbor(Anchor::Left) {
            edges.push(Edge::Left);
        }

        for edge in edges {
            let shape = match &dist {
                Some(dist) => params.shape_weights[dist.sample(&mut rng)].0,
                None => ModifierShape::Flat,
            };
            terrain.set_edge_modifier(coord, edge, shape)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params(seed: u64) -> GeneratorParams {
        GeneratorParams {
            width: 3,
            height: 2,
            seed,
            ..GeneratorParams::default()
        }
    }

    #[test]
    fn test_derive_seed_is_stable_and_distinct() {
        assert_eq!(derive_seed(7, "elevation"), derive_seed(7, "elevation"));
        assert_ne!(derive_seed(7, "elevation"), derive_seed(7, "modifiers"));
        assert_ne!(derive_seed(7, "elevation"), derive_seed(8, "elevation"));
    }

    #[test]
    fn test_patch_layout() {
        let terrain = generate_landscape(&small_params(1)).unwrap();
        assert_eq!(terrain.len(), 6);
        assert_eq!(terrain.bounds(), Some((TileCoord::new(0, 0), TileCoord::new(2, 1))));
        // Interior links cover the whole patch
        let origin = terrain.tile(TileCoord::ORIGIN).unwrap();
        assert_eq!(origin.neighbors().count(), 3);
    }

    #[test]
    fn test_generated_terrain_is_seamless() {
        for seed in [1, 2, 3, 99] {
            let terrain = generate_landscape(&small_params(seed)).unwrap();
            assert!(terrain.check_seams().is_empty(), "seed {seed}");
        }
    }

    #[test]
    fn test_deterministic_per_seed() {
        let a = generate_landscape(&small_params(5)).unwrap();
        let b = generate_landscape(&small_params(5)).unwrap();
        for coord in a.coords() {
            assert_eq!(a.tile(coord).unwrap().field(), b.tile(coord).unwrap().field());
        }
    }

    #[test]
    fn test_zero_amplitude_is_level() {
        let params = GeneratorParams {
            amplitude: 0.0,
            ..small_params(3)
        };
        let terrain = generate_landscape(&params).unwrap();
        for tile in terrain.tiles() {
            for corner in Corner::ALL {
                assert_eq!(tile.elevation(corner), 0);
            }
        }
    }

    #[test]
    fn test_single_shape_weight() {
        let params = GeneratorParams {
            shape_weights: vec![(ModifierShape::Cliff, 1.0)],
            ..small_params(4)
        };
        let terrain = generate_landscape(&params).unwrap();
        for tile in terrain.tiles() {
            for edge in Edge::ALL {
                assert_eq!(tile.modifier(edge), ModifierShape::Cliff);
            }
        }
    }

    #[test]
    fn test_invalid_weights_fall_back_to_flat() {
        let params = GeneratorParams {
            shape_weights: vec![],
            ..small_params(4)
        };
        let terrain = generate_landscape(&params).unwrap();
        assert!(terrain
            .tiles()
            .all(|t| Edge::ALL.iter().all(|&e| t.modifier(e) == ModifierShape::Flat)));
    }

    #[test]
    fn test_elevations_bounded_by_amplitude() {
        let params = GeneratorParams {
            amplitude: 6.0,
            ..small_params(11)
        };
        let terrain = generate_landscape(&params).unwrap();
        for tile in terrain.tiles() {
            for corner in Corner::ALL {
                assert!(tile.elevation(corner).abs() <= 6);
            }
        }
    }
}

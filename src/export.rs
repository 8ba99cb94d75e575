//! Heightmap images and Wavefront OBJ meshes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use tracing::info;

use crate::error::TerrainResult;
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;

/// Options for heightmap image export.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Raster cells along each tile side
    pub samples_per_tile: usize,
    /// Modulate colours with a simple hillshade
    pub shaded: bool,
    /// Colour of cells over empty grid slots
    pub background: [u8; 3],
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            samples_per_tile: 10,
            shaded: true,
            background: [0, 0, 0],
        }
    }
}

/// Render a raster with the spectral colormap, normalised to its own range.
pub fn render_heightmap(map: &Tilemap<Option<f32>>, options: &ExportOptions) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(map.width as u32, map.height as u32);
    let (lo, hi) = map.value_range().unwrap_or((0.0, 0.0));
    let range = (hi - lo).max(f32::EPSILON);

    // Light from the northwest, elevated
    let light_dir = normalize_vec3(-1.0, -1.0, 2.0);

    for (x, y, value) in map.iter() {
        let color = match value {
            Some(h) => {
                let base = spectral_colormap(((h - lo) / range).clamp(0.0, 1.0));
                if options.shaded {
                    let n = calculate_normal(map, x, y, options.samples_per_tile);
                    let diffuse = (n[0] * light_dir[0] + n[1] * light_dir[1] + n[2] * light_dir[2]).max(0.0);
                    let shade = 0.4 + 0.6 * diffuse;
                    [
                        (base[0] as f32 * shade).clamp(0.0, 255.0) as u8,
                        (base[1] as f32 * shade).clamp(0.0, 255.0) as u8,
                        (base[2] as f32 * shade).clamp(0.0, 255.0) as u8,
                    ]
                } else {
                    base
                }
            }
            None => options.background,
        };
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }

    img
}

/// Rasterize the terrain and save it as a colour-mapped PNG.
pub fn export_heightmap(terrain: &Terrain, path: &Path, options: &ExportOptions) -> TerrainResult<()> {
    let map = crate::tilemap::rasterize(terrain, options.samples_per_tile);
    let img = render_heightmap(&map, options);
    img.save(path)?;
    info!("Wrote {}x{} heightmap to {}", map.width, map.height, path.display());
    Ok(())
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t_scaled = t * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

/// Surface normal from the raster gradient. Empty or out-of-range neighbours
/// count as level with the centre cell.
fn calculate_normal(map: &Tilemap<Option<f32>>, x: usize, y: usize, samples_per_tile: usize) -> [f32; 3] {
    let center = map.get(x, y).unwrap_or(0.0);
    let sample = |sx: Option<usize>, sy: Option<usize>| -> f32 {
        match (sx, sy) {
            (Some(sx), Some(sy)) if sx < map.width && sy < map.height => map.get(sx, sy).unwrap_or(center),
            _ => center,
        }
    };

    let h_left = sample(x.checked_sub(1), Some(y));
    let h_right = sample(Some(x + 1), Some(y));
    let h_up = sample(Some(x), y.checked_sub(1));
    let h_down = sample(Some(x), Some(y + 1));

    // World distance between raster cells
    let cell = 10.0 / samples_per_tile.max(1) as f32;
    let dx = (h_right - h_left) / (2.0 * cell);
    let dy = (h_down - h_up) / (2.0 * cell);

    // Screen y grows southward
    normalize_vec3(-dx, dy, 1.0)
}

fn normalize_vec3(x: f32, y: f32, z: f32) -> [f32; 3] {
    let len = (x * x + y * y + z * z).sqrt();
    [x / len, y / len, z / len]
}

/// Write every tile mesh in world space as Wavefront OBJ, one object per tile.
pub fn write_obj<W: Write>(terrain: &Terrain, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "# landscape_tiles terrain, {} tiles", terrain.len())?;
    let mut base = 1usize;

    for coord in terrain.coords() {
        let Some(tile) = terrain.tile(coord) else {
            continue;
        };
        let mesh = tile.mesh();

        writeln!(out, "o {}", tile.name())?;
        for [x, y, z] in mesh.world_vertices(coord) {
            writeln!(out, "v {} {} {}", x, y, z)?;
        }
        for [u, v] in mesh.uvs() {
            writeln!(out, "vt {} {}", u, v)?;
        }
        for [x, y, z] in mesh.normals() {
            writeln!(out, "vn {} {} {}", x, y, z)?;
        }
        for tri in mesh.triangles().chunks_exact(3) {
            let (a, b, c) = (
                tri[0] as usize + base,
                tri[1] as usize + base,
                tri[2] as usize + base,
            );
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        base += mesh.vertices().len();
    }

    Ok(())
}

pub fn export_obj(terrain: &Terrain, path: &Path) -> TerrainResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(terrain, &mut out)?;
    out.flush()?;
    info!("Wrote {} tile meshes to {}", terrain.len(), path.display());
    Ok(())
}

//! ASCII rendering and export of terrain rasters.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;
use tracing::info;

use crate::direction::{Corner, Edge};
use crate::error::TerrainResult;
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;

const HEIGHT_CHARS: &[char] = &['~', '.', '-', '=', '+', '*', '#', '%', '^', 'A', 'M'];

/// Character for a height, normalised over `[lo, hi]`.
pub fn height_char(elevation: f32, lo: f32, hi: f32) -> char {
    let range = (hi - lo).max(f32::EPSILON);
    let normalized = ((elevation - lo) / range).clamp(0.0, 1.0);
    let idx = (normalized * (HEIGHT_CHARS.len() - 1) as f32) as usize;
    HEIGHT_CHARS[idx.min(HEIGHT_CHARS.len() - 1)]
}

/// One character per raster cell, rows separated by newlines. Empty grid
/// slots render as spaces.
pub fn render_ascii_map(map: &Tilemap<Option<f32>>) -> String {
    let (lo, hi) = map.value_range().unwrap_or((0.0, 0.0));
    let mut result = String::with_capacity((map.width + 1) * map.height);

    for y in 0..map.height {
        for x in 0..map.width {
            let ch = match *map.get(x, y) {
                Some(h) => height_char(h, lo, hi),
                None => ' ',
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

pub fn height_legend(lo: f32, hi: f32) -> String {
    let chars: Vec<String> = HEIGHT_CHARS.iter().map(|c| c.to_string()).collect();
    format!(
        "=== HEIGHT LEGEND ===\nLow -> High:\n{}\n({:.2})        ({:.2})\n",
        chars.join(" "),
        lo,
        hi
    )
}

fn write_tile_table<W: Write>(out: &mut W, terrain: &Terrain) -> io::Result<()> {
    writeln!(out, "=== TILES ===")?;
    for coord in terrain.coords() {
        let Some(tile) = terrain.tile(coord) else {
            continue;
        };
        let corners: Vec<String> = Corner::ALL
            .iter()
            .map(|&c| format!("{}={}", c, tile.elevation(c)))
            .collect();
        let edges: Vec<String> = Edge::ALL
            .iter()
            .map(|&e| format!("{}={}", e, tile.modifier(e)))
            .collect();
        writeln!(
            out,
            "{:<14} {}  avg={:.2}  {}",
            tile.name(),
            corners.join(" "),
            tile.elevations().average(),
            edges.join(" ")
        )?;
    }
    Ok(())
}

/// Write a header, the rendered map, a legend and a per-tile table.
pub fn write_ascii_report<W: Write>(
    out: &mut W,
    terrain: &Terrain,
    map: &Tilemap<Option<f32>>,
) -> io::Result<()> {
    let (lo, hi) = map.value_range().unwrap_or((0.0, 0.0));

    writeln!(out, "=== LANDSCAPE TERRAIN FILE ===")?;
    writeln!(out, "Tiles: {}", terrain.len())?;
    if let Some((min, max)) = terrain.bounds() {
        writeln!(out, "Bounds: ({}, {}) .. ({}, {})", min.x, min.y, max.x, max.y)?;
    }
    writeln!(out, "Raster: {}x{}", map.width, map.height)?;
    writeln!(out, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;

    out.write_all(render_ascii_map(map).as_bytes())?;
    writeln!(out)?;
    out.write_all(height_legend(lo, hi).as_bytes())?;
    writeln!(out)?;
    write_tile_table(out, terrain)
}

pub fn export_ascii_file(terrain: &Terrain, map: &Tilemap<Option<f32>>, path: &Path) -> TerrainResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_ascii_report(&mut out, terrain, map)?;
    out.flush()?;
    info!("Wrote ASCII map to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::{Anchor, TileCoord};
    use crate::tilemap::rasterize;

    #[test]
    fn test_height_char_extremes() {
        assert_eq!(height_char(-3.0, -3.0, 5.0), '~');
        assert_eq!(height_char(5.0, -3.0, 5.0), 'M');
        assert_eq!(height_char(100.0, -3.0, 5.0), 'M');
        // Degenerate range never divides by zero
        assert_eq!(height_char(1.0, 1.0, 1.0), '~');
    }

    #[test]
    fn test_render_shape_and_gaps() {
        let mut terrain = Terrain::new();
        terrain.add_tile(TileCoord::ORIGIN, Anchor::TopRight).unwrap();
        terrain.set_bottom_left_elevation(TileCoord::ORIGIN, -4).unwrap();
        let map = rasterize(&terrain, 3);
        let text = render_ascii_map(&map);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.chars().count() == 6));
        // North-west quadrant is an empty slot
        assert!(rows[0].starts_with("   "));
        // Lowest corner of the terrain sits south-west
        assert_eq!(rows[5].chars().next(), Some('~'));
    }

    #[test]
    fn test_report_lists_tiles() {
        let mut terrain = Terrain::new();
        terrain.add_tile(TileCoord::ORIGIN, Anchor::Bottom).unwrap();
        let map = rasterize(&terrain, 2);
        let mut buf = Vec::new();
        write_ascii_report(&mut buf, &terrain, &map).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("=== LANDSCAPE TERRAIN FILE ==="));
        assert!(text.contains("Tiles: 2"));
        assert!(text.contains("Tile_0_-1"));
        assert!(text.contains("Tile_0_0"));
        assert!(text.contains("=== HEIGHT LEGEND ==="));
        assert!(text.contains("avg=0.00"));
    }
}

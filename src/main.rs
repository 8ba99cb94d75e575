use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use landscape_tiles::ascii;
use landscape_tiles::export::{self, ExportOptions};
use landscape_tiles::generator::{generate_landscape, GeneratorParams};
use landscape_tiles::layout::Layout;
use landscape_tiles::logging::init_logging;
use landscape_tiles::persistence;
use landscape_tiles::tilemap::rasterize;

#[derive(Parser, Debug)]
#[command(name = "landscape")]
#[command(about = "Build, edit and export tiled landscape terrain")]
struct Args {
    /// Load a saved terrain instead of generating one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Tiles along x for a generated terrain
    #[arg(short = 'W', long, default_value = "4")]
    width: u32,

    /// Tiles along y for a generated terrain
    #[arg(short = 'H', long, default_value = "4")]
    height: u32,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Peak corner elevation of generated terrain
    #[arg(long, default_value = "8.0")]
    amplitude: f32,

    /// JSON file of edit commands to apply after loading or generating
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Save the terrain as JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Export all tile meshes as Wavefront OBJ
    #[arg(long)]
    export_obj: Option<PathBuf>,

    /// Export a colour-mapped PNG heightmap
    #[arg(long)]
    export_heightmap: Option<PathBuf>,

    /// Export an ASCII map with a tile table
    #[arg(long)]
    export_ascii: Option<PathBuf>,

    /// Raster cells per tile side for image and ASCII output
    #[arg(long, default_value = "10")]
    samples_per_tile: usize,

    /// Disable hillshading in the PNG heightmap
    #[arg(long)]
    flat_shading: bool,

    /// Print the ASCII map to stdout
    #[arg(long)]
    print: bool,

    /// Print the surface height at a world-space point, e.g. `--sample 3.5,-2`
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    sample: Vec<(f32, f32)>,

    /// Debug logging for this crate
    #[arg(short, long)]
    verbose: bool,
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z but got '{}'", s))?;
    let x = x.trim().parse::<f32>().map_err(|e| format!("bad X '{}': {}", x, e))?;
    let z = z.trim().parse::<f32>().map_err(|e| format!("bad Z '{}': {}", z, e))?;
    Ok((x, z))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut terrain = match &args.load {
        Some(path) => persistence::load_terrain(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            info!("Generating {}x{} landscape with seed {}", args.width, args.height, seed);
            let params = GeneratorParams {
                width: args.width,
                height: args.height,
                seed,
                amplitude: args.amplitude,
                ..GeneratorParams::default()
            };
            generate_landscape(&params)?
        }
    };

    if let Some(path) = &args.layout {
        let layout = Layout::load(path).with_context(|| format!("reading layout {}", path.display()))?;
        layout.apply_to(&mut terrain).context("applying layout")?;
    }

    let violations = terrain.check_seams();
    if !violations.is_empty() {
        warn!("{} seam violations after editing", violations.len());
    }

    if let Some(path) = &args.save {
        persistence::save_terrain(&terrain, path)?;
    }
    if let Some(path) = &args.export_obj {
        export::export_obj(&terrain, path)?;
    }
    if let Some(path) = &args.export_heightmap {
        let options = ExportOptions {
            samples_per_tile: args.samples_per_tile,
            shaded: !args.flat_shading,
            ..ExportOptions::default()
        };
        export::export_heightmap(&terrain, path, &options)?;
    }

    if args.export_ascii.is_some() || args.print {
        let map = rasterize(&terrain, args.samples_per_tile);
        if let Some(path) = &args.export_ascii {
            ascii::export_ascii_file(&terrain, &map, path)?;
        }
        if args.print {
            print!("{}", ascii::render_ascii_map(&map));
        }
    }

    for (x, z) in &args.sample {
        match terrain.world_elevation_at(*x, *z) {
            Some(h) => println!("({}, {}) -> {:.3}", x, z, h),
            None => println!("({}, {}) -> no tile", x, z),
        }
    }

    Ok(())
}

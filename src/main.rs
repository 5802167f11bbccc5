use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use terrain_scatter::erosion::{ErosionParams, ErosionPreset};
use terrain_scatter::export;
use terrain_scatter::logging;
use terrain_scatter::seeds::PipelineSeeds;
use terrain_scatter::world::{self, GenerationConfig};
use terrain_scatter::Result;

#[derive(Parser, Debug)]
#[command(name = "terrain_scatter")]
#[command(about = "Generate eroded terrain and scatter vegetation blades over it")]
struct Args {
    /// JSON configuration file (missing fields use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width of the heightfield in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the heightfield in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Master seed (uses random seed if not specified and no config is given)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Erosion preset: none, light, normal, heavy
    #[arg(long)]
    preset: Option<ErosionPreset>,

    /// Number of erosion droplets (overrides the preset)
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Number of blades to place
    #[arg(short, long)]
    blades: Option<usize>,

    /// Containment padding in percent, for both meshing and placement
    #[arg(short, long)]
    padding: Option<f32>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Write a JSON summary of the generated terrain
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Export the eroded heightfield as a grayscale PNG
    #[arg(long)]
    export_heightmap: Option<PathBuf>,

    /// Export the erosion height change as a PNG
    #[arg(long)]
    export_delta: Option<PathBuf>,
}

impl Args {
    /// Load the base configuration and apply command-line overrides.
    fn config(&self) -> Result<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => GenerationConfig::with_seed(self.seed.unwrap_or_else(rand::random)),
        };

        if let Some(seed) = self.seed {
            config.seeds = PipelineSeeds::from_master(seed);
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(preset) = self.preset {
            info!("Erosion preset: {} ({})", preset, preset.description());
            config.erosion = ErosionParams::from_preset(preset);
        }
        if let Some(iterations) = self.iterations {
            config.erosion.iterations = iterations;
        }
        if let Some(blades) = self.blades {
            config.scatter.target = blades;
        }
        if let Some(padding) = self.padding {
            config.mesh.padding_percent = padding;
            config.scatter.padding_percent = padding;
        }

        Ok(config)
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.config()?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("Seeds: {}", config.seeds);
    let terrain = world::generate(&config)?;
    let summary = terrain.summary();

    println!("Seed: {}", summary.seeds.master);
    println!("Map size: {}x{}", summary.width, summary.height);
    println!(
        "Erosion: {} droplets, {} steps, eroded {:.3}, deposited {:.3}",
        summary.erosion.iterations,
        summary.erosion.steps_taken,
        summary.erosion.total_eroded,
        summary.erosion.total_deposited,
    );
    println!("Terrain triangles: {}", summary.terrain_triangles);
    println!(
        "Blades: {} ({} attempts)",
        summary.blades, summary.placement_attempts
    );
    println!("Scene index: {} triangles", summary.scene_triangles);

    if let Some(path) = &args.summary {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        println!("Summary written to: {}", path.display());
    }
    if let Some(path) = &args.export_heightmap {
        export::export_heightmap(&terrain.heightfield, path)?;
        println!("Exported heightmap to: {}", path.display());
    }
    if let Some(path) = &args.export_delta {
        export::export_height_delta(&terrain.height_delta(), path)?;
        println!("Exported height change to: {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Generation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

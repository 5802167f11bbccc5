//! Profiling tool to identify performance bottlenecks

use std::time::Instant;

use terrain_scatter::{
    erosion::{self, ErosionParams},
    heightmap::{self, HeightmapParams},
    mesh::{self, MeshParams, VertexPayload},
    sampling::{Palette, PaletteParams, PerlinNoise},
    scatter::{self, ScatterParams},
    seeds::PipelineSeeds,
    spatial::TriangleBvh,
    world,
};

fn main() -> terrain_scatter::Result<()> {
    terrain_scatter::logging::init();

    let width = 512;
    let height = 512;
    let seeds = PipelineSeeds::from_master(1337);

    println!("=== Performance Profiling ===");
    println!("Map size: {}x{} ({} cells)", width, height, width * height);
    println!();

    // Profile heightmap generation
    let start = Instant::now();
    let mut heightfield = heightmap::generate_heightmap(
        width,
        height,
        &HeightmapParams::default(),
        seeds.heightmap_noise_seed(),
    )?;
    let mut pre_erosion = heightfield.clone();
    let heightmap_time = start.elapsed();
    println!("Heightmap generation: {:?}", heightmap_time);

    // Profile erosion (the big one)
    let params = ErosionParams::default();
    println!("\nErosion parameters:");
    println!("  Droplets: {}", params.iterations);
    println!("  Time step: {}", params.time_step);
    println!("  Evaporation: {}", params.evaporation_rate);
    println!();

    let start = Instant::now();
    let stats = erosion::erode(&mut heightfield, &params, &mut seeds.erosion_rng())?;
    world::normalize_eroded(&mut heightfield, &mut pre_erosion);
    let erosion_time = start.elapsed();
    println!("Erosion simulation: {:?}", erosion_time);
    println!("  Steps: {} ({:.1} per droplet)", stats.steps_taken, stats.steps_taken as f64 / stats.iterations.max(1) as f64);
    println!("  Eroded: {:.3} units", stats.total_eroded);
    println!("  Deposited: {:.3} units", stats.total_deposited);

    // Profile meshing
    let palette = Palette::from_params(&PaletteParams::default());
    let start = Instant::now();
    let terrain = mesh::mesh_heightfield(
        &heightfield,
        Some(&pre_erosion),
        &MeshParams::default(),
        VertexPayload::Palette(&palette),
    )?;
    let mesh_time = start.elapsed();
    println!("\nMeshing: {:?} ({} triangles)", mesh_time, terrain.len());

    // Profile index build
    let start = Instant::now();
    let terrain_index = TriangleBvh::build(&terrain.positions());
    let bvh_time = start.elapsed();
    println!("BVH build: {:?}", bvh_time);

    // Profile placement
    let noise = PerlinNoise::new(seeds.density_noise_seed());
    let start = Instant::now();
    let blades = scatter::place_blades(
        &terrain_index,
        &ScatterParams::default(),
        &noise,
        &palette,
        &mut seeds.placement_rng(),
    )?
    .into_result()?;
    let placement_time = start.elapsed();
    println!("Placement: {:?} ({} blades, {} attempts)", placement_time, blades.len(), blades.attempts);

    let start = Instant::now();
    let scene = world::build_scene_index(&terrain, &blades);
    let scene_time = start.elapsed();
    println!("Scene index: {:?} ({} triangles)", scene_time, scene.len());

    // Summary
    let stages = [
        ("Heightmap", heightmap_time),
        ("Erosion", erosion_time),
        ("Meshing", mesh_time),
        ("BVH build", bvh_time),
        ("Placement", placement_time),
        ("Scene index", scene_time),
    ];
    let total: std::time::Duration = stages.iter().map(|(_, t)| *t).sum();
    println!("\n=== Summary ===");
    for (name, time) in &stages {
        println!(
            "{:<16}{:>8.2}% ({:?})",
            format!("{}:", name),
            100.0 * time.as_secs_f64() / total.as_secs_f64(),
            time
        );
    }
    println!("─────────────────────────────────");
    println!("TOTAL:          {:>8}  {:?}", "100%", total);

    Ok(())
}

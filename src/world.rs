//! Generation pipeline
//!
//! Bundles every parameter block into one [`GenerationConfig`] and runs the
//! stages in order: base heightfield, erosion, normalization, meshing,
//! terrain index, blade placement and finally the combined scene index.

use log::info;
use serde::{Deserialize, Serialize};

use crate::erosion::{self, ErosionParams, ErosionStats};
use crate::error::{Result, TerrainError};
use crate::heightmap::{self, HeightmapParams};
use crate::mesh::{self, MeshParams, TerrainMesh, VertexPayload};
use crate::sampling::{Palette, PaletteParams, PerlinNoise};
use crate::scatter::{self, BladeField, ScatterParams};
use crate::seeds::PipelineSeeds;
use crate::spatial::{Triangle, TriangleBvh};
use crate::tilemap::Heightfield;

/// Everything needed to reproduce one generated terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    pub seeds: PipelineSeeds,
    pub heightmap: HeightmapParams,
    pub erosion: ErosionParams,
    pub mesh: MeshParams,
    pub scatter: ScatterParams,
    pub palette: PaletteParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::with_seed(42)
    }
}

impl GenerationConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            width: 256,
            height: 256,
            seeds: PipelineSeeds::from_master(seed),
            heightmap: HeightmapParams::default(),
            erosion: ErosionParams::default(),
            mesh: MeshParams::default(),
            scatter: ScatterParams::default(),
            palette: PaletteParams::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::EmptyHeightfield {
                width: self.width,
                height: self.height,
            });
        }
        self.heightmap.validate()?;
        self.erosion.validate()?;
        self.mesh.validate()?;
        self.scatter.validate()?;
        self.palette.validate()
    }
}

/// Output of [`generate`].
#[derive(Debug)]
pub struct GeneratedTerrain {
    pub seeds: PipelineSeeds,
    /// Eroded, normalized heights
    pub heightfield: Heightfield,
    /// Heights before erosion, in the same normalized units as `heightfield`
    pub pre_erosion: Heightfield,
    pub erosion_stats: ErosionStats,
    pub mesh: TerrainMesh,
    pub blades: BladeField,
    /// Terrain triangles followed by every blade's placeholder pair
    pub scene_index: TriangleBvh,
}

/// Headline numbers for a generated terrain.
#[derive(Clone, Debug, Serialize)]
pub struct GenerationSummary {
    pub seeds: PipelineSeeds,
    pub width: usize,
    pub height: usize,
    pub erosion: ErosionStats,
    pub terrain_triangles: usize,
    pub blades: usize,
    pub placement_attempts: usize,
    pub scene_triangles: usize,
    /// Largest erosion-induced drop across all cells
    pub max_lowering: f32,
    /// Largest erosion-induced rise across all cells
    pub max_raising: f32,
}

impl GeneratedTerrain {
    /// Per-cell `post - pre` height change.
    pub fn height_delta(&self) -> Heightfield {
        Heightfield::from_fn(self.heightfield.width, self.heightfield.height, |x, y| {
            self.heightfield.get(x, y) - self.pre_erosion.get(x, y)
        })
    }

    pub fn summary(&self) -> GenerationSummary {
        let (lowest, highest) = self.height_delta().min_max().unwrap_or((0.0, 0.0));
        GenerationSummary {
            seeds: self.seeds.clone(),
            width: self.heightfield.width,
            height: self.heightfield.height,
            erosion: self.erosion_stats.clone(),
            terrain_triangles: self.mesh.len(),
            blades: self.blades.len(),
            placement_attempts: self.blades.attempts,
            scene_triangles: self.scene_index.len(),
            max_lowering: (-lowest).max(0.0),
            max_raising: highest.max(0.0),
        }
    }
}

/// Normalize an eroded field and map its snapshot through the same rescale.
///
/// Afterwards `eroded - snapshot` measures erosion alone; cells no droplet
/// touched have a delta of exactly zero.
pub fn normalize_eroded(eroded: &mut Heightfield, snapshot: &mut Heightfield) {
    if let Some((lo, hi)) = eroded.min_max() {
        snapshot.rescale(lo, hi);
    }
    eroded.normalize();
}

/// Combine terrain triangles with blade placeholders into one index.
pub fn build_scene_index(mesh: &TerrainMesh, blades: &BladeField) -> TriangleBvh {
    let mut triangles: Vec<Triangle> = mesh.positions();
    triangles.extend_from_slice(&blades.index_triangles);
    TriangleBvh::build(&triangles)
}

/// Run the full pipeline.
///
/// Fails on invalid configuration before any stage runs, and with
/// [`TerrainError::PlacementExhausted`] when the blade target cannot be
/// reached within the attempt budget.
pub fn generate(config: &GenerationConfig) -> Result<GeneratedTerrain> {
    config.validate()?;
    let seeds = config.seeds.clone();

    info!(
        "Generating {}x{} terrain (seed {})",
        config.width, config.height, seeds.master
    );

    let mut heightfield = heightmap::generate_heightmap(
        config.width,
        config.height,
        &config.heightmap,
        seeds.heightmap_noise_seed(),
    )?;
    let mut pre_erosion = heightfield.clone();

    info!("Eroding with {} droplets", config.erosion.iterations);
    let mut erosion_rng = seeds.erosion_rng();
    let erosion_stats = erosion::erode(&mut heightfield, &config.erosion, &mut erosion_rng)?;
    normalize_eroded(&mut heightfield, &mut pre_erosion);

    let palette = Palette::from_params(&config.palette);
    let mesh = mesh::mesh_heightfield(
        &heightfield,
        Some(&pre_erosion),
        &config.mesh,
        VertexPayload::Palette(&palette),
    )?;
    info!("Meshed terrain: {} triangles", mesh.len());

    let terrain_index = TriangleBvh::build(&mesh.positions());

    let noise = PerlinNoise::new(seeds.density_noise_seed());
    let mut placement_rng = seeds.placement_rng();
    let blades = scatter::place_blades(
        &terrain_index,
        &config.scatter,
        &noise,
        &palette,
        &mut placement_rng,
    )?
    .into_result()?;
    info!(
        "Placed {} blades in {} attempts",
        blades.len(),
        blades.attempts
    );

    let scene_index = build_scene_index(&mesh, &blades);

    Ok(GeneratedTerrain {
        seeds,
        heightfield,
        pre_erosion,
        erosion_stats,
        mesh,
        blades,
        scene_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> GenerationConfig {
        GenerationConfig {
            width: 48,
            height: 48,
            erosion: ErosionParams::fast(),
            scatter: ScatterParams {
                target: 60,
                ..ScatterParams::default()
            },
            ..GenerationConfig::with_seed(seed)
        }
    }

    #[test]
    fn test_generate_small_terrain() {
        let terrain = generate(&small_config(1)).unwrap();

        assert_eq!(terrain.blades.len(), 60);
        assert!(!terrain.mesh.is_empty());
        assert_eq!(terrain.mesh.height_deltas.len(), terrain.mesh.len());
        assert_eq!(
            terrain.scene_index.len(),
            terrain.mesh.len() + terrain.blades.index_triangles.len()
        );

        let (lo, hi) = terrain.heightfield.min_max().unwrap();
        assert!(lo >= 0.0 && hi <= 1.0);
        assert_ne!(terrain.heightfield, terrain.pre_erosion);

        let summary = terrain.summary();
        assert_eq!(summary.blades, 60);
        assert_eq!(summary.erosion.iterations, 500);
    }

    #[test]
    fn test_same_config_reproduces_terrain() {
        let a = generate(&small_config(9)).unwrap();
        let b = generate(&small_config(9)).unwrap();
        assert_eq!(a.heightfield, b.heightfield);
        assert_eq!(a.mesh, b.mesh);
        assert_eq!(a.blades, b.blades);
    }

    #[test]
    fn test_rejects_empty_grid() {
        let config = GenerationConfig {
            width: 0,
            ..small_config(2)
        };
        assert!(matches!(
            generate(&config),
            Err(TerrainError::EmptyHeightfield { width: 0, .. })
        ));
    }

    #[test]
    fn test_unreachable_target_fails_with_exhaustion() {
        let config = GenerationConfig {
            scatter: ScatterParams {
                target: 1_000,
                max_attempts: Some(50),
                ..ScatterParams::default()
            },
            ..small_config(3)
        };
        assert!(matches!(
            generate(&config),
            Err(TerrainError::PlacementExhausted { target: 1_000, attempts: 50, .. })
        ));
    }

    #[test]
    fn test_config_json_round_trips_with_partial_input() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{"width": 64, "erosion": {"iterations": 10}}"#).unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 256);
        assert_eq!(config.erosion.iterations, 10);
        assert_eq!(config.erosion.time_step, ErosionParams::default().time_step);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_snapshot_shares_normalization() {
        let mut snapshot = Heightfield::from_fn(4, 4, |x, y| (x + y) as f32 / 6.0);
        let mut eroded = snapshot.clone();
        eroded.set(0, 0, -0.5);
        eroded.set(3, 3, 0.8);

        normalize_eroded(&mut eroded, &mut snapshot);

        let (lo, hi) = eroded.min_max().unwrap();
        assert_eq!((lo, hi), (0.0, 1.0));
        for (x, y, &h) in eroded.iter() {
            let delta = h - *snapshot.get(x, y);
            match (x, y) {
                (0, 0) => assert!(delta < 0.0),
                (3, 3) => assert!(delta < 0.0),
                _ => assert_eq!(delta, 0.0, "untouched cell ({x}, {y}) moved"),
            }
        }
    }
}

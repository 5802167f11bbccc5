//! Base terrain synthesis.
//!
//! Produces the raw heightfield that erosion starts from: fractal Perlin
//! noise blended with ridged noise, pulled down toward the rim so the
//! terrain sits inside the containment sphere used by meshing.

use log::debug;
use noise::{NoiseFn, Perlin, Seedable};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, Result, TerrainError};
use crate::tilemap::Heightfield;

/// Parameters for base terrain noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapParams {
    /// Base noise frequency in cycles across the map
    pub frequency: f32,
    /// fBm octave count
    pub octaves: u32,
    /// Amplitude falloff per octave
    pub persistence: f32,
    /// Frequency gain per octave
    pub lacunarity: f32,
    /// Blend weight of ridged noise (0 = smooth hills, 1 = all ridges)
    pub ridge_weight: f32,
    /// Ridge sharpening exponent
    pub ridge_power: f32,
    /// Strength of the radial falloff toward the map rim (0 = none)
    pub falloff: f32,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            frequency: 3.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            ridge_weight: 0.35,
            ridge_power: 2.0,
            falloff: 0.6,
        }
    }
}

impl HeightmapParams {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("heightmap.frequency", self.frequency)?;
        ensure_positive("heightmap.persistence", self.persistence)?;
        ensure_positive("heightmap.lacunarity", self.lacunarity)?;
        ensure_positive("heightmap.ridge_power", self.ridge_power)?;
        ensure_non_negative("heightmap.falloff", self.falloff)?;
        if !(0.0..=1.0).contains(&self.ridge_weight) {
            return Err(TerrainError::invalid("heightmap.ridge_weight", self.ridge_weight));
        }
        if self.octaves == 0 {
            return Err(TerrainError::invalid("heightmap.octaves", 0u32));
        }
        Ok(())
    }
}

/// Generate a normalized base heightfield.
pub fn generate_heightmap(
    width: usize,
    height: usize,
    params: &HeightmapParams,
    seed: u32,
) -> Result<Heightfield> {
    if width == 0 || height == 0 {
        return Err(TerrainError::EmptyHeightfield { width, height });
    }
    params.validate()?;

    let terrain_noise = Perlin::new(1).set_seed(seed);
    let ridge_noise = Perlin::new(1).set_seed(seed.wrapping_add(2222));

    let inv_w = 1.0 / (width.max(2) - 1) as f64;
    let inv_h = 1.0 / (height.max(2) - 1) as f64;
    let freq = params.frequency as f64;

    let mut field = Heightfield::from_fn(width, height, |x, y| {
        let u = x as f64 * inv_w;
        let v = y as f64 * inv_h;

        let base = fbm_noise(
            &terrain_noise,
            u * freq,
            v * freq,
            params.octaves,
            params.persistence as f64,
            params.lacunarity as f64,
        );
        let ridges = generate_ridges(u * freq, v * freq, &ridge_noise, params.ridge_power as f64);
        let blended = base * (1.0 - params.ridge_weight as f64) + ridges * params.ridge_weight as f64;

        // Distance from map center, 0 at center and 1 at the edge midpoints
        let dx = u * 2.0 - 1.0;
        let dy = v * 2.0 - 1.0;
        let r = (dx * dx + dy * dy).sqrt();
        let rim = params.falloff as f64 * r * r;

        (blended - rim) as f32
    });

    field.normalize();

    if let Some((min_h, max_h)) = field.min_max() {
        debug!("Base heightfield {}x{}: range {:.3}..{:.3}", width, height, min_h, max_h);
    }

    Ok(field)
}

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

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Multi-octave ridged noise in [0, 1]
fn generate_ridges(x: f64, y: f64, noise: &Perlin, power: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_val = 0.0;

    for i in 0..4 {
        let n = noise.get([x * frequency, y * frequency, i as f64 * 0.5]);

        // 1 - |noise| peaks along zero crossings
        let ridge = (1.0 - n.abs()).powf(power);

        total += amplitude * ridge;
        max_val += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    (total / max_val).max(0.0)
}

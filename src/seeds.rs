//! Seed management for terrain generation
//!
//! Each pipeline stage draws from its own RNG stream, so changing the number
//! of erosion droplets does not reshuffle where blades land.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeds for all pipeline stages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Base terrain noise
    pub heightmap: u64,
    /// Droplet spawn points
    pub erosion: u64,
    /// Density noise used to gate blade placement
    pub density_noise: u64,
    /// Candidate origins, blade rotation and size jitter
    pub placement: u64,
}

impl PipelineSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            heightmap: derive_seed(master, Stage::Heightmap),
            erosion: derive_seed(master, Stage::Erosion),
            density_noise: derive_seed(master, Stage::DensityNoise),
            placement: derive_seed(master, Stage::Placement),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> PipelineSeedsBuilder {
        PipelineSeedsBuilder::new(master)
    }

    pub fn erosion_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.erosion)
    }

    pub fn placement_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.placement)
    }

    /// Noise crates take 32-bit seeds.
    pub fn density_noise_seed(&self) -> u32 {
        fold_to_u32(self.density_noise)
    }

    pub fn heightmap_noise_seed(&self) -> u32 {
        fold_to_u32(self.heightmap)
    }
}

impl Default for PipelineSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for overriding individual seeds while deriving others from master
pub struct PipelineSeedsBuilder {
    seeds: PipelineSeeds,
}

impl PipelineSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: PipelineSeeds::from_master(master),
        }
    }

    pub fn heightmap(mut self, seed: u64) -> Self {
        self.seeds.heightmap = seed;
        self
    }

    pub fn erosion(mut self, seed: u64) -> Self {
        self.seeds.erosion = seed;
        self
    }

    pub fn density_noise(mut self, seed: u64) -> Self {
        self.seeds.density_noise = seed;
        self
    }

    pub fn placement(mut self, seed: u64) -> Self {
        self.seeds.placement = seed;
        self
    }

    pub fn build(self) -> PipelineSeeds {
        self.seeds
    }
}

/// ChaCha stream index for each stage. A sub-seed is the first word of its stream.
#[derive(Clone, Copy)]
enum Stage {
    Heightmap = 1,
    Erosion = 2,
    DensityNoise = 3,
    Placement = 4,
}

/// Derive a sub-seed from a master seed and a stage.
fn derive_seed(master: u64, stage: Stage) -> u64 {
    let mut rng = ChaCha8Rng::seed_from_u64(master);
    rng.set_stream(stage as u64);
    rng.next_u64()
}

fn fold_to_u32(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

impl std::fmt::Display for PipelineSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PipelineSeeds {{ master: {}, heightmap: {}, erosion: {}, density_noise: {}, placement: {} }}",
            self.master, self.heightmap, self.erosion, self.density_noise, self.placement,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = PipelineSeeds::from_master(12345);
        let seeds2 = PipelineSeeds::from_master(12345);
        assert_eq!(seeds1, seeds2);
    }

    #[test]
    fn test_different_stages_get_different_seeds() {
        let seeds = PipelineSeeds::from_master(12345);
        assert_ne!(seeds.heightmap, seeds.erosion);
        assert_ne!(seeds.erosion, seeds.placement);
        assert_ne!(seeds.placement, seeds.density_noise);
    }

    #[test]
    fn test_builder_overrides_one_stage() {
        let base = PipelineSeeds::from_master(7);
        let custom = PipelineSeeds::builder(7).erosion(99).build();
        assert_eq!(custom.erosion, 99);
        assert_eq!(custom.heightmap, base.heightmap);
        assert_eq!(custom.placement, base.placement);
    }

    #[test]
    fn test_stage_seeds_distinct_across_masters() {
        for master in [0u64, 1, 42, u64::MAX] {
            let seeds = PipelineSeeds::from_master(master);
            let all = [seeds.heightmap, seeds.erosion, seeds.density_noise, seeds.placement];
            for (i, a) in all.iter().enumerate() {
                for b in &all[i + 1..] {
                    assert_ne!(a, b, "master {master}");
                }
            }
        }
        assert_ne!(PipelineSeeds::from_master(1).erosion, PipelineSeeds::from_master(2).erosion);
    }

    #[test]
    fn test_stage_seed_is_first_word_of_stage_stream() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        rng.set_stream(2);
        assert_eq!(PipelineSeeds::from_master(99).erosion, rng.next_u64());
    }
}

use noise::{NoiseFn, Perlin, Seedable};

/// Deterministic procedural noise, roughly in `[-1, 1]`.
pub trait NoiseSource: Send + Sync {
    fn sample2(&self, x: f32, y: f32) -> f32;
    fn sample3(&self, x: f32, y: f32, z: f32) -> f32;
}

/// Perlin gradient noise from the `noise` crate.
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(1).set_seed(seed),
        }
    }
}

impl NoiseSource for PerlinNoise {
    fn sample2(&self, x: f32, y: f32) -> f32 {
        self.perlin.get([x as f64, y as f64]) as f32
    }

    fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        self.perlin.get([x as f64, y as f64, z as f64]) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let a = PerlinNoise::new(42);
        let b = PerlinNoise::new(42);
        for i in 0..20 {
            let x = i as f32 * 0.37;
            assert_eq!(a.sample2(x, -x), b.sample2(x, -x));
            assert_eq!(a.sample3(x, 1.5, x * 2.0), b.sample3(x, 1.5, x * 2.0));
        }
    }

    #[test]
    fn test_values_bounded() {
        let noise = PerlinNoise::new(9);
        for i in 0..200 {
            let v = noise.sample2(i as f32 * 0.13, i as f32 * 0.29);
            assert!(v.is_finite() && v.abs() <= 1.5);
        }
    }
}

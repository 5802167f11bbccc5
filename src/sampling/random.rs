use rand::Rng;

/// Uniform random draws used for droplet spawns, candidate origins,
/// rotation angles and blade jitter.
pub trait RandomSource {
    /// Uniform real in `[lo, hi)`. Returns `lo` when the range is empty.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;

    /// Uniform integer in `[lo, hi]`. Returns `lo` when `hi < lo`.
    fn uniform_int(&mut self, lo: usize, hi: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.gen_range(lo..hi)
        } else {
            lo
        }
    }

    fn uniform_int(&mut self, lo: usize, hi: usize) -> usize {
        if hi > lo {
            self.gen_range(lo..=hi)
        } else {
            lo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let v = rng.uniform(-1.0, 1.0);
            assert!((-1.0..1.0).contains(&v));
            let i = rng.uniform_int(2, 5);
            assert!((2..=5).contains(&i));
        }
    }

    #[test]
    fn test_empty_ranges_collapse() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(rng.uniform(0.5, 0.5), 0.5);
        assert_eq!(rng.uniform_int(4, 4), 4);
        assert_eq!(rng.uniform_int(4, 1), 4);
    }
}

//! Keyframe color palettes for terrain and blade coloring.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Maps a scalar in `[0, 1]` to an RGB color.
pub trait ColorSampler: Send + Sync {
    fn sample(&self, t: f32) -> [f32; 3];
}

/// Which built-in palette to use and how many discrete colors it may show.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteParams {
    /// Index into [`Palette::BUILTIN`]; wraps around.
    pub index: usize,
    /// Quantize the ramp to this many flat bands (`None` = smooth).
    pub color_count: Option<u32>,
}

impl Default for PaletteParams {
    fn default() -> Self {
        Self {
            index: 0,
            color_count: None,
        }
    }
}

impl PaletteParams {
    pub fn validate(&self) -> Result<()> {
        match self.color_count {
            Some(0) => Err(TerrainError::invalid("palette.color_count", 0u32)),
            _ => Ok(()),
        }
    }
}

/// Piecewise-linear color ramp over `[0, 1]`.
#[derive(Clone, Debug)]
pub struct Palette {
    keys: Vec<(f32, [f32; 3])>,
    color_count: Option<u32>,
}

type Keys = &'static [(f32, [f32; 3])];

impl Palette {
    /// Built-in ramps: grassland, desert, alpine, autumn.
    pub const BUILTIN: [Keys; 4] = [
        &[
            (0.0, [0.10, 0.22, 0.08]),
            (0.45, [0.25, 0.48, 0.14]),
            (0.8, [0.55, 0.66, 0.28]),
            (1.0, [0.86, 0.88, 0.62]),
        ],
        &[
            (0.0, [0.45, 0.27, 0.12]),
            (0.5, [0.80, 0.60, 0.32]),
            (1.0, [0.96, 0.86, 0.62]),
        ],
        &[
            (0.0, [0.18, 0.26, 0.16]),
            (0.55, [0.42, 0.40, 0.36]),
            (0.8, [0.62, 0.62, 0.64]),
            (1.0, [0.96, 0.97, 1.00]),
        ],
        &[
            (0.0, [0.35, 0.10, 0.05]),
            (0.4, [0.78, 0.30, 0.08]),
            (0.75, [0.93, 0.62, 0.15]),
            (1.0, [0.98, 0.88, 0.45]),
        ],
    ];

    /// Create a palette from unsorted keys. Keys are sorted by position.
    pub fn new(mut keys: Vec<(f32, [f32; 3])>) -> Self {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys, color_count: None }
    }

    pub fn from_params(params: &PaletteParams) -> Self {
        let keys = Self::BUILTIN[params.index % Self::BUILTIN.len()];
        Self::new(keys.to_vec()).with_color_count(params.color_count)
    }

    pub fn with_color_count(mut self, color_count: Option<u32>) -> Self {
        self.color_count = color_count.filter(|&n| n > 0);
        self
    }

    fn quantize(&self, t: f32) -> f32 {
        match self.color_count {
            Some(1) => 0.0,
            Some(n) => {
                let bands = n as f32;
                ((t * bands).floor().min(bands - 1.0)) / (bands - 1.0)
            }
            None => t,
        }
    }
}

impl ColorSampler for Palette {
    fn sample(&self, t: f32) -> [f32; 3] {
        let Some(&(first_t, first)) = self.keys.first() else {
            return [0.0; 3];
        };
        let t = self.quantize(if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 });

        if t <= first_t {
            return first;
        }

        for pair in self.keys.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = (t1 - t0).max(f32::EPSILON);
                let f = (t - t0) / span;
                return [
                    c0[0] + (c1[0] - c0[0]) * f,
                    c0[1] + (c1[1] - c0[1]) * f,
                    c0[2] + (c1[2] - c0[2]) * f,
                ];
            }
        }

        self.keys[self.keys.len() - 1].1
    }
}

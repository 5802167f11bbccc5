//! Droplet-based hydraulic erosion
//!
//! [`erode`] validates its inputs, then runs the requested number of
//! droplets one after another over the heightfield.

pub mod hydraulic;
pub mod params;
pub mod utils;

pub use hydraulic::{Droplet, DropletStep};
pub use params::{ErosionParams, ErosionPreset};
pub use utils::{sediment_capacity, surface_normal};

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::sampling::RandomSource;
use crate::tilemap::Heightfield;

/// Statistics from an erosion run
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErosionStats {
    /// Number of droplets simulated
    pub iterations: usize,
    /// Total position updates across all droplets
    pub steps_taken: u64,
    /// Droplets that ran off the grid
    pub left_grid: usize,
    /// Droplets that evaporated below the minimum volume
    pub evaporated: usize,
    /// Total material removed (in height units)
    pub total_eroded: f64,
    /// Total material added
    pub total_deposited: f64,
    /// Largest single-step removal
    pub max_erosion: f32,
    /// Largest single-step addition
    pub max_deposition: f32,
}

/// Run `params.iterations` droplet lifecycles, mutating `heightfield` in place.
///
/// Fails before any droplet runs if the heightfield is empty or holds a
/// non-finite value, or if a parameter is out of range.
pub fn erode<R: RandomSource + ?Sized>(
    heightfield: &mut Heightfield,
    params: &ErosionParams,
    rng: &mut R,
) -> Result<ErosionStats> {
    heightfield.validate()?;
    params.validate()?;

    let stats = hydraulic::simulate(heightfield, params.iterations, params, rng);

    debug!(
        "Erosion: {} droplets, {} steps ({} left grid, {} evaporated), eroded {:.4}, deposited {:.4}",
        stats.iterations,
        stats.steps_taken,
        stats.left_grid,
        stats.evaporated,
        stats.total_eroded,
        stats.total_deposited,
    );

    Ok(stats)
}

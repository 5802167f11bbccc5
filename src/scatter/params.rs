//! Blade placement parameters

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, Result, TerrainError};

/// Parameters for scattering blades over an indexed surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterParams {
    /// Number of blades to place
    pub target: usize,
    /// Blade height per unit of density
    pub z_multiplier: f32,
    /// Width of a blade's base
    pub box_size: f32,
    /// Largest horizontal displacement a blade may see at runtime
    pub max_displacement: f32,
    /// Containment sphere padding, in percent of the unit radius
    pub padding_percent: f32,
    /// Height candidate rays are cast down from
    pub origin_height: f32,
    /// Third coordinate of the fine density octave
    pub phase_offset: f32,
    /// Candidate budget before giving up (`None` = `1000 * target + 10_000`)
    pub max_attempts: Option<usize>,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self {
            target: 2_000,
            z_multiplier: 0.04,
            box_size: 0.008,
            max_displacement: 0.02,
            padding_percent: 5.0,
            origin_height: 10.0,
            phase_offset: 0.0,
            max_attempts: None,
        }
    }
}

impl ScatterParams {
    /// Attempt budget actually used by the placement loop.
    pub fn attempt_budget(&self) -> usize {
        self.max_attempts
            .unwrap_or_else(|| self.target.saturating_mul(1000).saturating_add(10_000))
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("scatter.z_multiplier", self.z_multiplier)?;
        ensure_positive("scatter.box_size", self.box_size)?;
        ensure_non_negative("scatter.max_displacement", self.max_displacement)?;
        ensure_non_negative("scatter.padding_percent", self.padding_percent)?;
        ensure_positive("scatter.origin_height", self.origin_height)?;
        ensure_finite("scatter.phase_offset", self.phase_offset)?;
        if self.max_attempts == Some(0) && self.target > 0 {
            return Err(TerrainError::invalid("scatter.max_attempts", 0u32));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_scales_with_target() {
        let params = ScatterParams { target: 3, ..ScatterParams::default() };
        assert_eq!(params.attempt_budget(), 13_000);

        let params = ScatterParams { max_attempts: Some(7), ..params };
        assert_eq!(params.attempt_budget(), 7);
    }

    #[test]
    fn test_validate() {
        assert!(ScatterParams::default().validate().is_ok());
        assert!(ScatterParams { box_size: 0.0, ..Default::default() }.validate().is_err());
        assert!(ScatterParams { padding_percent: -1.0, ..Default::default() }.validate().is_err());
        assert!(ScatterParams { phase_offset: f32::NAN, ..Default::default() }.validate().is_err());
        assert!(ScatterParams { max_attempts: Some(0), ..Default::default() }.validate().is_err());
        assert!(ScatterParams { target: 0, max_attempts: Some(0), ..Default::default() }
            .validate()
            .is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: ScatterParams = serde_json::from_str(r#"{"target": 12}"#).unwrap();
        assert_eq!(params.target, 12);
        assert_eq!(params.box_size, ScatterParams::default().box_size);
        assert_eq!(params.max_attempts, None);
    }
}

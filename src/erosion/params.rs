//! Erosion simulation parameters and configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, Result, TerrainError};

/// Erosion intensity preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErosionPreset {
    /// No erosion - raw terrain
    None,
    /// Few short-lived droplets - subtle gullies
    Light,
    /// Balanced erosion
    #[default]
    Normal,
    /// Many long-lived droplets - deep channels and fans
    Heavy,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::None, Self::Light, Self::Normal, Self::Heavy]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No erosion (raw terrain)",
            Self::Light => "Subtle gullies",
            Self::Normal => "Balanced erosion",
            Self::Heavy => "Deep channels and sediment fans",
        }
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Light => write!(f, "light"),
            Self::Normal => write!(f, "normal"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

impl std::str::FromStr for ErosionPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown erosion preset `{s}` (expected none, light, normal or heavy)"))
    }
}

/// Droplet erosion parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Number of droplets to simulate
    pub iterations: usize,

    /// Integration step for velocity, position, sediment and evaporation
    pub time_step: f32,

    /// Water density; heavier droplets accelerate less
    pub density: f32,

    /// Fraction of volume lost per unit time
    pub evaporation_rate: f32,

    /// How fast carried sediment moves toward capacity
    pub deposition_rate: f32,

    /// Droplets with volume at or below this are dropped
    pub min_volume: f32,

    /// Velocity damping per unit time
    pub friction: f32,

    /// Vertical exaggeration applied to height differences when
    /// estimating surface normals
    pub normal_scale: f32,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            iterations: 20_000,
            time_step: 1.2,
            density: 1.0,
            evaporation_rate: 0.001,
            deposition_rate: 0.1,
            min_volume: 0.01,
            friction: 0.05,
            normal_scale: 60.0,
        }
    }
}

impl ErosionParams {
    /// Create a fast configuration for testing (fewer iterations)
    pub fn fast() -> Self {
        Self {
            iterations: 500,
            ..Default::default()
        }
    }

    /// Create parameters from a preset
    pub fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::None => Self {
                iterations: 0,
                ..Default::default()
            },
            ErosionPreset::Light => Self {
                iterations: 5_000,
                evaporation_rate: 0.004,
                ..Default::default()
            },
            ErosionPreset::Normal => Self::default(),
            ErosionPreset::Heavy => Self {
                iterations: 80_000,
                deposition_rate: 0.15,
                ..Default::default()
            },
        }
    }

    /// Fraction of volume kept after one step.
    pub fn evaporation_factor(&self) -> f32 {
        1.0 - self.time_step * self.evaporation_rate
    }

    /// Fraction of velocity kept after one step.
    pub fn friction_factor(&self) -> f32 {
        1.0 - self.time_step * self.friction
    }

    /// Check every parameter before the first droplet runs.
    ///
    /// The evaporation factor must lie strictly inside (0, 1) so volume
    /// shrinks every step and droplets always terminate.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("erosion.time_step", self.time_step)?;
        ensure_positive("erosion.density", self.density)?;
        ensure_positive("erosion.evaporation_rate", self.evaporation_rate)?;
        ensure_non_negative("erosion.deposition_rate", self.deposition_rate)?;
        ensure_positive("erosion.min_volume", self.min_volume)?;
        ensure_non_negative("erosion.friction", self.friction)?;
        ensure_non_negative("erosion.normal_scale", self.normal_scale)?;

        let evaporation = self.evaporation_factor();
        if !(evaporation > 0.0 && evaporation < 1.0) {
            return Err(TerrainError::invalid("erosion.evaporation_rate", self.evaporation_rate));
        }
        if self.friction_factor() < 0.0 {
            return Err(TerrainError::invalid("erosion.friction", self.friction));
        }
        if self.min_volume >= 1.0 {
            return Err(TerrainError::invalid("erosion.min_volume", self.min_volume));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference() {
        let p = ErosionParams::default();
        assert_eq!(p.time_step, 1.2);
        assert_eq!(p.density, 1.0);
        assert_eq!(p.evaporation_rate, 0.001);
        assert_eq!(p.deposition_rate, 0.1);
        assert_eq!(p.min_volume, 0.01);
        assert_eq!(p.friction, 0.05);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        for &preset in ErosionPreset::all() {
            assert!(ErosionParams::from_preset(preset).validate().is_ok(), "{preset}");
        }
        assert_eq!(ErosionParams::from_preset(ErosionPreset::None).iterations, 0);
    }

    #[test]
    fn test_preset_round_trips_through_str() {
        for &preset in ErosionPreset::all() {
            assert_eq!(preset.to_string().parse::<ErosionPreset>().unwrap(), preset);
        }
        assert!("extreme".parse::<ErosionPreset>().is_err());
    }

    #[test]
    fn test_rejects_non_terminating_evaporation() {
        let zero = ErosionParams { evaporation_rate: 0.0, ..Default::default() };
        assert!(zero.validate().is_err());
        let total = ErosionParams { evaporation_rate: 1.0, time_step: 1.0, ..Default::default() };
        assert!(total.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let p = ErosionParams { density: f32::NAN, ..Default::default() };
        assert!(matches!(p.validate(), Err(TerrainError::InvalidParameter { name: "erosion.density", .. })));
    }
}

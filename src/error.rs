//! Error types for terrain generation

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, TerrainError>;

/// Main error type for the generation pipeline
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("heightfield must be non-empty, got {width}x{height}")]
    EmptyHeightfield { width: usize, height: usize },

    #[error("heightfield value at ({x}, {y}) is not finite")]
    NonFiniteHeight { x: usize, y: usize },

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("snapshot is {snapshot_width}x{snapshot_height} but heightfield is {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        snapshot_width: usize,
        snapshot_height: usize,
    },

    #[error("height-delta payload requires a pre-erosion snapshot")]
    MissingSnapshot,

    #[error("placement exhausted: {placed}/{target} blades after {attempts} attempts")]
    PlacementExhausted {
        placed: usize,
        target: usize,
        attempts: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl TerrainError {
    /// Shorthand for a parameter that failed validation.
    pub fn invalid(name: &'static str, value: impl Into<f64>) -> Self {
        Self::InvalidParameter { name, value: value.into() }
    }
}

/// Reject non-finite values.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TerrainError::invalid(name, value))
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::invalid(name, value))
    }
}

/// Reject non-finite or negative values.
pub(crate) fn ensure_non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TerrainError::invalid(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_checks() {
        assert!(ensure_finite("a", 1.0).is_ok());
        assert!(ensure_finite("a", f32::NAN).is_err());
        assert!(ensure_positive("a", 0.0).is_err());
        assert!(ensure_non_negative("a", 0.0).is_ok());
        assert!(ensure_non_negative("a", -0.1).is_err());
    }

    #[test]
    fn test_exhausted_message() {
        let err = TerrainError::PlacementExhausted { placed: 3, target: 10, attempts: 500 };
        assert_eq!(err.to_string(), "placement exhausted: 3/10 blades after 500 attempts");
    }
}

//! Procedural terrain and vegetation scattering library
//!
//! Re-exports modules for use by binaries and tools.

pub mod erosion;
pub mod error;
pub mod export;
pub mod heightmap;
pub mod logging;
pub mod mesh;
pub mod sampling;
pub mod scatter;
pub mod seeds;
pub mod spatial;
pub mod tilemap;
pub mod world;

pub use error::{Result, TerrainError};

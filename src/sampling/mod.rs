//! Collaborator contracts for randomness, procedural noise and color lookup.
//!
//! Every stage receives these explicitly; nothing in the crate keeps global
//! seed state, so any stage can be replayed with a fixed source.

pub mod procedural;
pub mod palette;
pub mod random;

pub use procedural::{NoiseSource, PerlinNoise};
pub use palette::{ColorSampler, Palette, PaletteParams};
pub use random::RandomSource;

//! Core primitives.
//!
//! Geometry and randomness shared by the game modules.

pub mod vec2;
pub mod rng;

// Re-export core types
pub use vec2::Vec2;
pub use rng::{DeterministicRng, derive_world_seed};

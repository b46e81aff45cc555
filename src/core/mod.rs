//! Core deterministic primitives.
//!
//! All types in this module are designed for perfect cross-platform
//! determinism. They are the numeric foundation every other module builds on.

pub mod fixed;
pub mod hash;
pub mod rng;
pub mod vec2;
pub mod vec3;

// Re-export core types
pub use fixed::{Fixed, FIXED_SCALE};
pub use hash::{compute_world_digest, StateDigest};
pub use rng::DeterministicRng;
pub use vec2::FixedVec2;
pub use vec3::FixedVec3;

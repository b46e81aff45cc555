//! # Lockstep Core
//!
//! Deterministic combat simulation core for lockstep multiplayer: identical
//! input streams produce bit-identical state on every participating machine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LOCKSTEP CORE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Decimal fixed-point arithmetic (1e-6)     │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── vec3.rs     - 3D vector with fixed-point                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State digests for desync detection        │
//! │                                                              │
//! │  sim/            - Simulation machinery (deterministic)      │
//! │  ├── driver.rs   - Fixed-rate tick scheduler + telemetry     │
//! │  ├── input.rs    - Per-frame per-player intent buffering     │
//! │  ├── snapshot.rs - Keyframe capture/restore for rollback     │
//! │  ├── ability.rs  - Ability lifecycle state machine           │
//! │  ├── spatial.rs  - Uniform-grid broad phase                  │
//! │  ├── geometry.rs - Fixed-point narrow-phase tests            │
//! │  └── events.rs   - Pull-based domain event queue             │
//! │                                                              │
//! │  world/          - Reference combat world                    │
//! │  └── arena.rs    - Entities, movement, collision response    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The entire crate is **100% deterministic**:
//! - No floating-point arithmetic in simulation logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies inside the tick path
//! - All randomness from seeded Xorshift128+
//!
//! Given identical inputs and RNG seed, the simulation produces
//! **identical results** on any platform (x86, ARM, WASM).
//!
//! Rendering, input capture, and network transport are external
//! collaborators: they feed [`PlayerIntent`] values in and drain entity
//! state and [`DomainEvent`]s out, but contain no deterministic logic.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod sim;
pub mod world;

// Re-export commonly used types
pub use crate::core::fixed::{Fixed, FIXED_SCALE};
pub use crate::core::hash::StateDigest;
pub use crate::core::rng::DeterministicRng;
pub use crate::core::vec2::FixedVec2;
pub use crate::core::vec3::FixedVec3;
pub use crate::sim::config::SimConfig;
pub use crate::sim::driver::{SimWorld, SimulationDriver};
pub use crate::sim::events::DomainEvent;
pub use crate::sim::input::{FrameInputSet, InputBuffer, PlayerId, PlayerIntent};
pub use crate::sim::snapshot::SnapshotStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default simulation tick rate (Hz)
pub const DEFAULT_TICK_RATE: u32 = 30;

/// One logic frame: a monotonically increasing simulation step counter.
///
/// Incremented by exactly 1 per tick, never skipped, and only ever
/// decremented by an explicit rollback-and-replay.
pub type LogicFrame = u64;

//! Simulation Machinery
//!
//! All deterministic scheduling and gameplay-support systems.
//!
//! ## Module Structure
//!
//! - `config`: validated configuration, ability timing tables
//! - `error`: the crate error taxonomy
//! - `input`: per-frame per-player intent buffering with a delay window
//! - `driver`: fixed-rate tick scheduler, rollback orchestration, telemetry
//! - `snapshot`: keyframe capture/restore store
//! - `ability`: ability lifecycle state machine
//! - `spatial`: uniform-grid broad phase
//! - `geometry`: fixed-point narrow-phase tests
//! - `events`: pull-based domain event queue

pub mod ability;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod snapshot;
pub mod spatial;

// Re-export key types
pub use ability::{AbilityEffect, AbilityId, AbilityPhase, AbilitySlot, AbilityTiming};
pub use config::SimConfig;
pub use driver::{AdvanceOutcome, SimWorld, SimulationDriver, Telemetry};
pub use events::{DomainEvent, DomainEventData, EventQueue};
pub use input::{FrameInputSet, InputBuffer, PlayerId, PlayerIntent};
pub use snapshot::{SnapshotStore, WorldSnapshot};
pub use spatial::{EntityId, SpatialIndex};

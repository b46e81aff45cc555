//! Reference Combat World
//!
//! The gameplay layer the core's traits were cut for: a small arena
//! brawler wiring movement intents, grid collision, abilities, and
//! snapshot encoding together. Serves as the in-crate [`SimWorld`]
//! implementation for integration tests and as a template for real
//! gameplay layers.
//!
//! [`SimWorld`]: crate::sim::driver::SimWorld

pub mod arena;

pub use arena::{ArenaConfig, ArenaWorld, Combatant, BLAST_ABILITY};

//! Simulation Configuration
//!
//! All knobs recognized by the core, constructed and wired by an owning
//! context. Validation happens once, up front: a bad configuration is
//! the only condition this crate treats as fatal to setup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::ability::{AbilityId, AbilityTiming};
use crate::sim::error::ConfigError;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Configuration for the simulation core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Logic tick rate in ticks per second.
    pub tick_rate: u32,

    /// Input delay window in frames: jitter absorbed before a frame
    /// synthesizes no-ops for missing players. Larger windows trade
    /// input latency for stall tolerance.
    pub input_delay_frames: u64,

    /// Snapshot capture cadence in frames.
    pub snapshot_interval: u64,

    /// Snapshots retained before oldest-first eviction.
    pub snapshot_retention: usize,

    /// Maximum logic ticks performed per advance call, bounding
    /// worst-case catch-up work after a stall.
    pub max_catchup_ticks: u32,

    /// Per-ability phase durations for the gameplay layer.
    pub ability_timings: BTreeMap<AbilityId, AbilityTiming>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: crate::DEFAULT_TICK_RATE,
            input_delay_frames: 3,
            snapshot_interval: 30,  // one keyframe per second at 30 Hz
            snapshot_retention: 8,
            max_catchup_ticks: 5,
            ability_timings: BTreeMap::new(),
        }
    }
}

impl SimConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.snapshot_interval == 0 {
            return Err(ConfigError::ZeroSnapshotInterval);
        }
        if self.snapshot_retention == 0 {
            return Err(ConfigError::ZeroRetentionDepth);
        }
        if self.max_catchup_ticks == 0 {
            return Err(ConfigError::ZeroMaxCatchup);
        }
        Ok(())
    }

    /// Duration of one logic tick in nanoseconds, truncating - the tick
    /// grid is defined by this integer, not by the real-valued rate.
    pub fn tick_interval_nanos(&self) -> u64 {
        NANOS_PER_SEC / self.tick_rate as u64
    }

    /// Timing row for an ability, if configured.
    pub fn ability_timing(&self, ability: AbilityId) -> Option<AbilityTiming> {
        self.ability_timings.get(&ability).copied()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_fields_rejected() {
        let mut config = SimConfig::default();
        config.tick_rate = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickRate));

        let mut config = SimConfig::default();
        config.snapshot_interval = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSnapshotInterval));

        let mut config = SimConfig::default();
        config.snapshot_retention = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRetentionDepth));

        let mut config = SimConfig::default();
        config.max_catchup_ticks = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxCatchup));
    }

    #[test]
    fn test_tick_interval() {
        let mut config = SimConfig::default();
        config.tick_rate = 30;
        assert_eq!(config.tick_interval_nanos(), 33_333_333);

        config.tick_rate = 60;
        assert_eq!(config.tick_interval_nanos(), 16_666_666);
    }

    #[test]
    fn test_ability_timing_lookup() {
        let mut config = SimConfig::default();
        let id = AbilityId(3);
        config
            .ability_timings
            .insert(id, AbilityTiming::new(3, 1, 2, 10));

        assert_eq!(config.ability_timing(id), Some(AbilityTiming::new(3, 1, 2, 10)));
        assert_eq!(config.ability_timing(AbilityId(99)), None);
    }
}

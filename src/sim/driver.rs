//! Simulation Driver
//!
//! The top-level scheduler: accumulates wall-clock time, emits logic
//! ticks at a fixed rate, pulls input for the current tick from the
//! [`InputBuffer`], invokes the world update, and captures snapshots on
//! a keyframe cadence.
//!
//! The driver is single-threaded cooperative: `advance` is re-entered
//! periodically by an external real-time loop and holds `&mut self`, so
//! no two logic ticks can ever overlap. Time accounting is integer
//! nanoseconds; the tick grid never touches floating point.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::sim::config::SimConfig;
use crate::sim::error::{ConfigError, InputError, SnapshotError};
use crate::sim::events::{DomainEvent, DomainEventData, EventPriority, EventQueue};
use crate::sim::input::{FrameInputSet, InputBuffer, PlayerId, PlayerIntent};
use crate::sim::snapshot::SnapshotStore;
use crate::LogicFrame;

/// The world-update surface the driver invokes once per logic tick.
///
/// `apply_tick` must be deterministic given identical inputs and
/// identical prior state: same frame, same [`FrameInputSet`], same
/// world bytes in means the same world bytes out, on every platform.
pub trait SimWorld {
    /// Run one deterministic world update.
    fn apply_tick(&mut self, frame: LogicFrame, inputs: &FrameInputSet, events: &mut EventQueue);

    /// Encode the complete world state as an opaque snapshot payload,
    /// sufficient to resume with bit-identical future results.
    fn encode_snapshot(&self) -> Vec<u8>;

    /// Restore the world from a snapshot payload.
    fn restore_snapshot(&mut self, payload: &[u8]) -> Result<(), SnapshotError>;
}

/// Read-only counters exposed for external observability/UI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    ticks_total: u64,
    last_tick_nanos: u64,
    total_tick_nanos: u64,
    stall_count: u64,
    rollback_count: u64,
    catchup_cap_hits: u64,
}

impl Telemetry {
    /// Total logic ticks executed (including re-simulated ones).
    pub fn ticks_total(&self) -> u64 {
        self.ticks_total
    }

    /// Processing duration of the most recent tick, in nanoseconds.
    pub fn last_tick_nanos(&self) -> u64 {
        self.last_tick_nanos
    }

    /// Average per-tick processing duration, in nanoseconds.
    pub fn avg_tick_nanos(&self) -> u64 {
        if self.ticks_total == 0 {
            0
        } else {
            self.total_tick_nanos / self.ticks_total
        }
    }

    /// Advance calls that stalled waiting on input.
    pub fn stall_count(&self) -> u64 {
        self.stall_count
    }

    /// Rollbacks performed.
    pub fn rollback_count(&self) -> u64 {
        self.rollback_count
    }

    /// Advance calls that hit the catch-up cap.
    pub fn catchup_cap_hits(&self) -> u64 {
        self.catchup_cap_hits
    }
}

/// What one `advance` call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Logic ticks executed this call.
    pub ticks_run: u32,
    /// True if the call stopped early waiting on input.
    pub stalled: bool,
    /// True if the catch-up cap cut the call short.
    pub capped: bool,
}

/// Fixed-rate tick scheduler over a [`SimWorld`].
///
/// Constructed and wired by an owning context together with the world -
/// never looked up through globals.
#[derive(Debug)]
pub struct SimulationDriver {
    config: SimConfig,
    tick_interval_nanos: u64,
    accumulator_nanos: u64,
    current_frame: LogicFrame,
    input: InputBuffer,
    snapshots: SnapshotStore,
    events: EventQueue,
    telemetry: Telemetry,
}

impl SimulationDriver {
    /// Create a driver for the given player slots.
    ///
    /// Fails on detectable misconfiguration; this is the only fatal
    /// surface of the core.
    pub fn new(config: SimConfig, players: &[PlayerId]) -> Result<Self, ConfigError> {
        config.validate()?;
        let input = InputBuffer::new(players, config.input_delay_frames)?;
        let snapshots = SnapshotStore::new(config.snapshot_retention)?;
        let tick_interval_nanos = config.tick_interval_nanos();
        Ok(Self {
            config,
            tick_interval_nanos,
            accumulator_nanos: 0,
            current_frame: 0,
            input,
            snapshots,
            events: EventQueue::new(),
            telemetry: Telemetry::default(),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Next frame to be simulated. Frame N has completed exactly when
    /// `current_frame() > N`.
    pub fn current_frame(&self) -> LogicFrame {
        self.current_frame
    }

    /// Read-only telemetry counters.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// The snapshot store (read access for reconciliation layers).
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// The input buffer (read access).
    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Submit one player intent for a future frame.
    ///
    /// Submissions may originate out-of-band (e.g. a network receive
    /// callback) but must be sequenced by the owner relative to
    /// `advance` - this method takes `&mut self` to enforce that no
    /// submission lands mid-consumption.
    pub fn submit_intent(
        &mut self,
        player: PlayerId,
        frame: LogicFrame,
        intent: PlayerIntent,
    ) -> Result<(), InputError> {
        self.input.submit(player, frame, intent)
    }

    /// Drain domain events accumulated since the last drain. Intended
    /// to be called by the presentation collaborator after `advance`
    /// returns, never from inside a tick.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.events.drain()
    }

    /// Advance the simulation by `elapsed` wall-clock time.
    ///
    /// Runs zero or more logic ticks: one per whole tick interval in the
    /// accumulator, capped at `max_catchup_ticks`. When the cap is hit,
    /// the accumulator keeps its remainder modulo the tick interval -
    /// folding the excess back instead of zeroing avoids systematic
    /// timing drift. A frame whose input is not ready stalls the rest of
    /// the call; the accumulated debt is clamped to the catch-up window
    /// so an outage cannot demand unbounded work later.
    pub fn advance<W: SimWorld>(&mut self, world: &mut W, elapsed: Duration) -> AdvanceOutcome {
        self.accumulator_nanos = self
            .accumulator_nanos
            .saturating_add(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));

        let mut outcome = AdvanceOutcome::default();
        let interval = self.tick_interval_nanos;

        while self.accumulator_nanos >= interval {
            if outcome.ticks_run >= self.config.max_catchup_ticks {
                self.accumulator_nanos %= interval;
                self.telemetry.catchup_cap_hits += 1;
                outcome.capped = true;
                warn!(
                    frame = self.current_frame,
                    cap = self.config.max_catchup_ticks,
                    "catch-up cap hit, excess time folded back"
                );
                break;
            }

            if !self.input.is_ready(self.current_frame) {
                self.telemetry.stall_count += 1;
                outcome.stalled = true;
                trace!(frame = self.current_frame, "stalled waiting for input");

                let window = interval * self.config.max_catchup_ticks as u64;
                if self.accumulator_nanos > window {
                    self.accumulator_nanos = window;
                }
                break;
            }

            self.accumulator_nanos -= interval;
            if self.step(world) {
                outcome.ticks_run += 1;
            } else {
                outcome.stalled = true;
                break;
            }
        }

        outcome
    }

    /// Execute exactly one logic tick. Returns false if input was not
    /// consumable after all (treated as a stall, never a crash).
    fn step<W: SimWorld>(&mut self, world: &mut W) -> bool {
        let frame = self.current_frame;
        let set = match self.input.consume(frame) {
            Ok(set) => set,
            Err(err) => {
                debug!(frame, %err, "tick aborted, input not consumable");
                self.telemetry.stall_count += 1;
                return false;
            }
        };

        self.run_world_tick(world, frame, &set);
        true
    }

    /// Shared tail of live and re-simulated ticks: world update, frame
    /// increment, keyframe capture, telemetry.
    fn run_world_tick<W: SimWorld>(
        &mut self,
        world: &mut W,
        frame: LogicFrame,
        set: &FrameInputSet,
    ) {
        for &player in &set.synthesized {
            self.events.push(DomainEvent::new(
                frame,
                EventPriority::Other,
                DomainEventData::IntentSynthesized { player },
            ));
        }

        let started = Instant::now();
        world.apply_tick(frame, set, &mut self.events);
        let nanos = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

        self.telemetry.last_tick_nanos = nanos;
        self.telemetry.total_tick_nanos = self.telemetry.total_tick_nanos.saturating_add(nanos);
        self.telemetry.ticks_total += 1;
        self.current_frame = frame + 1;

        if frame % self.config.snapshot_interval == 0 {
            self.snapshots.capture(frame, world.encode_snapshot());
            if let Some(earliest) = self.snapshots.earliest() {
                self.input.prune(earliest);
            }
        }
    }

    /// Roll back to the closest snapshot at or before `frame`.
    ///
    /// Restores world state, rewinds the frame counter to resume at the
    /// frame after the snapshot, and discards queued events from the
    /// rolled-back range. Returns the frame actually restored (it may be
    /// earlier than requested). Re-simulation is a separate step; see
    /// [`SimulationDriver::resimulate_to`].
    pub fn rollback<W: SimWorld>(
        &mut self,
        world: &mut W,
        frame: LogicFrame,
    ) -> Result<LogicFrame, SnapshotError> {
        let snap = self.snapshots.restore(frame)?;
        world.restore_snapshot(&snap.payload)?;
        let restored = snap.frame;

        self.current_frame = restored + 1;
        self.events.discard_from(restored + 1);
        self.telemetry.rollback_count += 1;
        warn!(requested = frame, restored, "rolled back");
        Ok(restored)
    }

    /// Deterministically re-simulate buffered frames up to (excluding)
    /// `target`, without consuming wall-clock time.
    ///
    /// Already-consumed frames replay their retained input sets
    /// byte-identically; once the replay range is exhausted, ready
    /// frames are consumed live. Stops early if input runs out. Returns
    /// the number of frames executed.
    pub fn resimulate_to<W: SimWorld>(&mut self, world: &mut W, target: LogicFrame) -> u64 {
        let mut executed = 0;
        while self.current_frame < target {
            let frame = self.current_frame;
            if frame < self.input.cursor() {
                let set = match self.input.replay(frame) {
                    Ok(set) => set.clone(),
                    Err(_) => break, // pruned past the rollback horizon
                };
                self.run_world_tick(world, frame, &set);
            } else if self.input.is_ready(frame) {
                if !self.step(world) {
                    break;
                }
            } else {
                break;
            }
            executed += 1;
        }
        executed
    }
}

// =============================================================================
// TESTS
// =============================================================================

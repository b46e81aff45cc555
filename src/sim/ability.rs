//! Ability Lifecycle State Machine
//!
//! Per-entity controller for one active ability slot, ticked once per
//! logic frame:
//!
//! ```text
//! Idle -> Casting -> Executing -> Recovery -> Cooldown -> Idle
//! ```
//!
//! Each non-Idle phase has a configured duration in logic frames; the
//! machine only tracks timing and legality. The game effect itself is
//! applied exactly once, on entry into `Executing`, through an externally
//! supplied [`AbilityEffect`] strategy keyed by ability identity - the
//! machine never computes game effects.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::sim::error::AbilityError;
use crate::sim::events::{DomainEvent, EventQueue};
use crate::sim::spatial::EntityId;
use crate::LogicFrame;

/// Ability identifier, indexing the timing table and effect dispatch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AbilityId(pub u16);

/// Lifecycle phase of an ability slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityPhase {
    /// Activatable.
    #[default]
    Idle,
    /// Wind-up before the effect.
    Casting,
    /// The effect fires on entry into this phase.
    Executing,
    /// Post-effect lockout.
    Recovery,
    /// Counting down until the next activation is legal.
    Cooldown,
}

/// Per-phase durations for one ability, in logic frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityTiming {
    /// Casting duration.
    pub cast_frames: u32,
    /// Executing duration.
    pub execute_frames: u32,
    /// Recovery duration.
    pub recovery_frames: u32,
    /// Cooldown duration.
    pub cooldown_frames: u32,
}

impl AbilityTiming {
    /// Convenience constructor in phase order.
    pub const fn new(cast: u32, execute: u32, recovery: u32, cooldown: u32) -> Self {
        Self {
            cast_frames: cast,
            execute_frames: execute,
            recovery_frames: recovery,
            cooldown_frames: cooldown,
        }
    }
}

/// Effect strategy invoked exactly once per activation cycle, at the
/// instant the slot enters `Executing`. Implementations dispatch on
/// `ability` and apply whatever the effect means in their world.
pub trait AbilityEffect {
    /// Apply the ability's effect.
    fn execute(
        &mut self,
        frame: LogicFrame,
        entity: EntityId,
        ability: AbilityId,
        target: Option<EntityId>,
    );
}

/// One entity's ability slot: lifecycle phase, entry frame, and frames
/// remaining in the current phase (cooldown-remaining while in
/// `Cooldown`). Mutated only by [`AbilitySlot::tick`] and
/// [`AbilitySlot::try_activate`]; destroyed with its owning entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    /// Owning entity.
    pub entity: EntityId,

    /// Which ability occupies this slot.
    pub ability: AbilityId,

    /// Phase durations.
    pub timing: AbilityTiming,

    /// Current lifecycle phase.
    phase: AbilityPhase,

    /// Frame the current phase was entered.
    phase_entered: LogicFrame,

    /// Frames remaining in the current phase.
    frames_remaining: u32,

    /// Target captured at activation, handed to the effect.
    target: Option<EntityId>,
}

impl AbilitySlot {
    /// Create an idle slot.
    pub fn new(entity: EntityId, ability: AbilityId, timing: AbilityTiming) -> Self {
        Self {
            entity,
            ability,
            timing,
            phase: AbilityPhase::Idle,
            phase_entered: 0,
            frames_remaining: 0,
            target: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AbilityPhase {
        self.phase
    }

    /// Frame the current phase was entered.
    pub fn phase_entered(&self) -> LogicFrame {
        self.phase_entered
    }

    /// Frames remaining in the current phase (cooldown-remaining while
    /// in `Cooldown`).
    pub fn frames_remaining(&self) -> u32 {
        self.frames_remaining
    }

    /// True if an activation request would be legal right now.
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, AbilityPhase::Idle)
            || (matches!(self.phase, AbilityPhase::Cooldown) && self.frames_remaining == 0)
    }

    /// Request activation.
    ///
    /// Legal from `Idle`, and from `Cooldown` with zero frames remaining
    /// (the countdown exhausted on the previous tick but the slot has
    /// not yet rolled over to `Idle`). Any mid-cycle phase fails with
    /// [`AbilityError::AlreadyActive`]; a counting cooldown fails with
    /// [`AbilityError::NotReady`]. A rejected request leaves the slot
    /// untouched.
    pub fn try_activate(
        &mut self,
        frame: LogicFrame,
        target: Option<EntityId>,
        events: &mut EventQueue,
    ) -> Result<(), AbilityError> {
        match self.phase {
            AbilityPhase::Idle => {}
            AbilityPhase::Cooldown if self.frames_remaining == 0 => {}
            AbilityPhase::Cooldown => {
                return Err(AbilityError::NotReady {
                    remaining_frames: self.frames_remaining,
                });
            }
            phase => return Err(AbilityError::AlreadyActive { phase }),
        }

        self.target = target;
        self.enter(AbilityPhase::Casting, frame, self.timing.cast_frames);
        trace!(entity = ?self.entity, ability = ?self.ability, frame, "ability activated");
        events.push(DomainEvent::ability_activated(frame, self.entity, self.ability));
        Ok(())
    }

    /// Advance the slot by one logic frame.
    ///
    /// Transitions fire once the phase duration has elapsed; zero-length
    /// phases cascade within a single tick, so a cast of 0 frames
    /// executes on the activation tick itself.
    pub fn tick(
        &mut self,
        frame: LogicFrame,
        effect: &mut dyn AbilityEffect,
        events: &mut EventQueue,
    ) {
        loop {
            match self.phase {
                AbilityPhase::Idle => return,
                AbilityPhase::Cooldown => {
                    if self.frames_remaining == 0 {
                        self.enter(AbilityPhase::Idle, frame, 0);
                        return;
                    }
                    self.frames_remaining -= 1;
                    if self.frames_remaining == 0 {
                        events.push(DomainEvent::ability_ready(frame, self.entity, self.ability));
                    }
                    return;
                }
                AbilityPhase::Casting | AbilityPhase::Executing | AbilityPhase::Recovery => {
                    if self.frames_remaining == 0 {
                        self.advance(frame, effect, events);
                        continue;
                    }
                    self.frames_remaining -= 1;
                    return;
                }
            }
        }
    }

    /// Move to the next phase in the cycle.
    fn advance(
        &mut self,
        frame: LogicFrame,
        effect: &mut dyn AbilityEffect,
        events: &mut EventQueue,
    ) {
        match self.phase {
            AbilityPhase::Casting => {
                self.enter(AbilityPhase::Executing, frame, self.timing.execute_frames);
                // Exactly-once effect application, at entry into Executing
                effect.execute(frame, self.entity, self.ability, self.target);
                events.push(DomainEvent::ability_executed(frame, self.entity, self.ability));
            }
            AbilityPhase::Executing => {
                self.enter(AbilityPhase::Recovery, frame, self.timing.recovery_frames);
            }
            AbilityPhase::Recovery => {
                self.target = None;
                self.enter(AbilityPhase::Cooldown, frame, self.timing.cooldown_frames);
                if self.timing.cooldown_frames == 0 {
                    events.push(DomainEvent::ability_ready(frame, self.entity, self.ability));
                }
            }
            AbilityPhase::Idle | AbilityPhase::Cooldown => unreachable!("advance from timed phases only"),
        }
    }

    fn enter(&mut self, phase: AbilityPhase, frame: LogicFrame, duration: u32) {
        self.phase = phase;
        self.phase_entered = frame;
        self.frames_remaining = duration;
    }
}

// =============================================================================
// TESTS
// =============================================================================

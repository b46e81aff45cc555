//! Domain Events
//!
//! Pull-based event surface between the deterministic core and its
//! presentation collaborators. Entity logic appends events during a tick;
//! the outside world drains the queue after the tick completes. No
//! observer callbacks ever re-enter the core mid-tick.

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::sim::ability::AbilityId;
use crate::sim::input::PlayerId;
use crate::sim::spatial::EntityId;
use crate::LogicFrame;

/// Priority for event ordering within a frame.
///
/// Lower value = ordered first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Eliminations order first
    Elimination = 0,
    /// Then damage
    Damage = 1,
    /// Then collisions
    Collision = 2,
    /// Then ability lifecycle
    Ability = 3,
    /// Lowest priority
    Other = 255,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEventData {
    /// An entity started casting an ability.
    AbilityActivated {
        /// Casting entity.
        entity: EntityId,
        /// Which ability.
        ability: AbilityId,
    },

    /// An ability's effect fired (entry into the Executing phase).
    AbilityExecuted {
        /// Executing entity.
        entity: EntityId,
        /// Which ability.
        ability: AbilityId,
    },

    /// An ability finished its cooldown and is activatable again.
    AbilityReady {
        /// Owning entity.
        entity: EntityId,
        /// Which ability.
        ability: AbilityId,
    },

    /// Two entities came into contact this frame.
    CollisionDetected {
        /// Lower entity id of the pair.
        first: EntityId,
        /// Higher entity id of the pair.
        second: EntityId,
        /// Penetration depth at detection.
        penetration: Fixed,
    },

    /// An entity took damage.
    DamageTaken {
        /// Damaged entity.
        entity: EntityId,
        /// Damage amount.
        amount: Fixed,
        /// Remaining health after the damage.
        remaining_health: Fixed,
        /// Source entity, if attributable.
        source: Option<EntityId>,
    },

    /// An entity dropped to zero health and left play.
    EntityEliminated {
        /// Eliminated entity.
        entity: EntityId,
        /// Position at elimination.
        position: FixedVec2,
        /// Killer, if attributable.
        eliminated_by: Option<EntityId>,
    },

    /// A player slot had a no-op intent synthesized for a late frame.
    IntentSynthesized {
        /// The late player.
        player: PlayerId,
    },
}

/// A domain event with frame stamp and ordering priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Frame the event occurred in.
    pub frame: LogicFrame,

    /// Ordering priority within the frame.
    pub priority: EventPriority,

    /// Event payload.
    pub data: DomainEventData,
}

impl DomainEvent {
    /// Create a new event with an explicit priority.
    pub fn new(frame: LogicFrame, priority: EventPriority, data: DomainEventData) -> Self {
        Self {
            frame,
            priority,
            data,
        }
    }

    /// Ability activation event.
    pub fn ability_activated(frame: LogicFrame, entity: EntityId, ability: AbilityId) -> Self {
        Self::new(
            frame,
            EventPriority::Ability,
            DomainEventData::AbilityActivated { entity, ability },
        )
    }

    /// Ability execution event.
    pub fn ability_executed(frame: LogicFrame, entity: EntityId, ability: AbilityId) -> Self {
        Self::new(
            frame,
            EventPriority::Ability,
            DomainEventData::AbilityExecuted { entity, ability },
        )
    }

    /// Ability ready event.
    pub fn ability_ready(frame: LogicFrame, entity: EntityId, ability: AbilityId) -> Self {
        Self::new(
            frame,
            EventPriority::Ability,
            DomainEventData::AbilityReady { entity, ability },
        )
    }

    /// Collision event. Stores the pair in (low, high) id order so the
    /// same contact always produces the same event bytes.
    pub fn collision(
        frame: LogicFrame,
        a: EntityId,
        b: EntityId,
        penetration: Fixed,
    ) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self::new(
            frame,
            EventPriority::Collision,
            DomainEventData::CollisionDetected {
                first,
                second,
                penetration,
            },
        )
    }

    /// Damage event.
    pub fn damage_taken(
        frame: LogicFrame,
        entity: EntityId,
        amount: Fixed,
        remaining_health: Fixed,
        source: Option<EntityId>,
    ) -> Self {
        Self::new(
            frame,
            EventPriority::Damage,
            DomainEventData::DamageTaken {
                entity,
                amount,
                remaining_health,
                source,
            },
        )
    }

    /// Elimination event.
    pub fn entity_eliminated(
        frame: LogicFrame,
        entity: EntityId,
        position: FixedVec2,
        eliminated_by: Option<EntityId>,
    ) -> Self {
        Self::new(
            frame,
            EventPriority::Elimination,
            DomainEventData::EntityEliminated {
                entity,
                position,
                eliminated_by,
            },
        )
    }
}

/// Append-only event queue drained by the presentation layer.
///
/// Events accumulate across ticks until drained; draining after every
/// advance call is the expected cadence.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    events: Vec<DomainEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    #[inline]
    pub fn push(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    /// Number of undrained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take all pending events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read pending events without consuming them.
    pub fn peek(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Drop events from a rolled-back frame range. Called on rollback so
    /// re-simulated frames do not double-report.
    pub fn discard_from(&mut self, frame: LogicFrame) {
        self.events.retain(|e| e.frame < frame);
    }
}

// =============================================================================
// TESTS
// =============================================================================

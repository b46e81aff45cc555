//! Arena Combat World
//!
//! Entities move from player intents, collide through the grid broad
//! phase plus exact contact tests, and fight with one blast ability per
//! combatant. The whole world round-trips through bincode snapshots and
//! hashes to a digest for desync comparison.
//!
//! Everything here is deterministic: BTreeMap iteration, fixed-point
//! math, seeded RNG, and collect-then-apply mutation so no entity update
//! ever observes a half-applied tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::fixed::Fixed;
use crate::core::hash::{compute_world_digest, StateDigest};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::sim::ability::{AbilityEffect, AbilityId, AbilitySlot, AbilityTiming};
use crate::sim::config::SimConfig;
use crate::sim::driver::SimWorld;
use crate::sim::error::{NumericError, SnapshotError};
use crate::sim::events::{DomainEvent, EventQueue};
use crate::sim::geometry::{circle_circle_contact, Circle};
use crate::sim::input::{FrameInputSet, PlayerId};
use crate::sim::spatial::{EntityId, SpatialIndex};
use crate::LogicFrame;

/// The ability every combatant carries: a radial blast.
pub const BLAST_ABILITY: AbilityId = AbilityId(0);

/// Fallback blast timing when the session config has no row for it.
const DEFAULT_BLAST_TIMING: AbilityTiming = AbilityTiming::new(3, 1, 2, 10);

/// Static arena parameters, shared by all peers out-of-band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Arena half-extents; positions are clamped inside.
    pub half_extents: FixedVec2,
    /// Spatial grid cell size.
    pub cell_size: Fixed,
    /// Movement speed in units per second.
    pub move_speed: Fixed,
    /// Combatant collision radius.
    pub entity_radius: Fixed,
    /// Starting and maximum health.
    pub max_health: Fixed,
    /// Damage dealt to both parties per contact frame.
    pub contact_damage: Fixed,
    /// Blast ability effect radius.
    pub blast_radius: Fixed,
    /// Blast ability damage.
    pub blast_damage: Fixed,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extents: FixedVec2::from_ints(50, 50),
            cell_size: Fixed::from_int(4),
            move_speed: Fixed::from_int(5),
            entity_radius: Fixed::from_parts(0, 500_000),
            max_health: Fixed::from_int(100),
            contact_damage: Fixed::from_parts(0, 250_000),
            blast_radius: Fixed::from_int(6),
            blast_damage: Fixed::from_int(25),
        }
    }
}

/// One fighting entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Entity identifier.
    pub id: EntityId,
    /// Controlling player slot.
    pub player: PlayerId,
    /// Current position.
    pub position: FixedVec2,
    /// Current velocity.
    pub velocity: FixedVec2,
    /// Collision radius.
    pub radius: Fixed,
    /// Current health.
    pub health: Fixed,
    /// Maximum health.
    pub max_health: Fixed,
    /// Still in play?
    pub alive: bool,
    /// The blast ability slot.
    pub ability: AbilitySlot,
}

/// The serialized portion of the world: everything a peer needs to
/// resume bit-identically. Static config stays out - it is wiring, not
/// state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct ArenaState {
    frame: LogicFrame,
    rng: DeterministicRng,
    combatants: BTreeMap<EntityId, Combatant>,
    controls: BTreeMap<PlayerId, EntityId>,
    next_entity: u32,
}

/// Records ability executions during the slot-tick pass; the world
/// applies them afterwards so effect resolution never aliases the
/// combatant iteration.
#[derive(Default)]
struct PendingBlasts {
    executed: Vec<(LogicFrame, EntityId, AbilityId, Option<EntityId>)>,
}

impl AbilityEffect for PendingBlasts {
    fn execute(
        &mut self,
        frame: LogicFrame,
        entity: EntityId,
        ability: AbilityId,
        target: Option<EntityId>,
    ) {
        self.executed.push((frame, entity, ability, target));
    }
}

/// The arena world. Implements [`SimWorld`] for the driver.
#[derive(Clone, Debug)]
pub struct ArenaWorld {
    config: ArenaConfig,
    blast_timing: AbilityTiming,
    /// Seconds per tick as Fixed, derived once from the session config.
    tick_dt: Fixed,
    state: ArenaState,
    /// Derived index over combatant positions; rebuilt on restore.
    grid: SpatialIndex,
}

impl ArenaWorld {
    /// Create an empty arena.
    ///
    /// Panics only on non-positive `cell_size` or zero tick rate, both
    /// of which [`SimConfig::validate`] rejects first in any wired
    /// setup.
    pub fn new(sim: &SimConfig, config: ArenaConfig, seed: u64) -> Self {
        let grid = match SpatialIndex::new(config.cell_size) {
            Ok(grid) => grid,
            Err(err) => panic!("arena misconfigured: {err}"),
        };
        let tick_dt = match Fixed::from_fraction(1, sim.tick_rate as i64) {
            Ok(dt) => dt,
            Err(err) => panic!("arena misconfigured: {err}"),
        };
        let blast_timing = sim
            .ability_timing(BLAST_ABILITY)
            .unwrap_or(DEFAULT_BLAST_TIMING);

        Self {
            config,
            blast_timing,
            tick_dt,
            state: ArenaState {
                frame: 0,
                rng: DeterministicRng::new(seed),
                combatants: BTreeMap::new(),
                controls: BTreeMap::new(),
                next_entity: 0,
            },
            grid,
        }
    }

    /// Spawn a combatant controlled by `player` at a seeded-random
    /// position.
    pub fn spawn_player(&mut self, player: PlayerId) -> EntityId {
        let position = self.state.rng.next_position(self.config.half_extents);
        self.spawn_player_at(player, position)
    }

    /// Spawn a combatant controlled by `player` at a fixed position.
    pub fn spawn_player_at(&mut self, player: PlayerId, position: FixedVec2) -> EntityId {
        let id = EntityId(self.state.next_entity);
        self.state.next_entity += 1;

        let combatant = Combatant {
            id,
            player,
            position,
            velocity: FixedVec2::ZERO,
            radius: self.config.entity_radius,
            health: self.config.max_health,
            max_health: self.config.max_health,
            alive: true,
            ability: AbilitySlot::new(id, BLAST_ABILITY, self.blast_timing),
        };
        self.state.combatants.insert(id, combatant);
        self.state.controls.insert(player, id);
        self.grid.insert(id, position);
        id
    }

    /// Look up a combatant.
    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.state.combatants.get(&id)
    }

    /// The entity a player controls.
    pub fn entity_of(&self, player: PlayerId) -> Option<EntityId> {
        self.state.controls.get(&player).copied()
    }

    /// All combatants in id order.
    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.state.combatants.values()
    }

    /// Frames simulated so far.
    pub fn frame(&self) -> LogicFrame {
        self.state.frame
    }

    /// Digest of the full world state for desync comparison.
    pub fn state_digest(&self) -> StateDigest {
        compute_world_digest(self.state.frame, |h| {
            for state_word in self.state.rng.state() {
                h.update_u64(state_word);
            }
            for c in self.state.combatants.values() {
                h.update_u32(c.id.0);
                h.update_u8(c.player.0);
                h.update_vec2(c.position);
                h.update_vec2(c.velocity);
                h.update_fixed(c.health);
                h.update_bool(c.alive);
                h.update_u8(c.ability.phase() as u8);
                h.update_u32(c.ability.frames_remaining());
            }
        })
    }

    /// The deterministic tick body. Phase order is fixed; every loop
    /// iterates a BTreeMap.
    fn run_tick(
        &mut self,
        frame: LogicFrame,
        inputs: &FrameInputSet,
        events: &mut EventQueue,
    ) -> Result<(), NumericError> {
        self.state.frame = frame;

        // 1. Apply player intents
        self.apply_intents(frame, inputs, events)?;

        // 2. Integrate movement
        self.integrate(frame)?;

        // 3. Resolve contacts (broad phase -> narrow phase -> response)
        self.resolve_contacts(frame, events)?;

        // 4. Tick ability slots, collecting executions
        let mut blasts = PendingBlasts::default();
        for combatant in self.state.combatants.values_mut() {
            if combatant.alive {
                combatant.ability.tick(frame, &mut blasts, events);
            }
        }

        // 5. Apply collected blast effects
        for (frame, caster, _ability, target) in blasts.executed {
            self.apply_blast(frame, caster, target, events)?;
        }

        // 6. Remove eliminated combatants from the index
        self.bury_eliminated(frame, events);

        Ok(())
    }

    fn apply_intents(
        &mut self,
        frame: LogicFrame,
        inputs: &FrameInputSet,
        events: &mut EventQueue,
    ) -> Result<(), NumericError> {
        for (player, intent) in &inputs.intents {
            let Some(&entity) = self.state.controls.get(player) else {
                continue;
            };
            let Some(combatant) = self.state.combatants.get_mut(&entity) else {
                continue;
            };
            if !combatant.alive {
                continue;
            }

            // Movement: normalize diagonals so they are no faster than
            // cardinal moves, scale partial deflections linearly
            let move_dir = intent.move_direction();
            let len_sq = move_dir.length_squared()?;
            combatant.velocity = if len_sq > Fixed::ONE {
                move_dir.normalize()?.scale(self.config.move_speed)?
            } else if len_sq > Fixed::ZERO {
                move_dir.scale(self.config.move_speed)?
            } else {
                FixedVec2::ZERO
            };

            if intent.ability_pressed() {
                // An illegal activation is caller misuse: rejected,
                // logged, and the tick continues untouched
                if let Err(err) = combatant.ability.try_activate(frame, intent.target, events) {
                    debug!(?player, frame, %err, "ability activation rejected");
                }
            }
        }
        Ok(())
    }

    fn integrate(&mut self, _frame: LogicFrame) -> Result<(), NumericError> {
        let half = self.config.half_extents;
        for combatant in self.state.combatants.values_mut() {
            if !combatant.alive {
                continue;
            }
            let delta = combatant.velocity.scale(self.tick_dt)?;
            let moved = combatant.position + delta;
            combatant.position = FixedVec2::new(
                moved.x.clamp(-half.x, half.x),
                moved.y.clamp(-half.y, half.y),
            );
            self.grid.update(combatant.id, combatant.position);
        }
        Ok(())
    }

    fn resolve_contacts(
        &mut self,
        frame: LogicFrame,
        events: &mut EventQueue,
    ) -> Result<(), NumericError> {
        // Broad phase: unique unordered candidate pairs in sorted order
        let candidates = self.grid.candidate_pairs();

        // Narrow phase over immutable state
        let mut contacts = Vec::new();
        for (a, b) in candidates {
            let (Some(ca), Some(cb)) =
                (self.state.combatants.get(&a), self.state.combatants.get(&b))
            else {
                continue;
            };
            if !ca.alive || !cb.alive {
                continue;
            }
            let circle_a = Circle::new(ca.position, ca.radius);
            let circle_b = Circle::new(cb.position, cb.radius);
            if let Some(contact) = circle_circle_contact(&circle_a, &circle_b)? {
                contacts.push((a, b, contact));
            }
        }

        // Response: positional separation plus symmetric contact damage
        let half = self.config.half_extents;
        let two = Fixed::from_int(2);
        for (a, b, contact) in contacts {
            events.push(DomainEvent::collision(frame, a, b, contact.penetration));

            let push = contact.normal.scale(contact.penetration.checked_div(two)?)?;
            let damage = self.config.contact_damage;

            for (id, other, direction) in [(a, b, -Fixed::ONE), (b, a, Fixed::ONE)] {
                if let Some(c) = self.state.combatants.get_mut(&id) {
                    let shifted = c.position + push.scale(direction)?;
                    c.position = FixedVec2::new(
                        shifted.x.clamp(-half.x, half.x),
                        shifted.y.clamp(-half.y, half.y),
                    );
                    c.health = (c.health - damage).max(Fixed::ZERO);
                    self.grid.update(id, c.position);
                    events.push(DomainEvent::damage_taken(
                        frame,
                        id,
                        damage,
                        c.health,
                        Some(other),
                    ));
                }
            }
        }
        Ok(())
    }

    fn apply_blast(
        &mut self,
        frame: LogicFrame,
        caster: EntityId,
        target: Option<EntityId>,
        events: &mut EventQueue,
    ) -> Result<(), NumericError> {
        // Center on a valid living target, otherwise on the caster
        let center = target
            .and_then(|t| self.state.combatants.get(&t))
            .filter(|c| c.alive)
            .map(|c| c.position)
            .or_else(|| self.state.combatants.get(&caster).map(|c| c.position));
        let Some(center) = center else {
            return Ok(());
        };

        let radius = self.config.blast_radius;
        let blast = Circle::new(center, radius);
        let region = crate::sim::geometry::Aabb::new(center, FixedVec2::new(radius, radius));

        // Broad phase narrows the victim set; exact circle test decides
        for id in self.grid.query(region) {
            if id == caster {
                continue;
            }
            let Some(victim) = self.state.combatants.get_mut(&id) else {
                continue;
            };
            if !victim.alive {
                continue;
            }
            let hit = crate::sim::geometry::circle_circle_intersects(
                &blast,
                &Circle::new(victim.position, victim.radius),
            )?;
            if hit {
                victim.health = (victim.health - self.config.blast_damage).max(Fixed::ZERO);
                events.push(DomainEvent::damage_taken(
                    frame,
                    id,
                    self.config.blast_damage,
                    victim.health,
                    Some(caster),
                ));
            }
        }
        Ok(())
    }

    fn bury_eliminated(&mut self, frame: LogicFrame, events: &mut EventQueue) {
        let mut eliminated = Vec::new();
        for (id, combatant) in &self.state.combatants {
            if combatant.alive && combatant.health <= Fixed::ZERO {
                eliminated.push((*id, combatant.position));
            }
        }
        for (id, position) in eliminated {
            if let Some(combatant) = self.state.combatants.get_mut(&id) {
                combatant.alive = false;
                combatant.velocity = FixedVec2::ZERO;
            }
            self.grid.remove(id);
            events.push(DomainEvent::entity_eliminated(frame, id, position, None));
        }
    }

    fn rebuild_grid(&mut self) {
        let mut grid = match SpatialIndex::new(self.config.cell_size) {
            Ok(grid) => grid,
            Err(err) => panic!("arena misconfigured: {err}"),
        };
        for combatant in self.state.combatants.values() {
            if combatant.alive {
                grid.insert(combatant.id, combatant.position);
            }
        }
        self.grid = grid;
    }
}

impl SimWorld for ArenaWorld {
    fn apply_tick(&mut self, frame: LogicFrame, inputs: &FrameInputSet, events: &mut EventQueue) {
        if let Err(err) = self.run_tick(frame, inputs, events) {
            // Positions are clamped and speeds bounded, so a numeric
            // fault means the invariants were broken upstream. Failing
            // loudly beats silently desyncing peers.
            panic!("numeric fault during tick {frame}: {err}");
        }
    }

    fn encode_snapshot(&self) -> Vec<u8> {
        match bincode::serialize(&self.state) {
            Ok(bytes) => bytes,
            Err(err) => panic!("arena state must serialize: {err}"),
        }
    }

    fn restore_snapshot(&mut self, payload: &[u8]) -> Result<(), SnapshotError> {
        let state: ArenaState = bincode::deserialize(payload)
            .map_err(|err| SnapshotError::PayloadDecode(err.to_string()))?;
        self.state = state;
        self.rebuild_grid();
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::DomainEventData;
    use crate::sim::input::PlayerIntent;
    use std::collections::BTreeSet;

    fn arena_with_players(n: u8, seed: u64) -> ArenaWorld {
        let mut world = ArenaWorld::new(&SimConfig::default(), ArenaConfig::default(), seed);
        for p in 0..n {
            world.spawn_player(PlayerId(p));
        }
        world
    }

    fn input_set(frame: LogicFrame, intents: &[(PlayerId, PlayerIntent)]) -> FrameInputSet {
        FrameInputSet {
            frame,
            intents: intents.iter().copied().collect(),
            synthesized: BTreeSet::new(),
        }
    }

    #[test]
    fn test_spawn_positions_deterministic() {
        let w1 = arena_with_players(4, 99);
        let w2 = arena_with_players(4, 99);
        assert_eq!(w1.state_digest(), w2.state_digest());

        let w3 = arena_with_players(4, 100);
        assert_ne!(w1.state_digest(), w3.state_digest());
    }

    #[test]
    fn test_movement_integration() {
        let mut world = arena_with_players(0, 1);
        let p = PlayerId(0);
        let id = world.spawn_player_at(p, FixedVec2::ZERO);
        let mut events = EventQueue::new();

        // Full right deflection at 5 units/sec, 30 Hz
        let set = input_set(0, &[(p, PlayerIntent::with_movement(127, 0))]);
        world.apply_tick(0, &set, &mut events);

        let c = world.combatant(id).unwrap();
        assert!(c.position.x > Fixed::ZERO);
        assert_eq!(c.position.y, Fixed::ZERO);

        // One tick of 5.0/30 movement
        let expected = Fixed::from_int(5) * Fixed::from_fraction(1, 30).unwrap();
        assert_eq!(c.position.x, expected);
    }

    #[test]
    fn test_diagonal_not_faster() {
        let mut world = arena_with_players(0, 1);
        let p = PlayerId(0);
        let id = world.spawn_player_at(p, FixedVec2::ZERO);
        let mut events = EventQueue::new();

        let set = input_set(0, &[(p, PlayerIntent::with_movement(127, 127))]);
        world.apply_tick(0, &set, &mut events);

        let c = world.combatant(id).unwrap();
        let speed_per_tick = Fixed::from_int(5) * Fixed::from_fraction(1, 30).unwrap();
        let moved_sq = c.position.length_squared().unwrap();
        let max_sq = speed_per_tick * speed_per_tick;
        // Allow sqrt approximation slack of ~0.1%
        let slack = max_sq / Fixed::from_int(1000);
        assert!(
            moved_sq <= max_sq + slack,
            "diagonal moved {:?} exceeds cap {:?}",
            moved_sq,
            max_sq
        );
    }

    #[test]
    fn test_positions_clamped_to_arena() {
        let mut world = arena_with_players(0, 1);
        let p = PlayerId(0);
        let half = ArenaConfig::default().half_extents;
        let id = world.spawn_player_at(p, FixedVec2::new(half.x, Fixed::ZERO));
        let mut events = EventQueue::new();

        for frame in 0..30 {
            let set = input_set(frame, &[(p, PlayerIntent::with_movement(127, 0))]);
            world.apply_tick(frame, &set, &mut events);
        }

        let c = world.combatant(id).unwrap();
        assert_eq!(c.position.x, half.x);
    }

    #[test]
    fn test_contact_separates_and_damages() {
        let mut world = arena_with_players(0, 1);
        let pa = PlayerId(0);
        let pb = PlayerId(1);
        // Overlapping spawns (radius 0.5 each, distance 0.4)
        let a = world.spawn_player_at(pa, FixedVec2::ZERO);
        let b = world.spawn_player_at(pb, FixedVec2::new(Fixed::from_parts(0, 400_000), Fixed::ZERO));
        let mut events = EventQueue::new();

        let set = input_set(0, &[(pa, PlayerIntent::no_op()), (pb, PlayerIntent::no_op())]);
        world.apply_tick(0, &set, &mut events);

        let drained = events.drain();
        assert!(drained
            .iter()
            .any(|e| matches!(e.data, DomainEventData::CollisionDetected { .. })));
        assert!(drained
            .iter()
            .any(|e| matches!(e.data, DomainEventData::DamageTaken { .. })));

        // Pushed apart along the contact normal
        let ca = world.combatant(a).unwrap();
        let cb = world.combatant(b).unwrap();
        assert!(cb.position.x > ca.position.x);
        let gap = cb.position.x - ca.position.x;
        assert!(gap > Fixed::from_parts(0, 400_000));

        // Both took contact damage
        assert!(ca.health < ca.max_health);
        assert!(cb.health < cb.max_health);
    }

    #[test]
    fn test_blast_damages_in_radius_only() {
        let mut world = arena_with_players(0, 1);
        let caster = PlayerId(0);
        let near = PlayerId(1);
        let far = PlayerId(2);
        world.spawn_player_at(caster, FixedVec2::ZERO);
        let near_id = world.spawn_player_at(near, FixedVec2::from_ints(3, 0));
        let far_id = world.spawn_player_at(far, FixedVec2::from_ints(30, 30));
        let mut events = EventQueue::new();

        // Activate at frame 0; cast 3 means execution at frame 3
        let mut press = PlayerIntent::no_op();
        press.set_ability(true);
        let quiet = PlayerIntent::no_op();

        for frame in 0..=4 {
            let intent = if frame == 0 { press } else { quiet };
            let set = input_set(
                frame,
                &[(caster, intent), (near, quiet), (far, quiet)],
            );
            world.apply_tick(frame, &set, &mut events);
        }

        let blast_damage = ArenaConfig::default().blast_damage;
        let near_c = world.combatant(near_id).unwrap();
        let far_c = world.combatant(far_id).unwrap();
        assert_eq!(near_c.health, near_c.max_health - blast_damage);
        assert_eq!(far_c.health, far_c.max_health);

        let drained = events.drain();
        assert!(drained
            .iter()
            .any(|e| matches!(e.data, DomainEventData::AbilityExecuted { .. })));
    }

    #[test]
    fn test_elimination_removes_from_play() {
        let mut config = ArenaConfig::default();
        config.max_health = Fixed::from_int(20);
        let mut world = ArenaWorld::new(&SimConfig::default(), config, 1);

        let caster = PlayerId(0);
        let victim = PlayerId(1);
        world.spawn_player_at(caster, FixedVec2::ZERO);
        let victim_id = world.spawn_player_at(victim, FixedVec2::from_ints(3, 0));
        let mut events = EventQueue::new();

        let mut press = PlayerIntent::no_op();
        press.set_ability(true);
        let quiet = PlayerIntent::no_op();

        // One blast (25 damage) kills a 20-health victim
        for frame in 0..=4 {
            let intent = if frame == 0 { press } else { quiet };
            let set = input_set(frame, &[(caster, intent), (victim, quiet)]);
            world.apply_tick(frame, &set, &mut events);
        }

        let c = world.combatant(victim_id).unwrap();
        assert!(!c.alive);
        assert_eq!(c.health, Fixed::ZERO);

        let drained = events.drain();
        assert!(drained.iter().any(|e| matches!(
            e.data,
            DomainEventData::EntityEliminated { entity, .. } if entity == victim_id
        )));

        // Dead entities take no further part in collisions
        assert!(!world.grid.query(crate::sim::geometry::Aabb::new(
            FixedVec2::from_ints(3, 0),
            FixedVec2::from_ints(1, 1),
        ))
        .contains(&victim_id));
    }

    #[test]
    fn test_snapshot_roundtrip_bit_identical() {
        let mut world = arena_with_players(3, 777);
        let mut events = EventQueue::new();

        for frame in 0..10 {
            let set = input_set(
                frame,
                &[
                    (PlayerId(0), PlayerIntent::with_movement(127, 0)),
                    (PlayerId(1), PlayerIntent::with_movement(0, 127)),
                    (PlayerId(2), PlayerIntent::with_movement(-127, -127)),
                ],
            );
            world.apply_tick(frame, &set, &mut events);
        }

        let payload = world.encode_snapshot();
        let digest = world.state_digest();

        // Keep simulating, then restore
        for frame in 10..20 {
            let set = input_set(frame, &[(PlayerId(0), PlayerIntent::with_movement(50, 50))]);
            world.apply_tick(frame, &set, &mut events);
        }
        assert_ne!(world.state_digest(), digest);

        world.restore_snapshot(&payload).unwrap();
        assert_eq!(world.state_digest(), digest);
        assert_eq!(world.encode_snapshot(), payload);
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let mut world = arena_with_players(1, 1);
        let err = world.restore_snapshot(&[0xFF, 0xFE, 0xFD]);
        assert!(matches!(err, Err(SnapshotError::PayloadDecode(_))));
    }

    #[test]
    fn test_two_runs_bit_identical() {
        let run = || {
            let mut world = arena_with_players(2, 4242);
            let mut events = EventQueue::new();
            for frame in 0..100 {
                let set = input_set(
                    frame,
                    &[
                        (PlayerId(0), PlayerIntent::with_movement((frame % 120) as i8, 10)),
                        (PlayerId(1), PlayerIntent::with_movement(-64, (frame % 100) as i8)),
                    ],
                );
                world.apply_tick(frame, &set, &mut events);
            }
            (world.state_digest(), world.encode_snapshot(), events.drain())
        };

        let (d1, s1, e1) = run();
        let (d2, s2, e2) = run();
        assert_eq!(d1, d2);
        assert_eq!(s1, s2);
        assert_eq!(e1, e2);
    }
}

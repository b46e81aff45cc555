//! Input Buffering
//!
//! Per-frame, per-player intent storage with a configurable delay window.
//! Uses a lookup table (MOVE_LUT) for exact i8 to Fixed conversion so every
//! peer normalizes analog input identically.
//!
//! Submissions may arrive out-of-band (network receive) ahead of the frame
//! being consumed; the owning context sequences them relative to the tick
//! boundary. The buffer itself is plain single-threaded state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::sim::error::{ConfigError, InputError};
use crate::sim::spatial::EntityId;
use crate::LogicFrame;

// =============================================================================
// MOVE LOOKUP TABLE (Critical for Determinism)
// =============================================================================

/// Lookup table for converting i8 move input to Fixed.
///
/// # Why a Lookup Table?
///
/// Converting i8 [-127..+127] to Fixed [-1.0..+1.0] requires
/// `value * 1_000_000 / 127`, which is not an integer scale. The table
/// precomputes all 256 floor-division results so the conversion is a
/// single indexed load with one agreed rounding.
///
/// # Special Values
///
/// - Index 128 (-128 as i8) = 0 (represents "no input" / stick released)
pub static MOVE_LUT: [i64; 256] = {
    let mut lut = [0i64; 256];
    let mut i = 0i64;
    while i < 256 {
        // Treat as signed: 0..127 = positive, 128..255 = negative (-128..-1)
        let signed = if i < 128 { i } else { i - 256 };

        // -128 is reserved for "no input" -> map to 0
        if signed == -128 {
            lut[i as usize] = 0;
        } else {
            // Scale [-127..+127] to [-1_000_000..+1_000_000]
            lut[i as usize] = (signed * 1_000_000) / 127;
        }
        i += 1;
    }
    lut
};

/// Convert i8 move input to Fixed using the lookup table.
#[inline]
pub fn move_to_fixed(input: i8) -> Fixed {
    Fixed::from_raw(MOVE_LUT[(input as u8) as usize])
}

// =============================================================================
// PLAYER ID & INTENT
// =============================================================================

/// Lockstep player slot (dense index, assigned at session setup).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u8);

/// One player's declared action for one logic frame.
///
/// Immutable once submitted. The default value is the explicit no-op
/// synthesized for late players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Movement X direction: -127 (left) to +127 (right).
    /// -128 = stick released / no input.
    pub move_x: i8,

    /// Movement Y direction: -127 (down) to +127 (up).
    /// -128 = stick released / no input.
    pub move_y: i8,

    /// Action flags (packed bits):
    /// - Bit 0: Activate ability this frame
    /// - Bit 1-7: Reserved
    pub flags: u8,

    /// Optional target entity for the action.
    pub target: Option<EntityId>,
}

impl PlayerIntent {
    /// Special value indicating no input (stick released)
    pub const NO_INPUT: i8 = -128;

    /// Ability flag bit
    pub const FLAG_ABILITY: u8 = 0x01;

    /// The explicit no-op intent.
    pub const fn no_op() -> Self {
        Self {
            move_x: Self::NO_INPUT,
            move_y: Self::NO_INPUT,
            flags: 0,
            target: None,
        }
    }

    /// Create an intent with a movement direction.
    pub const fn with_movement(move_x: i8, move_y: i8) -> Self {
        Self {
            move_x,
            move_y,
            flags: 0,
            target: None,
        }
    }

    /// Get movement as a FixedVec2 via MOVE_LUT.
    #[inline]
    pub fn move_direction(&self) -> FixedVec2 {
        FixedVec2 {
            x: move_to_fixed(self.move_x),
            y: move_to_fixed(self.move_y),
        }
    }

    /// Check if the ability flag is set.
    #[inline]
    pub fn ability_pressed(&self) -> bool {
        self.flags & Self::FLAG_ABILITY != 0
    }

    /// Set the ability flag.
    #[inline]
    pub fn set_ability(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_ABILITY;
        } else {
            self.flags &= !Self::FLAG_ABILITY;
        }
    }

    /// Check if this is an idle frame (no input at all).
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.move_x == Self::NO_INPUT
            && self.move_y == Self::NO_INPUT
            && self.flags == 0
            && self.target.is_none()
    }
}

impl Default for PlayerIntent {
    fn default() -> Self {
        Self::no_op()
    }
}

/// The complete, order-independent intent collection for one frame:
/// exactly one entry per expected player slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInputSet {
    /// The frame these intents apply to.
    pub frame: LogicFrame,

    /// Intent per player (BTreeMap for deterministic iteration).
    pub intents: BTreeMap<PlayerId, PlayerIntent>,

    /// Players whose intent was synthesized as a no-op because the delay
    /// window elapsed before they submitted.
    pub synthesized: BTreeSet<PlayerId>,
}

impl FrameInputSet {
    /// Get a player's intent.
    pub fn get(&self, player: PlayerId) -> Option<&PlayerIntent> {
        self.intents.get(&player)
    }
}

// =============================================================================
// INPUT BUFFER
// =============================================================================

/// Per-frame, per-player intent storage with a delay window.
///
/// A frame is ready when every expected player has submitted, or when the
/// window has elapsed (measured against the most advanced frame any
/// participant has submitted for) - at which point missing players are
/// synthesized explicit no-ops at consume time. Larger windows absorb
/// more network jitter before a frame must stall waiting on a slow
/// participant, at the cost of input latency.
///
/// Consumed frames are retained (rollback re-simulation replays them via
/// [`InputBuffer::replay`]) until [`InputBuffer::prune`], which the
/// driver calls in lockstep with snapshot eviction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputBuffer {
    /// Expected player slots.
    expected: BTreeSet<PlayerId>,

    /// Frames of jitter tolerance before no-ops are synthesized.
    delay_window: u64,

    /// Next frame to consume.
    cursor: LogicFrame,

    /// Pending submissions for frames >= cursor.
    pending: BTreeMap<LogicFrame, BTreeMap<PlayerId, PlayerIntent>>,

    /// Consumed frames retained for rollback replay.
    retired: BTreeMap<LogicFrame, FrameInputSet>,

    /// Highest frame any submission has been observed for.
    latest_submitted: Option<LogicFrame>,
}

impl InputBuffer {
    /// Create a buffer for the given player slots and delay window.
    pub fn new(players: &[PlayerId], delay_window: u64) -> Result<Self, ConfigError> {
        if players.is_empty() {
            return Err(ConfigError::NoPlayers);
        }
        Ok(Self {
            expected: players.iter().copied().collect(),
            delay_window,
            cursor: 0,
            pending: BTreeMap::new(),
            retired: BTreeMap::new(),
            latest_submitted: None,
        })
    }

    /// The expected player slots.
    pub fn players(&self) -> &BTreeSet<PlayerId> {
        &self.expected
    }

    /// Next frame the buffer will consume.
    pub fn cursor(&self) -> LogicFrame {
        self.cursor
    }

    /// Store one intent. Intents are immutable once submitted.
    pub fn submit(
        &mut self,
        player: PlayerId,
        frame: LogicFrame,
        intent: PlayerIntent,
    ) -> Result<(), InputError> {
        if !self.expected.contains(&player) {
            return Err(InputError::UnknownPlayer { player });
        }
        if frame < self.cursor {
            debug!(?player, frame, cursor = self.cursor, "rejected stale submission");
            return Err(InputError::StaleFrame {
                frame,
                cursor: self.cursor,
            });
        }

        let slot = self.pending.entry(frame).or_default();
        if slot.contains_key(&player) {
            debug!(?player, frame, "rejected duplicate submission");
            return Err(InputError::DuplicateSubmission { player, frame });
        }
        slot.insert(player, intent);

        self.latest_submitted = Some(self.latest_submitted.map_or(frame, |f| f.max(frame)));
        Ok(())
    }

    /// True once the delay window has elapsed for `frame`: some
    /// participant is already submitting `delay_window` frames ahead, so
    /// laggards forfeit the frame to a synthesized no-op.
    fn window_elapsed(&self, frame: LogicFrame) -> bool {
        match self.latest_submitted {
            Some(latest) => latest >= frame + self.delay_window,
            None => false,
        }
    }

    /// A frame is ready iff every expected player has submitted, or the
    /// delay window has elapsed.
    pub fn is_ready(&self, frame: LogicFrame) -> bool {
        if frame < self.cursor {
            return false; // already consumed
        }
        let submitted = self.pending.get(&frame).map_or(0, |m| m.len());
        submitted == self.expected.len() || self.window_elapsed(frame)
    }

    /// Consume the frame at the cursor, retiring it.
    ///
    /// Fails with [`InputError::FrameNotReady`] for any frame that is not
    /// the ready cursor frame - never returns partial data. Missing
    /// players are filled with explicit no-ops only when the delay window
    /// has elapsed.
    pub fn consume(&mut self, frame: LogicFrame) -> Result<FrameInputSet, InputError> {
        if frame != self.cursor || !self.is_ready(frame) {
            return Err(InputError::FrameNotReady { frame });
        }

        let submitted = self.pending.remove(&frame).unwrap_or_default();
        let mut intents = BTreeMap::new();
        let mut synthesized = BTreeSet::new();

        for &player in &self.expected {
            match submitted.get(&player) {
                Some(intent) => {
                    intents.insert(player, *intent);
                }
                None => {
                    intents.insert(player, PlayerIntent::no_op());
                    synthesized.insert(player);
                }
            }
        }

        let set = FrameInputSet {
            frame,
            intents,
            synthesized,
        };
        self.retired.insert(frame, set.clone());
        self.cursor += 1;
        Ok(set)
    }

    /// Fetch the retained input set of an already-consumed frame for
    /// rollback re-simulation. The replayed set is byte-identical to the
    /// one originally consumed (including synthesized no-ops).
    pub fn replay(&self, frame: LogicFrame) -> Result<&FrameInputSet, InputError> {
        self.retired
            .get(&frame)
            .ok_or(InputError::FrameNotReady { frame })
    }

    /// Drop retained frames below `before`. Frames at or above remain
    /// replayable; the driver prunes to the earliest retained snapshot.
    pub fn prune(&mut self, before: LogicFrame) {
        self.retired = self.retired.split_off(&before);
    }

    /// Number of retained (consumed) frames.
    pub fn retained_len(&self) -> usize {
        self.retired.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Error Taxonomy
//!
//! One enum per failure family. Caller-misuse errors (input, ability,
//! snapshot) are explicit results the tick survives deterministically.
//! Numeric errors fail loudly - silent saturation would desync peers.
//! Misconfiguration is rejected at construction, never mid-tick.

use thiserror::Error;

use crate::sim::ability::AbilityPhase;
use crate::sim::input::PlayerId;
use crate::LogicFrame;

/// Numeric failures in fixed-point arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumericError {
    /// Division by zero.
    #[error("fixed-point division by zero")]
    DivideByZero,

    /// Result does not fit in the scalar range even after the widened
    /// intermediate computation.
    #[error("fixed-point overflow beyond widened intermediate range")]
    Overflow,

    /// Square root of a negative value.
    #[error("square root of negative fixed-point value")]
    NegativeSqrt,
}

/// Input submission and consumption failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    /// The player already submitted an intent for this frame.
    #[error("player {player:?} already submitted for frame {frame}")]
    DuplicateSubmission {
        /// Submitting player.
        player: PlayerId,
        /// Frame of the rejected submission.
        frame: LogicFrame,
    },

    /// The frame was already consumed; late input must go through the
    /// rollback path, not the buffer.
    #[error("frame {frame} already consumed (cursor at {cursor})")]
    StaleFrame {
        /// Frame of the rejected submission.
        frame: LogicFrame,
        /// Next frame the buffer will consume.
        cursor: LogicFrame,
    },

    /// The frame is not ready to consume (missing submissions and the
    /// delay window has not elapsed), or is not the cursor frame.
    #[error("frame {frame} not ready for consumption")]
    FrameNotReady {
        /// The requested frame.
        frame: LogicFrame,
    },

    /// The player is not a registered slot in this session.
    #[error("unknown player {player:?}")]
    UnknownPlayer {
        /// The unregistered player.
        player: PlayerId,
    },
}

/// Ability activation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AbilityError {
    /// Activation attempted while the cooldown is still counting down.
    #[error("ability on cooldown for {remaining_frames} more frames")]
    NotReady {
        /// Frames until the ability returns to Idle.
        remaining_frames: u32,
    },

    /// Activation attempted mid-cycle (casting, executing, or recovering).
    #[error("ability already active in phase {phase:?}")]
    AlreadyActive {
        /// The phase the slot was in.
        phase: AbilityPhase,
    },
}

/// Snapshot store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The requested frame predates all retained history. Callers must
    /// resimulate from the earliest retained snapshot or reject the
    /// rollback.
    #[error("no snapshot at or before frame {requested} (earliest retained: {earliest:?})")]
    NoSnapshotAvailable {
        /// The requested rollback frame.
        requested: LogicFrame,
        /// Earliest frame still retained, if any.
        earliest: Option<LogicFrame>,
    },

    /// The snapshot payload could not be decoded by the world.
    #[error("snapshot payload decode failed: {0}")]
    PayloadDecode(String),
}

/// Construction-time configuration errors.
///
/// These are the only conditions this crate treats as fatal to setup:
/// detectable programmer misconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Tick rate must be positive.
    #[error("tick rate must be non-zero")]
    ZeroTickRate,

    /// Snapshot cadence must be positive.
    #[error("snapshot interval must be non-zero")]
    ZeroSnapshotInterval,

    /// At least one snapshot must be retained for rollback to exist.
    #[error("snapshot retention depth must be non-zero")]
    ZeroRetentionDepth,

    /// The catch-up cap bounds worst-case stall recovery; zero would
    /// deadlock the accumulator.
    #[error("max catch-up ticks must be non-zero")]
    ZeroMaxCatchup,

    /// Spatial grid cells must have positive size.
    #[error("spatial cell size must be positive")]
    NonPositiveCellSize,

    /// A session needs at least one player slot.
    #[error("expected player set must not be empty")]
    NoPlayers,
}

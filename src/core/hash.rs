//! State Hashing for Desync Detection
//!
//! Provides deterministic hashing of simulation state for:
//! - Snapshot payload digests (cheap cross-peer comparison)
//! - Desync detection between lockstep participants
//! - Replay validation
//!
//! Update order is part of the hash contract: every peer must feed fields
//! in the same order, so the helpers here take explicit little-endian
//! encodings and callers iterate BTreeMaps only.

use sha2::{Digest, Sha256};

use super::fixed::Fixed;
use super::vec2::FixedVec2;

/// Hash output type (256 bits / 32 bytes)
pub type StateDigest = [u8; 32];

/// Deterministic hasher for simulation state.
///
/// Wraps SHA-256 with helpers for fixed-point types.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for world state digests.
    pub fn for_world_state() -> Self {
        Self::new(b"LOCKSTEP_WORLD_V1")
    }

    /// Create hasher for snapshot payloads.
    pub fn for_snapshot() -> Self {
        Self::new(b"LOCKSTEP_SNAPSHOT_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i64 value (little-endian).
    #[inline]
    pub fn update_i64(&mut self, value: i64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a Fixed value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.update_i64(value.raw());
    }

    /// Update with a FixedVec2.
    #[inline]
    pub fn update_vec2(&mut self, value: FixedVec2) {
        self.update_fixed(value.x);
        self.update_fixed(value.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> StateDigest {
        self.hasher.finalize().into()
    }
}

/// Compute the digest of an opaque snapshot payload.
pub fn snapshot_digest(payload: &[u8]) -> StateDigest {
    let mut hasher = StateHasher::for_snapshot();
    hasher.update_u64(payload.len() as u64);
    hasher.update_bytes(payload);
    hasher.finalize()
}

/// Compute a world state digest.
///
/// The frame is always hashed first; the closure adds world-specific
/// fields in its own fixed order.
pub fn compute_world_digest<F>(frame: u64, add_state: F) -> StateDigest
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_world_state();
    hasher.update_u64(frame);
    add_state(&mut hasher);
    hasher.finalize()
}

/// Render a digest as a short hex prefix for log lines.
pub fn digest_prefix(digest: &StateDigest) -> String {
    hex::encode(&digest[..8])
}

// =============================================================================
// TESTS
// =============================================================================

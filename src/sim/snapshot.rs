//! Snapshot Store
//!
//! Keyframe capture/restore enabling rollback. Snapshot construction is
//! delegated to the gameplay layer (only it knows the full entity set);
//! this store's responsibility is indexing by frame, retention-bounded
//! eviction, and retrieval. Rollback orchestration lives in the driver
//! or an external reconciliation layer, not here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::hash::{digest_prefix, snapshot_digest, StateDigest};
use crate::sim::error::{ConfigError, SnapshotError};
use crate::LogicFrame;

/// A fully self-describing capture of world state at one frame.
///
/// The payload is an opaque blob produced and consumed by the gameplay
/// layer; the digest is SHA-256 over the payload so peers can compare
/// state without shipping it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Frame the state was captured at (state *after* that frame ran).
    pub frame: LogicFrame,

    /// SHA-256 digest of the payload.
    pub digest: StateDigest,

    /// Opaque world state bytes.
    pub payload: Vec<u8>,
}

/// Frame-indexed snapshot storage with bounded retention.
///
/// Oldest snapshots are discarded first once the retention depth is
/// exceeded, so memory use is bounded by `retention * payload size`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotStore {
    /// Maximum snapshots retained.
    retention: usize,

    /// Retained snapshots by frame.
    snapshots: BTreeMap<LogicFrame, WorldSnapshot>,
}

impl SnapshotStore {
    /// Create a store retaining up to `retention` snapshots.
    pub fn new(retention: usize) -> Result<Self, ConfigError> {
        if retention == 0 {
            return Err(ConfigError::ZeroRetentionDepth);
        }
        Ok(Self {
            retention,
            snapshots: BTreeMap::new(),
        })
    }

    /// Store a snapshot, evicting oldest-first beyond the retention bound.
    pub fn capture(&mut self, frame: LogicFrame, payload: Vec<u8>) {
        let digest = snapshot_digest(&payload);
        debug!(
            frame,
            digest = %digest_prefix(&digest),
            bytes = payload.len(),
            "snapshot captured"
        );
        self.snapshots.insert(
            frame,
            WorldSnapshot {
                frame,
                digest,
                payload,
            },
        );

        while self.snapshots.len() > self.retention {
            if let Some((evicted, _)) = self.snapshots.pop_first() {
                debug!(frame = evicted, "snapshot evicted");
            }
        }
    }

    /// Fetch the closest snapshot at or before `frame`.
    ///
    /// Fails with [`SnapshotError::NoSnapshotAvailable`] when the frame
    /// predates all retained history; the caller must then resimulate
    /// from the earliest retained snapshot or reject the rollback.
    pub fn restore(&self, frame: LogicFrame) -> Result<&WorldSnapshot, SnapshotError> {
        self.snapshots
            .range(..=frame)
            .next_back()
            .map(|(_, snap)| snap)
            .ok_or(SnapshotError::NoSnapshotAvailable {
                requested: frame,
                earliest: self.earliest(),
            })
    }

    /// Earliest retained frame, if any.
    pub fn earliest(&self) -> Option<LogicFrame> {
        self.snapshots.keys().next().copied()
    }

    /// Latest retained frame, if any.
    pub fn latest(&self) -> Option<LogicFrame> {
        self.snapshots.keys().next_back().copied()
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// True if an exact snapshot exists for `frame`.
    pub fn contains(&self, frame: LogicFrame) -> bool {
        self.snapshots.contains_key(&frame)
    }
}

// =============================================================================
// TESTS
// =============================================================================

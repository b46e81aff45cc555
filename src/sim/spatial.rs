//! Spatial Index
//!
//! Uniform-grid broad phase: entities are bucketed by
//! `floor(position / cell_size)` and queries return candidate supersets
//! for the narrow phase to refine. The index stores entity identifiers
//! only - it never owns entity state.
//!
//! Complexity is near-linear in entity count for roughly uniform spatial
//! distributions, degrading toward quadratic only within densely
//! populated single cells.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::sim::error::ConfigError;
use crate::sim::geometry::Aabb;

/// Simulation entity identifier.
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

/// Discretized grid coordinate.
pub type CellCoord = (i64, i64);

/// Uniform grid broad-phase index over entity positions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpatialIndex {
    /// Cell edge length in world units.
    cell_size: Fixed,

    /// Cell -> resident entity ids (BTreeMap/BTreeSet for deterministic
    /// iteration).
    cells: BTreeMap<CellCoord, BTreeSet<EntityId>>,

    /// Entity -> current cell, for O(log n) moves and removes.
    residents: BTreeMap<EntityId, CellCoord>,
}

impl SpatialIndex {
    /// Create an index with the given cell size.
    ///
    /// Cell size should be on the order of the largest common query
    /// radius; too small and candidate pairs span many cells, too large
    /// and cells degenerate toward all-pairs.
    pub fn new(cell_size: Fixed) -> Result<Self, ConfigError> {
        if cell_size <= Fixed::ZERO {
            return Err(ConfigError::NonPositiveCellSize);
        }
        Ok(Self {
            cell_size,
            cells: BTreeMap::new(),
            residents: BTreeMap::new(),
        })
    }

    /// The configured cell size.
    pub fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.residents.len()
    }

    /// True if no entities are indexed.
    pub fn is_empty(&self) -> bool {
        self.residents.is_empty()
    }

    /// Compute the cell a position hashes into.
    ///
    /// Floor division (toward negative infinity), so cell boundaries are
    /// consistent across the origin.
    #[inline]
    pub fn cell_of(&self, position: FixedVec2) -> CellCoord {
        (
            position.x.raw().div_euclid(self.cell_size.raw()),
            position.y.raw().div_euclid(self.cell_size.raw()),
        )
    }

    /// Insert an entity, or move it if already present.
    pub fn insert(&mut self, id: EntityId, position: FixedVec2) {
        let cell = self.cell_of(position);
        if let Some(&old) = self.residents.get(&id) {
            if old == cell {
                return;
            }
            self.evict(id, old);
        }
        self.cells.entry(cell).or_default().insert(id);
        self.residents.insert(id, cell);
    }

    /// Update an entity's position. Alias of [`SpatialIndex::insert`];
    /// cell membership only changes when the position crosses a boundary.
    #[inline]
    pub fn update(&mut self, id: EntityId, position: FixedVec2) {
        self.insert(id, position);
    }

    /// Remove an entity. No-op if not present.
    pub fn remove(&mut self, id: EntityId) {
        if let Some(cell) = self.residents.remove(&id) {
            self.evict(id, cell);
        }
    }

    fn evict(&mut self, id: EntityId, cell: CellCoord) {
        if let Some(set) = self.cells.get_mut(&cell) {
            set.remove(&id);
            if set.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Broad-phase region query: every entity whose cell overlaps the
    /// region. A superset - the narrow phase decides true intersection.
    pub fn query(&self, region: Aabb) -> Vec<EntityId> {
        let min = region.min();
        let max = region.max();
        let (cx0, cy0) = self.cell_of(min);
        let (cx1, cy1) = self.cell_of(max);

        let mut out = BTreeSet::new();
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                if let Some(set) = self.cells.get(&(cx, cy)) {
                    out.extend(set.iter().copied());
                }
            }
        }
        out.into_iter().collect()
    }

    /// Enumerate unique unordered candidate pairs: entities sharing a
    /// cell or residing in neighboring cells.
    ///
    /// Deduplicated through a packed composite key (low id in the high
    /// bits), so each pair is tested at most once per pass. Output is
    /// sorted by that key, hence deterministic.
    pub fn candidate_pairs(&self) -> Vec<(EntityId, EntityId)> {
        let mut keys: BTreeSet<u64> = BTreeSet::new();

        for (&(cx, cy), set) in &self.cells {
            // Pairs within the cell
            for &a in set {
                for &b in set {
                    if a < b {
                        keys.insert(pair_key(a, b));
                    }
                }
            }

            // Pairs against forward neighbors; each adjacent cell pair
            // is visited exactly once.
            for (dx, dy) in [(1i64, -1i64), (1, 0), (1, 1), (0, 1)] {
                if let Some(other) = self.cells.get(&(cx + dx, cy + dy)) {
                    for &a in set {
                        for &b in other {
                            if a != b {
                                keys.insert(pair_key(a.min(b), a.max(b)));
                            }
                        }
                    }
                }
            }
        }

        keys.into_iter().map(unpack_key).collect()
    }
}

/// Pack an ordered id pair into one composite key.
#[inline]
fn pair_key(low: EntityId, high: EntityId) -> u64 {
    ((low.0 as u64) << 32) | high.0 as u64
}

#[inline]
fn unpack_key(key: u64) -> (EntityId, EntityId) {
    (EntityId((key >> 32) as u32), EntityId(key as u32))
}

// =============================================================================
// TESTS
// =============================================================================

//! Deterministic Random Number Generator
//!
//! Uses Xorshift128+ for fast, high-quality, deterministic randomness.
//! Given the same seed, produces an identical sequence on all platforms.
//!
//! The generator state is serializable so that a restored world snapshot
//! resumes the exact sequence it would have produced without the rollback.

use serde::{Deserialize, Serialize};

use super::fixed::{Fixed, FIXED_SCALE};
use super::vec2::FixedVec2;

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG will produce the exact same sequence
/// of random numbers on any platform (x86, ARM, WASM).
///
/// # Example
///
/// ```
/// use lockstep_core::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let value = rng.next_u64();
/// assert_eq!(value, 6233086606872742541); // Always the same!
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // State must never be all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random u32.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    /// Generate a random integer in range `[0, max)`.
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large max, but acceptable
        (self.next_u64() % max as u64) as u32
    }

    /// Generate a random integer in range `[min, max]`.
    #[inline]
    pub fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let range = (max - min + 1) as u32;
        min + self.next_int(range) as i32
    }

    /// Generate a random Fixed in range `[0, max)`.
    #[inline]
    pub fn next_fixed(&mut self, max: Fixed) -> Fixed {
        if max <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        // Use upper 32 bits; scale into [0, max) in i128 to avoid overflow
        let raw = (self.next_u64() >> 32) as i128;
        Fixed::from_raw(((raw * max.raw() as i128) >> 32) as i64)
    }

    /// Generate a random Fixed in range `[min, max)`.
    #[inline]
    pub fn next_fixed_range(&mut self, min: Fixed, max: Fixed) -> Fixed {
        if min >= max {
            return min;
        }
        let range = max - min;
        min + self.next_fixed(range)
    }

    /// Generate a random position within a centered rectangle of the
    /// given half-extents.
    #[inline]
    pub fn next_position(&mut self, half_extents: FixedVec2) -> FixedVec2 {
        let x = self.next_fixed_range(-half_extents.x, half_extents.x);
        let y = self.next_fixed_range(-half_extents.y, half_extents.y);
        FixedVec2::new(x, y)
    }

    /// Generate a random normalized direction vector.
    ///
    /// Rejection sampling to avoid the zero vector.
    pub fn next_direction(&mut self) -> FixedVec2 {
        let one = Fixed::from_raw(FIXED_SCALE);
        loop {
            let x = self.next_fixed_range(-one, one);
            let y = self.next_fixed_range(-one, one);
            let vec = FixedVec2::new(x, y);

            if let Ok(n) = vec.normalize() {
                if n != FixedVec2::ZERO {
                    return n;
                }
            }
        }
    }

    /// Generate a random boolean with the given probability.
    ///
    /// `probability` is in `[0, ONE]` where ONE = 100%.
    #[inline]
    pub fn next_bool(&mut self, probability: Fixed) -> bool {
        self.next_fixed(Fixed::ONE) < probability
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_int((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);

        // Very unlikely to match
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_rng_known_values() {
        // Regression guard: these values must never change, or existing
        // replays will break.
        let mut rng = DeterministicRng::new(42);
        assert_eq!(rng.next_u64(), 16629283624882167704);
        assert_eq!(rng.next_u64(), 1420492921613871959);
        assert_eq!(rng.next_u64(), 9768315062676884790);
    }

    #[test]
    fn test_next_int() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            assert!(rng.next_int(100) < 100);
        }

        assert_eq!(rng.next_int(0), 0);
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_next_fixed() {
        let mut rng = DeterministicRng::new(9999);

        let max = Fixed::from_int(100);
        for _ in 0..1000 {
            let val = rng.next_fixed(max);
            assert!(val >= Fixed::ZERO && val < max);
        }
    }

    #[test]
    fn test_next_position() {
        let mut rng = DeterministicRng::new(7777);
        let half = FixedVec2::from_ints(50, 50);

        for _ in 0..100 {
            let pos = rng.next_position(half);
            assert!(pos.x >= -half.x && pos.x <= half.x);
            assert!(pos.y >= -half.y && pos.y <= half.y);
        }
    }

    #[test]
    fn test_shuffle_determinism() {
        let mut rng1 = DeterministicRng::new(1111);
        let mut rng2 = DeterministicRng::new(1111);

        let mut arr1 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut arr2 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        rng1.shuffle(&mut arr1);
        rng2.shuffle(&mut arr2);

        assert_eq!(arr1, arr2);
    }

    #[test]
    fn test_state_checkpoint() {
        let mut rng = DeterministicRng::new(5555);

        for _ in 0..50 {
            rng.next_u64();
        }

        let saved_state = rng.state();
        let next_values: Vec<u64> = (0..10).map(|_| rng.next_u64()).collect();

        rng.set_state(saved_state);
        for expected in next_values {
            assert_eq!(rng.next_u64(), expected);
        }
    }

    #[test]
    fn test_serde_roundtrip_resumes_sequence() {
        let mut rng = DeterministicRng::new(4242);
        rng.next_u64();

        let encoded = bincode::serialize(&rng).unwrap();
        let mut restored: DeterministicRng = bincode::deserialize(&encoded).unwrap();

        assert_eq!(rng.next_u64(), restored.next_u64());
    }
}

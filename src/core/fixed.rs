//! Decimal Fixed-Point Arithmetic
//!
//! This module provides deterministic fixed-point math for game simulation.
//! All operations use integer arithmetic only - no floats in gameplay logic.
//!
//! ## Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Decimal fixed point (64-bit signed integer)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  raw value = real value * 1_000_000                         │
//! │                                                             │
//! │  Range:     ±9.2 * 10^12 units                              │
//! │  Precision: 10^-6 units                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why decimal scale?
//!
//! - Constants in design data (speeds, radii, durations) are decimal
//!   literals; a power-of-ten scale makes them exact, with no binary
//!   rounding surprises when authoring.
//! - i64 storage leaves 12 integer digits of headroom, far beyond any
//!   arena coordinate.
//!
//! ## Overflow and rounding rules
//!
//! Multiplication and division widen to i128 before rescaling, so the
//! intermediate product can never overflow silently. Rescaling truncates
//! **toward zero** (Rust integer division), and every operation in this
//! module follows that same direction. A result that does not fit back
//! into i64 is a loud [`NumericError::Overflow`], never a saturated or
//! wrapped value: silent saturation would desync peers that hit the bound
//! at different times.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::sim::error::NumericError;

/// Number of fractional decimal digits (6).
pub const FIXED_DECIMALS: u32 = 6;

/// Scale factor: raw units per 1.0 (1,000,000).
pub const FIXED_SCALE: i64 = 1_000_000;

/// Default Newton iteration count for [`Fixed::sqrt`].
///
/// A fixed bound keeps worst-case tick cost constant and identical on
/// every platform. 12 iterations converge for all magnitudes the safe
/// range admits given the bit-length initial guess.
pub const DEFAULT_SQRT_ITERATIONS: u32 = 12;

/// Largest magnitude (in raw units) guaranteed safe as a multiplication
/// operand: products of two values up to this bound rescale back into i64.
pub const FIXED_SAFE_BOUND: i64 = 3_037_000_499 * FIXED_SCALE / 1_000;

/// Decimal fixed-point number stored as a scaled i64.
///
/// Equality and ordering are bit-exact on the raw integer. Arithmetic
/// operators panic on overflow / division by zero (programmer error,
/// see module docs); input-dependent simulation paths should use the
/// `checked_*` forms and propagate [`NumericError`] instead.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Fixed(i64);

impl Fixed {
    /// Zero constant.
    pub const ZERO: Self = Self(0);

    /// One constant.
    pub const ONE: Self = Self(FIXED_SCALE);

    /// One half.
    pub const HALF: Self = Self(FIXED_SCALE / 2);

    /// Maximum representable value.
    pub const MAX: Self = Self(i64::MAX);

    /// Minimum representable value.
    pub const MIN: Self = Self(i64::MIN);

    /// Create from a raw scaled value (`raw = value * 1_000_000`).
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create from an integer. Exact.
    #[inline]
    pub const fn from_int(i: i64) -> Self {
        Self(i * FIXED_SCALE)
    }

    /// Create from a decimal literal split into whole and micro parts:
    /// `from_parts(2, 500_000)` is 2.5. Exact up to the scale factor.
    ///
    /// `micros` must be in `[0, 1_000_000)`; the sign is taken from
    /// `whole` (use `from_parts(-2, 500_000)` for -2.5).
    #[inline]
    pub const fn from_parts(whole: i64, micros: i64) -> Self {
        if whole < 0 {
            Self(whole * FIXED_SCALE - micros)
        } else {
            Self(whole * FIXED_SCALE + micros)
        }
    }

    /// Create from a ratio of integers, truncating toward zero.
    ///
    /// Fails with [`NumericError::DivideByZero`] when `den == 0`.
    #[inline]
    pub fn from_fraction(num: i64, den: i64) -> Result<Self, NumericError> {
        Self::from_int(num).checked_div(Self::from_int(den))
    }

    /// Get the raw scaled value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Truncate to an integer (toward zero).
    #[inline]
    pub const fn to_int(self) -> i64 {
        self.0 / FIXED_SCALE
    }

    /// Convert to f64 for display/rendering.
    ///
    /// # Warning
    /// Only use for visual output. NEVER use the result in game logic.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / FIXED_SCALE as f64
    }

    /// Checked addition.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Result<Self, NumericError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Checked subtraction.
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Result<Self, NumericError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Checked multiplication.
    ///
    /// Widens to i128, multiplies, rescales truncating toward zero, and
    /// fails with [`NumericError::Overflow`] if the rescaled result does
    /// not fit in i64.
    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Result<Self, NumericError> {
        let wide = (self.0 as i128) * (rhs.0 as i128) / (FIXED_SCALE as i128);
        i64::try_from(wide)
            .map(Self)
            .map_err(|_| NumericError::Overflow)
    }

    /// Checked division.
    ///
    /// Pre-scales the numerator in i128 to preserve precision, truncates
    /// toward zero. Fails with [`NumericError::DivideByZero`] when
    /// `rhs == 0` - never a silent sentinel.
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Result<Self, NumericError> {
        if rhs.0 == 0 {
            return Err(NumericError::DivideByZero);
        }
        let wide = (self.0 as i128) * (FIXED_SCALE as i128) / (rhs.0 as i128);
        i64::try_from(wide)
            .map(Self)
            .map_err(|_| NumericError::Overflow)
    }

    /// Square root via Newton's method with the default iteration bound.
    ///
    /// Returns [`NumericError::NegativeSqrt`] for negative inputs. The
    /// result carries bounded approximation error; callers needing exact
    /// comparisons should prefer squared distances and skip the root
    /// entirely.
    #[inline]
    pub fn sqrt(self) -> Result<Self, NumericError> {
        self.sqrt_with_iterations(DEFAULT_SQRT_ITERATIONS)
    }

    /// Square root with an explicit iteration bound.
    ///
    /// The bound is a precision/performance trade-off: iteration count is
    /// fixed up front (never converge-until-done) so worst-case tick cost
    /// is identical on every platform.
    pub fn sqrt_with_iterations(self, iterations: u32) -> Result<Self, NumericError> {
        if self.0 < 0 {
            return Err(NumericError::NegativeSqrt);
        }
        if self.0 == 0 {
            return Ok(Self::ZERO);
        }

        // sqrt(raw / S) * S == isqrt(raw * S), so work on the widened
        // product and take an integer square root.
        let target = (self.0 as i128) * (FIXED_SCALE as i128);

        // Initial guess from bit length: 2^(bits/2) is within 2x of the
        // true root, which Newton then closes quadratically.
        let bits = 128 - target.leading_zeros();
        let mut guess: i128 = 1i128 << (bits / 2).max(1);

        for _ in 0..iterations {
            // Newton-Raphson: guess = (guess + target/guess) / 2
            guess = (guess + target / guess) >> 1;
            if guess == 0 {
                guess = 1;
            }
        }

        i64::try_from(guess)
            .map(Self)
            .map_err(|_| NumericError::Overflow)
    }

    /// Absolute value.
    #[inline]
    pub const fn abs(self) -> Self {
        if self.0 < 0 {
            Self(-self.0)
        } else {
            self
        }
    }

    /// Sign of the value: -1, 0, or +1 as a Fixed.
    #[inline]
    pub const fn signum(self) -> Self {
        Self(self.0.signum() * FIXED_SCALE)
    }

    /// Minimum of two values.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if self.0 < other.0 {
            self
        } else {
            other
        }
    }

    /// Maximum of two values.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self.0 > other.0 {
            self
        } else {
            other
        }
    }

    /// Clamp to a range.
    #[inline]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// Linear interpolation: `a + (b - a) * t` where t in [0, 1].
    #[inline]
    pub fn lerp(self, other: Self, t: Self) -> Result<Self, NumericError> {
        other
            .checked_sub(self)?
            .checked_mul(t)?
            .checked_add(self)
    }

    /// True if the value is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Fixed {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        match self.checked_add(rhs) {
            Ok(v) => v,
            Err(_) => panic!("fixed-point addition overflow: {} + {}", self.0, rhs.0),
        }
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        match self.checked_sub(rhs) {
            Ok(v) => v,
            Err(_) => panic!("fixed-point subtraction overflow: {} - {}", self.0, rhs.0),
        }
    }
}

impl Mul for Fixed {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        match self.checked_mul(rhs) {
            Ok(v) => v,
            Err(_) => panic!("fixed-point multiplication overflow: {} * {}", self.0, rhs.0),
        }
    }
}

impl Div for Fixed {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Ok(v) => v,
            Err(NumericError::DivideByZero) => {
                panic!("fixed-point division by zero: {} / 0", self.0)
            }
            Err(_) => panic!("fixed-point division overflow: {} / {}", self.0, rhs.0),
        }
    }
}

impl Neg for Fixed {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:.6})", self.to_f64())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Fixed-Point 2D Vector
//!
//! Deterministic 2D vector operations for game physics.
//! All operations use fixed-point arithmetic.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::fixed::Fixed;
use crate::sim::error::NumericError;

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component
    pub x: Fixed,
    /// Y component
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self {
        x: Fixed::ONE,
        y: Fixed::ZERO,
    };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ONE,
    };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i64, y: i64) -> Self {
        Self {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
        }
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Result<Self, NumericError> {
        Ok(Self {
            x: self.x.checked_mul(scalar)?,
            y: self.y.checked_mul(scalar)?,
        })
    }

    /// Divide by a fixed-point scalar.
    #[inline]
    pub fn div_scalar(self, scalar: Fixed) -> Result<Self, NumericError> {
        Ok(Self {
            x: self.x.checked_div(scalar)?,
            y: self.y.checked_div(scalar)?,
        })
    }

    /// Squared length (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> Result<Fixed, NumericError> {
        self.x
            .checked_mul(self.x)?
            .checked_add(self.y.checked_mul(self.y)?)
    }

    /// Length (magnitude). Prefer `length_squared` when possible.
    #[inline]
    pub fn length(self) -> Result<Fixed, NumericError> {
        self.length_squared()?.sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> Result<Fixed, NumericError> {
        (self - other).length_squared()
    }

    /// Distance to another point. Prefer `distance_squared` when possible.
    #[inline]
    pub fn distance(self, other: Self) -> Result<Fixed, NumericError> {
        self.distance_squared(other)?.sqrt()
    }

    /// Normalize to unit length. Returns ZERO for the zero vector.
    #[inline]
    pub fn normalize(self) -> Result<Self, NumericError> {
        let len = self.length()?;
        if len.is_zero() {
            return Ok(Self::ZERO);
        }
        self.div_scalar(len)
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> Result<Fixed, NumericError> {
        self.x
            .checked_mul(other.x)?
            .checked_add(self.y.checked_mul(other.y)?)
    }

    /// 2D cross product (returns the scalar z-component).
    /// Positive if `other` is counter-clockwise from `self`.
    #[inline]
    pub fn cross(self, other: Self) -> Result<Fixed, NumericError> {
        self.x
            .checked_mul(other.y)?
            .checked_sub(self.y.checked_mul(other.x)?)
    }

    /// Clamp both components to a range.
    #[inline]
    pub fn clamp(self, min: Fixed, max: Fixed) -> Self {
        Self {
            x: self.x.clamp(min, max),
            y: self.y.clamp(min, max),
        }
    }

    /// Linear interpolation between two vectors.
    /// t = 0 returns self, t = ONE returns other.
    #[inline]
    pub fn lerp(self, other: Self, t: Fixed) -> Result<Self, NumericError> {
        Ok(Self {
            x: self.x.lerp(other.x, t)?,
            y: self.y.lerp(other.y, t)?,
        })
    }

    /// Rotate 90 degrees counter-clockwise.
    #[inline]
    pub fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Convert to float tuple for rendering. Display only.
    #[inline]
    pub fn to_f64s(self) -> (f64, f64) {
        (self.x.to_f64(), self.y.to_f64())
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_f64s();
        write!(f, "Vec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_f64s();
        write!(f, "({:.3}, {:.3})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(FixedVec2::ZERO.x, Fixed::ZERO);
        assert_eq!(FixedVec2::RIGHT.x, Fixed::ONE);
        assert_eq!(FixedVec2::UP.y, Fixed::ONE);
    }

    #[test]
    fn test_add_sub() {
        let a = FixedVec2::from_ints(3, 4);
        let b = FixedVec2::from_ints(1, 2);

        assert_eq!(a + b, FixedVec2::from_ints(4, 6));
        assert_eq!(a - b, FixedVec2::from_ints(2, 2));
        assert_eq!(-a, FixedVec2::from_ints(-3, -4));
    }

    #[test]
    fn test_scale() {
        let v = FixedVec2::from_ints(2, 3);
        assert_eq!(v.scale(Fixed::from_int(2)).unwrap(), FixedVec2::from_ints(4, 6));
        assert_eq!(v.div_scalar(Fixed::from_int(2)).unwrap().x, Fixed::ONE);
        assert!(v.div_scalar(Fixed::ZERO).is_err());
    }

    #[test]
    fn test_length() {
        // 3-4-5 triangle
        let v = FixedVec2::from_ints(3, 4);
        assert_eq!(v.length_squared().unwrap(), Fixed::from_int(25));

        let len = v.length().unwrap();
        let err = (len - Fixed::from_int(5)).abs();
        assert!(err.raw() < 100, "length should be ~5.0, got {}", len);
    }

    #[test]
    fn test_distance() {
        let a = FixedVec2::ZERO;
        let b = FixedVec2::from_ints(3, 4);
        assert_eq!(a.distance_squared(b).unwrap(), Fixed::from_int(25));
    }

    #[test]
    fn test_normalize() {
        let v = FixedVec2::from_ints(3, 4);
        let norm = v.normalize().unwrap();

        let len = norm.length().unwrap();
        assert!((len - Fixed::ONE).abs().raw() < 100);

        assert_eq!(FixedVec2::ZERO.normalize().unwrap(), FixedVec2::ZERO);
    }

    #[test]
    fn test_dot_cross() {
        let a = FixedVec2::from_ints(2, 3);
        let b = FixedVec2::from_ints(4, 5);

        // 2*4 + 3*5 = 23
        assert_eq!(a.dot(b).unwrap(), Fixed::from_int(23));
        // 2*5 - 3*4 = -2
        assert_eq!(a.cross(b).unwrap(), Fixed::from_int(-2));

        // Perpendicular vectors have zero dot product
        assert_eq!(a.dot(a.perpendicular()).unwrap(), Fixed::ZERO);
    }

    #[test]
    fn test_lerp() {
        let a = FixedVec2::ZERO;
        let b = FixedVec2::from_ints(10, 20);

        assert_eq!(a.lerp(b, Fixed::ZERO).unwrap(), a);
        assert_eq!(a.lerp(b, Fixed::ONE).unwrap(), b);
        assert_eq!(a.lerp(b, Fixed::HALF).unwrap(), FixedVec2::from_ints(5, 10));
    }

    #[test]
    fn test_determinism() {
        let a = FixedVec2::new(Fixed::from_raw(12_345_678), Fixed::from_raw(87_654_321));
        let b = FixedVec2::new(Fixed::from_raw(11_111_111), Fixed::from_raw(22_222_222));

        for _ in 0..100 {
            assert_eq!(a + b, a + b);
            assert_eq!(a.length().unwrap(), a.length().unwrap());
            assert_eq!(a.dot(b).unwrap(), a.dot(b).unwrap());
        }
    }
}

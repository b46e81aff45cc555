//! Fixed-Point 3D Vector
//!
//! 3D counterpart to [`FixedVec2`](crate::core::vec2::FixedVec2) for
//! gameplay layers that simulate height (projectile arcs, knock-ups).
//! The reference world is 2D; this type shares the same determinism rules.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::fixed::Fixed;
use crate::sim::error::NumericError;

/// 3D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec3 {
    /// X component
    pub x: Fixed,
    /// Y component
    pub y: Fixed,
    /// Z component
    pub z: Fixed,
}

impl FixedVec3 {
    /// Zero vector
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
        z: Fixed::ZERO,
    };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
            z: Fixed::from_int(z),
        }
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Result<Self, NumericError> {
        Ok(Self {
            x: self.x.checked_mul(scalar)?,
            y: self.y.checked_mul(scalar)?,
            z: self.z.checked_mul(scalar)?,
        })
    }

    /// Divide by a fixed-point scalar.
    #[inline]
    pub fn div_scalar(self, scalar: Fixed) -> Result<Self, NumericError> {
        Ok(Self {
            x: self.x.checked_div(scalar)?,
            y: self.y.checked_div(scalar)?,
            z: self.z.checked_div(scalar)?,
        })
    }

    /// Squared length (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> Result<Fixed, NumericError> {
        self.x
            .checked_mul(self.x)?
            .checked_add(self.y.checked_mul(self.y)?)?
            .checked_add(self.z.checked_mul(self.z)?)
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
            .checked_add(self.y.checked_mul(other.y)?)?
            .checked_add(self.z.checked_mul(other.z)?)
    }

    /// Cross product with another vector.
    #[inline]
    pub fn cross(self, other: Self) -> Result<Self, NumericError> {
        Ok(Self {
            x: self.y.checked_mul(other.z)?.checked_sub(self.z.checked_mul(other.y)?)?,
            y: self.z.checked_mul(other.x)?.checked_sub(self.x.checked_mul(other.z)?)?,
            z: self.x.checked_mul(other.y)?.checked_sub(self.y.checked_mul(other.x)?)?,
        })
    }

    /// Linear interpolation between two vectors.
    #[inline]
    pub fn lerp(self, other: Self, t: Fixed) -> Result<Self, NumericError> {
        Ok(Self {
            x: self.x.lerp(other.x, t)?,
            y: self.y.lerp(other.y, t)?,
            z: self.z.lerp(other.z, t)?,
        })
    }
}

impl Add for FixedVec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for FixedVec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Neg for FixedVec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl fmt::Debug for FixedVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vec3({:.3}, {:.3}, {:.3})",
            self.x.to_f64(),
            self.y.to_f64(),
            self.z.to_f64()
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

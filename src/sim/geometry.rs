//! Narrow-Phase Collision Geometry
//!
//! Pure functions over fixed-point shapes. No shape-pair state is
//! retained between calls: callers combine [`SpatialIndex`] candidate
//! pairs with these tests to obtain exact collisions, then apply their
//! own response logic.
//!
//! Boolean tests compare squared distances and avoid square roots
//! entirely; the detailed contact tests take one bounded-error root for
//! the separation normal.
//!
//! [`SpatialIndex`]: crate::sim::spatial::SpatialIndex

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::sim::error::NumericError;

/// A circle defined by center and radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    /// Center position.
    pub center: FixedVec2,
    /// Radius (non-negative).
    pub radius: Fixed,
}

impl Circle {
    /// Create a circle.
    pub const fn new(center: FixedVec2, radius: Fixed) -> Self {
        Self { center, radius }
    }
}

/// An axis-aligned box defined by center and half-extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    /// Center position.
    pub center: FixedVec2,
    /// Half-extents (non-negative per component).
    pub half_extents: FixedVec2,
}

impl Aabb {
    /// Create a box from center and half-extents.
    pub const fn new(center: FixedVec2, half_extents: FixedVec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> FixedVec2 {
        self.center - self.half_extents
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> FixedVec2 {
        self.center + self.half_extents
    }

    /// True if the point lies inside or on the boundary.
    #[inline]
    pub fn contains(&self, point: FixedVec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Closest point on or inside the box to `point`.
    #[inline]
    pub fn closest_point(&self, point: FixedVec2) -> FixedVec2 {
        let min = self.min();
        let max = self.max();
        FixedVec2::new(point.x.clamp(min.x, max.x), point.y.clamp(min.y, max.y))
    }
}

/// Contact details for a detected intersection.
///
/// The normal points from the first shape toward the second and has
/// approximately unit length (one bounded-error root).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Representative contact point.
    pub point: FixedVec2,
    /// Separation normal, first shape -> second shape.
    pub normal: FixedVec2,
    /// Penetration depth along the normal.
    pub penetration: Fixed,
}

/// Boolean circle/circle test via squared distances.
#[inline]
pub fn circle_circle_intersects(a: &Circle, b: &Circle) -> Result<bool, NumericError> {
    let combined = a.radius.checked_add(b.radius)?;
    let combined_sq = combined.checked_mul(combined)?;
    Ok(a.center.distance_squared(b.center)? <= combined_sq)
}

/// Detailed circle/circle test.
///
/// Returns `None` when the circles do not overlap. Coincident centers
/// get a fixed +X normal so both peers resolve the degenerate case
/// identically.
pub fn circle_circle_contact(a: &Circle, b: &Circle) -> Result<Option<Contact>, NumericError> {
    let combined = a.radius.checked_add(b.radius)?;
    let combined_sq = combined.checked_mul(combined)?;
    let dist_sq = a.center.distance_squared(b.center)?;
    if dist_sq > combined_sq {
        return Ok(None);
    }

    let delta = b.center - a.center;
    let dist = dist_sq.sqrt()?;

    let normal = if dist.is_zero() {
        FixedVec2::RIGHT
    } else {
        delta.div_scalar(dist)?
    };

    let penetration = combined.checked_sub(dist)?;

    // Midpoint of the overlap interval along the normal
    let half_pen = penetration.checked_div(Fixed::from_int(2))?;
    let offset = a.radius.checked_sub(half_pen)?;
    let point = a.center + normal.scale(offset)?;

    Ok(Some(Contact {
        point,
        normal,
        penetration,
    }))
}

/// Boolean circle/box test via the closest-point construction.
#[inline]
pub fn circle_aabb_intersects(circle: &Circle, aabb: &Aabb) -> Result<bool, NumericError> {
    let closest = aabb.closest_point(circle.center);
    let radius_sq = circle.radius.checked_mul(circle.radius)?;
    Ok(circle.center.distance_squared(closest)? <= radius_sq)
}

/// Detailed circle/box test.
///
/// The normal points from the box toward the circle. A circle center
/// inside the box is pushed out along the axis of least penetration,
/// breaking ties toward X so the choice is identical on every peer.
pub fn circle_aabb_contact(circle: &Circle, aabb: &Aabb) -> Result<Option<Contact>, NumericError> {
    let closest = aabb.closest_point(circle.center);
    let delta = circle.center - closest;
    let dist_sq = delta.length_squared()?;
    let radius_sq = circle.radius.checked_mul(circle.radius)?;

    if dist_sq > radius_sq {
        return Ok(None);
    }

    if !dist_sq.is_zero() {
        // Center outside the box: normal along center - closest point
        let dist = dist_sq.sqrt()?;
        let normal = delta.div_scalar(dist)?;
        let penetration = circle.radius.checked_sub(dist)?;
        return Ok(Some(Contact {
            point: closest,
            normal,
            penetration,
        }));
    }

    // Center inside the box: push out along the shallowest face
    let min = aabb.min();
    let max = aabb.max();
    let left = circle.center.x.checked_sub(min.x)?;
    let right = max.x.checked_sub(circle.center.x)?;
    let down = circle.center.y.checked_sub(min.y)?;
    let up = max.y.checked_sub(circle.center.y)?;

    let x_depth = left.min(right);
    let y_depth = down.min(up);

    let (normal, face_depth) = if x_depth <= y_depth {
        if left <= right {
            (-FixedVec2::RIGHT, left)
        } else {
            (FixedVec2::RIGHT, right)
        }
    } else if down <= up {
        (-FixedVec2::UP, down)
    } else {
        (FixedVec2::UP, up)
    };

    Ok(Some(Contact {
        point: circle.center,
        normal,
        penetration: face_depth.checked_add(circle.radius)?,
    }))
}

/// Boolean box/box overlap test.
#[inline]
pub fn aabb_aabb_intersects(a: &Aabb, b: &Aabb) -> Result<bool, NumericError> {
    let dx = (a.center.x.checked_sub(b.center.x)?).abs();
    let dy = (a.center.y.checked_sub(b.center.y)?).abs();
    Ok(dx <= a.half_extents.x.checked_add(b.half_extents.x)?
        && dy <= a.half_extents.y.checked_add(b.half_extents.y)?)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: i64, y: i64, r: i64) -> Circle {
        Circle::new(FixedVec2::from_ints(x, y), Fixed::from_int(r))
    }

    #[test]
    fn test_circle_circle_intersects() {
        let a = circle(0, 0, 1);
        let b = circle(1, 0, 1); // distance 1, combined radius 2
        let c = circle(5, 0, 1);

        assert!(circle_circle_intersects(&a, &b).unwrap());
        assert!(!circle_circle_intersects(&a, &c).unwrap());

        // Exactly touching counts as intersecting
        let d = circle(2, 0, 1);
        assert!(circle_circle_intersects(&a, &d).unwrap());
    }

    #[test]
    fn test_circle_circle_contact() {
        let a = circle(0, 0, 1);
        let b = circle(1, 0, 1);

        let contact = circle_circle_contact(&a, &b).unwrap().unwrap();

        // Normal points from a toward b (+X)
        assert!((contact.normal.x - Fixed::ONE).abs().raw() < 1_000);
        assert!(contact.normal.y.abs().raw() < 1_000);

        // Penetration: combined radius 2 - distance 1 = 1
        assert!((contact.penetration - Fixed::ONE).abs().raw() < 1_000);

        // Separated circles produce no contact
        assert!(circle_circle_contact(&a, &circle(5, 0, 1)).unwrap().is_none());
    }

    #[test]
    fn test_circle_circle_coincident_centers() {
        let a = circle(3, 3, 1);
        let b = circle(3, 3, 2);

        let contact = circle_circle_contact(&a, &b).unwrap().unwrap();
        assert_eq!(contact.normal, FixedVec2::RIGHT);
        assert_eq!(contact.penetration, Fixed::from_int(3));
    }

    #[test]
    fn test_circle_aabb_intersects() {
        let aabb = Aabb::new(FixedVec2::ZERO, FixedVec2::from_ints(2, 2));

        assert!(circle_aabb_intersects(&circle(0, 0, 1), &aabb).unwrap());
        assert!(circle_aabb_intersects(&circle(3, 0, 2), &aabb).unwrap());
        assert!(!circle_aabb_intersects(&circle(5, 5, 1), &aabb).unwrap());

        // Corner case: circle near corner within radius
        let corner = Circle::new(
            FixedVec2::new(Fixed::from_parts(2, 500_000), Fixed::from_parts(2, 500_000)),
            Fixed::ONE,
        );
        assert!(circle_aabb_intersects(&corner, &aabb).unwrap());
    }

    #[test]
    fn test_circle_aabb_contact_outside() {
        let aabb = Aabb::new(FixedVec2::ZERO, FixedVec2::from_ints(2, 2));
        let c = circle(4, 0, 3); // closest point (2,0), distance 2, radius 3

        let contact = circle_aabb_contact(&c, &aabb).unwrap().unwrap();

        // Normal from box toward circle (+X)
        assert!((contact.normal.x - Fixed::ONE).abs().raw() < 1_000);
        assert_eq!(contact.point, FixedVec2::from_ints(2, 0));
        assert!((contact.penetration - Fixed::ONE).abs().raw() < 1_000);
    }

    #[test]
    fn test_circle_aabb_contact_center_inside() {
        let aabb = Aabb::new(FixedVec2::ZERO, FixedVec2::from_ints(4, 2));
        // Nearest face is +Y (distance 1 vs 3 horizontally)
        let c = circle(1, 1, 1);

        let contact = circle_aabb_contact(&c, &aabb).unwrap().unwrap();
        assert_eq!(contact.normal, FixedVec2::UP);
        assert_eq!(contact.penetration, Fixed::from_int(2)); // face depth 1 + radius 1
    }

    #[test]
    fn test_circle_aabb_inside_tie_breaks_x() {
        let aabb = Aabb::new(FixedVec2::ZERO, FixedVec2::from_ints(2, 2));
        let c = circle(0, 0, 1); // equidistant from all faces

        let contact = circle_aabb_contact(&c, &aabb).unwrap().unwrap();
        assert_eq!(contact.normal, -FixedVec2::RIGHT);
    }

    #[test]
    fn test_aabb_aabb_intersects() {
        let a = Aabb::new(FixedVec2::ZERO, FixedVec2::from_ints(2, 2));
        let b = Aabb::new(FixedVec2::from_ints(3, 0), FixedVec2::from_ints(2, 2));
        let c = Aabb::new(FixedVec2::from_ints(10, 0), FixedVec2::from_ints(2, 2));

        assert!(aabb_aabb_intersects(&a, &b).unwrap());
        assert!(!aabb_aabb_intersects(&a, &c).unwrap());

        // Touching edges count
        let d = Aabb::new(FixedVec2::from_ints(4, 0), FixedVec2::from_ints(2, 2));
        assert!(aabb_aabb_intersects(&a, &d).unwrap());
    }

    #[test]
    fn test_contact_determinism() {
        let a = Circle::new(
            FixedVec2::new(Fixed::from_raw(123_456), Fixed::from_raw(654_321)),
            Fixed::ONE,
        );
        let b = Circle::new(
            FixedVec2::new(Fixed::from_raw(1_123_456), Fixed::from_raw(904_321)),
            Fixed::ONE,
        );

        let c1 = circle_circle_contact(&a, &b).unwrap();
        let c2 = circle_circle_contact(&a, &b).unwrap();
        assert_eq!(c1, c2);
    }
}

use crate::{Mat4x4, Tuple4};

/// A ray with an origin point and a direction vector.
///
/// Rays are never mutated in place; moving one into another coordinate
/// space goes through [`Ray::transform`], which returns a new ray.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Tuple4,
    pub direction: Tuple4,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Tuple4, direction: Tuple4) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn position(&self, t: f64) -> Tuple4 {
        self.origin + self.direction * t
    }

    /// Apply `m` to both origin and direction.
    ///
    /// Because the direction has `w = 0`, translation only moves the origin.
    #[inline]
    pub fn transform(&self, m: &Mat4x4) -> Ray {
        Ray {
            origin: *m * self.origin,
            direction: *m * self.direction,
        }
    }
}

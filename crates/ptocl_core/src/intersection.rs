//! Intersection records.

use crate::ShapeId;

/// A hit in a primitive's local space, before it is tied to a shape.
///
/// `u`/`v` are barycentric weights for triangles and zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    pub t: f64,
    pub u: f64,
    pub v: f64,
}

impl LocalHit {
    pub fn at(t: f64) -> Self {
        Self { t, u: 0.0, v: 0.0 }
    }
}

/// A ray hit on a specific shape of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Distance along the ray
    pub t: f64,
    /// Shape that was hit
    pub shape: ShapeId,
    /// Barycentric u (triangles only)
    pub u: f64,
    /// Barycentric v (triangles only)
    pub v: f64,
}

impl Intersection {
    pub fn new(t: f64, shape: ShapeId) -> Self {
        Self {
            t,
            shape,
            u: 0.0,
            v: 0.0,
        }
    }

    pub fn from_local(hit: LocalHit, shape: ShapeId) -> Self {
        Self {
            t: hit.t,
            shape,
            u: hit.u,
            v: hit.v,
        }
    }
}

/// Sort hits by distance, nearest first.
pub fn sort_intersections(xs: &mut [Intersection]) {
    xs.sort_by(|a, b| a.t.total_cmp(&b.t));
}

/// The visible hit: the nearest one that is not behind the ray origin.
///
/// `xs` must be sorted by `t`.
pub fn hit(xs: &[Intersection]) -> Option<&Intersection> {
    xs.iter().find(|x| x.t >= 0.0)
}

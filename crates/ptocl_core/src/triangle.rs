//! Triangle primitives.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection. Edges
//! and the face normal are computed once at construction; the compiler
//! copies them verbatim into the triangle records.

use ptocl_math::{BoundingBox, Ray, Tuple4, TupleExt};

use crate::LocalHit;

/// Below this |det| the ray is treated as parallel to the triangle plane.
pub const TRIANGLE_EPSILON: f64 = 1e-11;

/// Möller-Trumbore ray-triangle intersection on precomputed edges.
///
/// `e1 = p2 - p1` and `e2 = p3 - p1`. Returns the hit with its barycentric
/// `(u, v)`; the third weight is `1 - u - v`.
pub fn moller_trumbore(p1: Tuple4, e1: Tuple4, e2: Tuple4, ray: &Ray) -> Option<LocalHit> {
    let dir_cross_e2 = ray.direction.cross(e2);
    let det = e1.dot(dir_cross_e2);

    // Ray is parallel to triangle
    if det.abs() < TRIANGLE_EPSILON {
        return None;
    }

    let f = 1.0 / det;
    let p1_to_origin = ray.origin - p1;
    let u = f * p1_to_origin.dot(dir_cross_e2);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let origin_cross_e1 = p1_to_origin.cross(e1);
    let v = f * ray.direction.dot(origin_cross_e1);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * e2.dot(origin_cross_e1);
    Some(LocalHit { t, u, v })
}

/// Barycentric blend of three vertex normals: `u*n2 + v*n3 + (1-u-v)*n1`.
#[inline]
pub fn interpolate_normal(n1: Tuple4, n2: Tuple4, n3: Tuple4, u: f64, v: f64) -> Tuple4 {
    n2 * u + n3 * v + n1 * (1.0 - u - v)
}

/// A flat-shaded triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p1: Tuple4,
    pub p2: Tuple4,
    pub p3: Tuple4,
    /// p2 - p1
    pub e1: Tuple4,
    /// p3 - p1
    pub e2: Tuple4,
    /// Unit face normal, `normalize(e2 x e1)`
    pub normal: Tuple4,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(p1: Tuple4, p2: Tuple4, p3: Tuple4) -> Self {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e2.cross(e1).normalize();
        Self {
            p1,
            p2,
            p3,
            e1,
            e2,
            normal,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        moller_trumbore(self.p1, self.e1, self.e2, ray)
    }

    /// Hull of the three vertices.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&[self.p1, self.p2, self.p3])
    }

    pub fn centroid(&self) -> Tuple4 {
        (self.p1 + self.p2 + self.p3) / 3.0
    }
}

/// A triangle whose shading normal is interpolated from per-vertex normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothTriangle {
    pub triangle: Triangle,
    pub n1: Tuple4,
    pub n2: Tuple4,
    pub n3: Tuple4,
}

impl SmoothTriangle {
    pub fn new(p1: Tuple4, p2: Tuple4, p3: Tuple4, n1: Tuple4, n2: Tuple4, n3: Tuple4) -> Self {
        Self {
            triangle: Triangle::new(p1, p2, p3),
            n1,
            n2,
            n3,
        }
    }

    pub fn normal_at(&self, u: f64, v: f64) -> Tuple4 {
        interpolate_normal(self.n1, self.n2, self.n3, u, v)
    }
}

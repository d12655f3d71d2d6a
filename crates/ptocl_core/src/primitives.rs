//! Analytic primitives in their canonical object space.
//!
//! - Sphere: unit radius at the origin
//! - Plane: the XZ plane (y = 0)
//! - Cube: axis-aligned, spanning [-1, 1] on every axis
//! - Cylinder: unit radius around the Y axis, optionally truncated and capped
//!
//! Everything here works on an already-transformed local ray; the scene
//! takes care of moving rays and normals between spaces.

use ptocl_math::{point, vector, BoundingBox, Ray, Tuple4};

use crate::LocalHit;

/// Tolerance for parallel rays and cap detection.
pub const SHAPE_EPSILON: f64 = 1e-4;

pub fn intersect_sphere(ray: &Ray, out: &mut Vec<LocalHit>) {
    let sphere_to_ray = ray.origin - point(0.0, 0.0, 0.0);
    let a = ray.direction.dot(ray.direction);
    let b = 2.0 * ray.direction.dot(sphere_to_ray);
    let c = sphere_to_ray.dot(sphere_to_ray) - 1.0;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return;
    }

    let sqrt_d = discriminant.sqrt();
    out.push(LocalHit::at((-b - sqrt_d) / (2.0 * a)));
    out.push(LocalHit::at((-b + sqrt_d) / (2.0 * a)));
}

pub fn sphere_normal(p: Tuple4) -> Tuple4 {
    p - point(0.0, 0.0, 0.0)
}

pub fn intersect_plane(ray: &Ray, out: &mut Vec<LocalHit>) {
    if ray.direction.y.abs() < SHAPE_EPSILON {
        return;
    }
    out.push(LocalHit::at(-ray.origin.y / ray.direction.y));
}

pub fn plane_normal() -> Tuple4 {
    vector(0.0, 1.0, 0.0)
}

pub fn intersect_cube(ray: &Ray, out: &mut Vec<LocalHit>) {
    let mut t_min = f64::NEG_INFINITY;
    let mut t_max = f64::INFINITY;
    for axis in 0..3 {
        let (lo, hi) = check_axis(ray.origin[axis], ray.direction[axis], -1.0, 1.0);
        t_min = t_min.max(lo);
        t_max = t_max.min(hi);
    }

    if t_min > t_max {
        return;
    }
    out.push(LocalHit::at(t_min));
    out.push(LocalHit::at(t_max));
}

/// The face normal is the axis with the largest absolute component.
pub fn cube_normal(p: Tuple4) -> Tuple4 {
    let (ax, ay, az) = (p.x.abs(), p.y.abs(), p.z.abs());
    let max_c = ax.max(ay).max(az);

    if max_c == ax {
        vector(p.x, 0.0, 0.0)
    } else if max_c == ay {
        vector(0.0, p.y, 0.0)
    } else {
        vector(0.0, 0.0, p.z)
    }
}

fn check_axis(origin: f64, direction: f64, min: f64, max: f64) -> (f64, f64) {
    let t_min_numerator = min - origin;
    let t_max_numerator = max - origin;

    let (t_min, t_max) = if direction.abs() >= SHAPE_EPSILON {
        (t_min_numerator / direction, t_max_numerator / direction)
    } else {
        (t_min_numerator * f64::INFINITY, t_max_numerator * f64::INFINITY)
    };

    if t_min > t_max {
        (t_max, t_min)
    } else {
        (t_min, t_max)
    }
}

/// Unit-radius cylinder around the Y axis.
///
/// `min_y`/`max_y` truncate it (exclusive bounds); `closed` adds end caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub min_y: f64,
    pub max_y: f64,
    pub closed: bool,
}

impl Default for Cylinder {
    /// Infinite and open.
    fn default() -> Self {
        Self {
            min_y: f64::NEG_INFINITY,
            max_y: f64::INFINITY,
            closed: false,
        }
    }
}

impl Cylinder {
    pub fn new(min_y: f64, max_y: f64, closed: bool) -> Self {
        Self {
            min_y,
            max_y,
            closed,
        }
    }

    pub fn intersect(&self, ray: &Ray, out: &mut Vec<LocalHit>) {
        let (o, d) = (ray.origin, ray.direction);
        let a = d.x * d.x + d.z * d.z;

        // Rays parallel to the Y axis can only hit the caps.
        if a.abs() >= SHAPE_EPSILON {
            let b = 2.0 * o.x * d.x + 2.0 * o.z * d.z;
            let c = o.x * o.x + o.z * o.z - 1.0;
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return;
            }

            let sqrt_d = discriminant.sqrt();
            let mut t0 = (-b - sqrt_d) / (2.0 * a);
            let mut t1 = (-b + sqrt_d) / (2.0 * a);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            for t in [t0, t1] {
                let y = o.y + t * d.y;
                if self.min_y < y && y < self.max_y {
                    out.push(LocalHit::at(t));
                }
            }
        }

        self.intersect_caps(ray, out);
    }

    fn intersect_caps(&self, ray: &Ray, out: &mut Vec<LocalHit>) {
        if !self.closed || ray.direction.y.abs() < SHAPE_EPSILON {
            return;
        }

        for y in [self.min_y, self.max_y] {
            let t = (y - ray.origin.y) / ray.direction.y;
            if within_cap(ray, t) {
                out.push(LocalHit::at(t));
            }
        }
    }

    pub fn normal_at(&self, p: Tuple4) -> Tuple4 {
        let dist = p.x * p.x + p.z * p.z;
        if dist < 1.0 && p.y >= self.max_y - SHAPE_EPSILON {
            vector(0.0, 1.0, 0.0)
        } else if dist < 1.0 && p.y <= self.min_y + SHAPE_EPSILON {
            vector(0.0, -1.0, 0.0)
        } else {
            vector(p.x, 0.0, p.z)
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_coords(-1.0, self.min_y, -1.0, 1.0, self.max_y, 1.0)
    }
}

fn within_cap(ray: &Ray, t: f64) -> bool {
    let x = ray.origin.x + t * ray.direction.x;
    let z = ray.origin.z + t * ray.direction.z;
    x * x + z * z <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptocl_math::TupleExt;

    fn ts(hits: &[LocalHit]) -> Vec<f64> {
        hits.iter().map(|h| h.t).collect()
    }

    #[test]
    fn test_sphere_two_hits() {
        let mut out = Vec::new();
        intersect_sphere(&Ray::new(point(0.0, 0.0, -5.0), vector(0.0, 0.0, 1.0)), &mut out);
        assert_eq!(ts(&out), vec![4.0, 6.0]);
    }

    #[test]
    fn test_sphere_tangent_and_miss() {
        let mut out = Vec::new();
        intersect_sphere(&Ray::new(point(0.0, 1.0, -5.0), vector(0.0, 0.0, 1.0)), &mut out);
        assert_eq!(ts(&out), vec![5.0, 5.0]);

        out.clear();
        intersect_sphere(&Ray::new(point(0.0, 2.0, -5.0), vector(0.0, 0.0, 1.0)), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_sphere_from_inside() {
        let mut out = Vec::new();
        intersect_sphere(&Ray::new(point(0.0, 0.0, 0.0), vector(0.0, 0.0, 1.0)), &mut out);
        assert_eq!(ts(&out), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_plane_parallel_and_above() {
        let mut out = Vec::new();
        intersect_plane(&Ray::new(point(0.0, 10.0, 0.0), vector(0.0, 0.0, 1.0)), &mut out);
        assert!(out.is_empty());

        intersect_plane(&Ray::new(point(0.0, 1.0, 0.0), vector(0.0, -1.0, 0.0)), &mut out);
        assert_eq!(ts(&out), vec![1.0]);
    }

    #[test]
    fn test_cube_faces() {
        let cases = [
            (point(5.0, 0.5, 0.0), vector(-1.0, 0.0, 0.0), 4.0, 6.0),
            (point(-5.0, 0.5, 0.0), vector(1.0, 0.0, 0.0), 4.0, 6.0),
            (point(0.5, 5.0, 0.0), vector(0.0, -1.0, 0.0), 4.0, 6.0),
            (point(0.5, 0.0, -5.0), vector(0.0, 0.0, 1.0), 4.0, 6.0),
            (point(0.0, 0.5, 0.0), vector(0.0, 0.0, 1.0), -1.0, 1.0),
        ];
        for (origin, direction, t1, t2) in cases {
            let mut out = Vec::new();
            intersect_cube(&Ray::new(origin, direction), &mut out);
            assert_eq!(ts(&out), vec![t1, t2], "origin {origin:?}");
        }
    }

    #[test]
    fn test_cube_miss() {
        let mut out = Vec::new();
        intersect_cube(&Ray::new(point(2.0, 0.0, 2.0), vector(0.0, 0.0, -1.0)), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_cube_normals() {
        assert_eq!(cube_normal(point(1.0, 0.5, -0.8)), vector(1.0, 0.0, 0.0));
        assert_eq!(cube_normal(point(-0.4, 0.3, -1.0)), vector(0.0, 0.0, -1.0));
        assert_eq!(cube_normal(point(0.3, 1.0, -0.7)), vector(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_cylinder_walls() {
        let cyl = Cylinder::default();
        let mut out = Vec::new();
        cyl.intersect(&Ray::new(point(1.0, 0.0, -5.0), vector(0.0, 0.0, 1.0)), &mut out);
        assert_eq!(ts(&out), vec![5.0, 5.0]);

        out.clear();
        cyl.intersect(&Ray::new(point(0.0, 0.0, -5.0), vector(0.0, 0.0, 1.0)), &mut out);
        assert_eq!(ts(&out), vec![4.0, 6.0]);

        out.clear();
        cyl.intersect(&Ray::new(point(0.0, 0.0, -5.0), vector(0.0, 1.0, 0.0)), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_truncated_cylinder() {
        let cyl = Cylinder::new(1.0, 2.0, false);
        let cases = [
            (point(0.0, 1.5, 0.0), vector(0.1, 1.0, 0.0), 0),
            (point(0.0, 3.0, -5.0), vector(0.0, 0.0, 1.0), 0),
            (point(0.0, 2.0, -5.0), vector(0.0, 0.0, 1.0), 0),
            (point(0.0, 1.0, -5.0), vector(0.0, 0.0, 1.0), 0),
            (point(0.0, 1.5, -2.0), vector(0.0, 0.0, 1.0), 2),
        ];
        for (origin, direction, count) in cases {
            let mut out = Vec::new();
            cyl.intersect(&Ray::new(origin, direction.normalize()), &mut out);
            assert_eq!(out.len(), count, "origin {origin:?}");
        }
    }

    #[test]
    fn test_capped_cylinder() {
        let cyl = Cylinder::new(1.0, 2.0, true);
        let cases = [
            (point(0.0, 3.0, 0.0), vector(0.0, -1.0, 0.0), 2),
            (point(0.0, 3.0, -2.0), vector(0.0, -1.0, 2.0), 2),
            (point(0.0, 4.0, -2.0), vector(0.0, -1.0, 1.0), 2),
            (point(0.0, 0.0, -2.0), vector(0.0, 1.0, 2.0), 2),
            (point(0.0, -1.0, -2.0), vector(0.0, 1.0, 1.0), 2),
        ];
        for (origin, direction, count) in cases {
            let mut out = Vec::new();
            cyl.intersect(&Ray::new(origin, direction.normalize()), &mut out);
            assert_eq!(out.len(), count, "origin {origin:?}");
        }
    }

    #[test]
    fn test_cylinder_normals() {
        let cyl = Cylinder::new(1.0, 2.0, true);
        assert_eq!(cyl.normal_at(point(0.0, 1.0, 0.0)), vector(0.0, -1.0, 0.0));
        assert_eq!(cyl.normal_at(point(0.5, 2.0, 0.0)), vector(0.0, 1.0, 0.0));
        assert!(cyl
            .normal_at(point(1.0, 1.5, 0.0))
            .approx_eq(&vector(1.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn test_cylinder_bounds() {
        let bbox = Cylinder::new(-5.0, 3.0, true).bounds();
        assert_eq!(bbox.min, point(-1.0, -5.0, -1.0));
        assert_eq!(bbox.max, point(1.0, 3.0, 1.0));
    }
}

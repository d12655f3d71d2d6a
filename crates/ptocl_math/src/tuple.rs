//! Homogeneous 4-component tuples.
//!
//! A point has `w = 1`, a vector has `w = 0`. Since the fourth component
//! rides along through every operator, point - point yields a vector and
//! point + vector yields a point without any bookkeeping.
//!
//! `glam::DVec4` already provides add/sub/scale/dot/length/normalize; this
//! module adds constructors and the 3D cross product.

use glam::DVec4;

/// A homogeneous tuple (x, y, z, w).
pub type Tuple4 = DVec4;

/// Tolerance for approximate float comparisons.
pub const EPSILON: f64 = 1e-5;

/// Create a point (`w = 1`).
#[inline]
pub const fn point(x: f64, y: f64, z: f64) -> Tuple4 {
    DVec4::new(x, y, z, 1.0)
}

/// Create a vector (`w = 0`).
#[inline]
pub const fn vector(x: f64, y: f64, z: f64) -> Tuple4 {
    DVec4::new(x, y, z, 0.0)
}

/// Create an RGB color. Colors are stored with `w = 0` so they scale and add like vectors.
#[inline]
pub const fn color(r: f64, g: f64, b: f64) -> Tuple4 {
    DVec4::new(r, g, b, 0.0)
}

/// Compare two floats within [`EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Operations on [`Tuple4`] that glam does not provide for 4D vectors.
pub trait TupleExt {
    /// True when `w == 1`.
    fn is_point(&self) -> bool;

    /// True when `w == 0`.
    fn is_vector(&self) -> bool;

    /// Cross product of the xyz parts. The result is always a vector.
    fn cross(self, other: Tuple4) -> Tuple4;

    /// Normalize the xyz parts and force `w = 0`.
    ///
    /// Transforming a normal by an inverse-transpose can leave garbage in `w`,
    /// so normals go through this instead of plain `normalize`.
    fn to_unit_vector(self) -> Tuple4;

    /// Componentwise comparison within `eps`.
    fn approx_eq(&self, other: &Tuple4, eps: f64) -> bool;
}

impl TupleExt for Tuple4 {
    #[inline]
    fn is_point(&self) -> bool {
        self.w == 1.0
    }

    #[inline]
    fn is_vector(&self) -> bool {
        self.w == 0.0
    }

    #[inline]
    fn cross(self, other: Tuple4) -> Tuple4 {
        vector(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    fn to_unit_vector(self) -> Tuple4 {
        let v = vector(self.x, self.y, self.z);
        v / v.length()
    }

    fn approx_eq(&self, other: &Tuple4, eps: f64) -> bool {
        (*self - *other).abs().max_element() < eps
    }
}

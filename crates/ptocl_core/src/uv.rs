//! Texture coordinates for spheres and cubes.
//!
//! Both mappings take an object-space point on the surface and return
//! `(u, v)` with `v = 0` at the bottom.

use std::f64::consts::PI;

use ptocl_math::Tuple4;

/// Map a point on the unit sphere to `(u, v)`.
///
/// `u` grows counter-clockwise seen from above, starting at `-z`; `v` runs
/// from the south pole (0) to the north pole (1).
pub fn spherical_map(p: Tuple4) -> (f64, f64) {
    let theta = p.x.atan2(p.z);
    let radius = p.truncate().length();
    let phi = (p.y / radius).acos();

    let raw_u = theta / (2.0 * PI);
    (1.0 - (raw_u + 0.5), 1.0 - phi / PI)
}

/// One face of the canonical `[-1, 1]` cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Right,
    Left,
    Up,
    Down,
    Front,
    Back,
}

impl CubeFace {
    /// The face whose axis has the largest absolute coordinate.
    ///
    /// Ties resolve in the order right, left, up, down, front, back.
    pub fn from_point(p: Tuple4) -> Self {
        let coord = p.x.abs().max(p.y.abs()).max(p.z.abs());
        if coord == p.x {
            CubeFace::Right
        } else if coord == -p.x {
            CubeFace::Left
        } else if coord == p.y {
            CubeFace::Up
        } else if coord == -p.y {
            CubeFace::Down
        } else if coord == p.z {
            CubeFace::Front
        } else {
            CubeFace::Back
        }
    }

    /// `(u, v)` of `p` within this face.
    pub fn uv(self, p: Tuple4) -> (f64, f64) {
        let wrap = |x: f64| (x % 2.0) / 2.0;
        match self {
            CubeFace::Front => (wrap(p.x + 1.0), wrap(p.y + 1.0)),
            CubeFace::Back => (wrap(1.0 - p.x), wrap(p.y + 1.0)),
            CubeFace::Left => (wrap(p.z + 1.0), wrap(p.y + 1.0)),
            CubeFace::Right => (wrap(1.0 - p.z), wrap(p.y + 1.0)),
            CubeFace::Up => (wrap(p.x + 1.0), wrap(1.0 - p.z)),
            CubeFace::Down => (wrap(p.x + 1.0), wrap(p.z + 1.0)),
        }
    }
}

/// Face and face-local `(u, v)` of a point on the cube.
pub fn cube_uv(p: Tuple4) -> (CubeFace, f64, f64) {
    let face = CubeFace::from_point(p);
    let (u, v) = face.uv(p);
    (face, u, v)
}

/// Test pattern for checking texture orientation: one color per corner,
/// `main` everywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignCheck {
    pub main: Tuple4,
    pub upper_left: Tuple4,
    pub upper_right: Tuple4,
    pub bottom_left: Tuple4,
    pub bottom_right: Tuple4,
}

impl AlignCheck {
    pub fn color_at(&self, u: f64, v: f64) -> Tuple4 {
        if v > 0.8 {
            if u < 0.2 {
                return self.upper_left;
            }
            if u > 0.8 {
                return self.upper_right;
            }
        } else if v < 0.2 {
            if u < 0.2 {
                return self.bottom_left;
            }
            if u > 0.8 {
                return self.bottom_right;
            }
        }
        self.main
    }
}

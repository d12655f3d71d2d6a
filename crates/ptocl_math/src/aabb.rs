use crate::{point, Mat4x4, Ray, Tuple4};

/// Axis-aligned bounding box described by its `min` and `max` corner points.
///
/// The empty box uses `min = +inf`, `max = -inf` so that adding any point or
/// merging any box produces exactly that point or box. Planes produce boxes
/// with infinite extents; every operation here tolerates that.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Tuple4,
    pub max: Tuple4,
}

impl BoundingBox {
    /// A box containing nothing.
    pub const EMPTY: BoundingBox = BoundingBox {
        min: point(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        max: point(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// Create a box from its two corners. `min` must not exceed `max`.
    pub fn new(min: Tuple4, max: Tuple4) -> Self {
        Self { min, max }
    }

    /// Create a box from corner coordinates.
    pub fn from_coords(x1: f64, y1: f64, z1: f64, x2: f64, y2: f64, z2: f64) -> Self {
        Self::new(point(x1, y1, z1), point(x2, y2, z2))
    }

    /// Smallest box containing every point in `points`.
    pub fn from_points(points: &[Tuple4]) -> Self {
        let mut bbox = Self::EMPTY;
        for p in points {
            bbox.add(*p);
        }
        bbox
    }

    /// True if no point has been added (or the corners are inverted).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extend the box to include `p`.
    ///
    /// NaN components are ignored (`f64::min`/`max` semantics), which is
    /// what keeps transformed infinite boxes well-formed.
    pub fn add(&mut self, p: Tuple4) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Extend the box to include `other`. Merging an empty box is a no-op.
    pub fn merge_with(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.add(other.min);
        self.add(other.max);
    }

    /// Box surrounding both inputs.
    pub fn merged(mut self, other: &BoundingBox) -> BoundingBox {
        self.merge_with(other);
        self
    }

    pub fn contains_point(&self, p: Tuple4) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// Every box contains the empty box.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.is_empty() || (self.contains_point(other.min) && self.contains_point(other.max))
    }

    /// Size along each axis.
    pub fn extent(&self) -> Tuple4 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Tuple4 {
        point(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties go to the later axis: Z beats Y beats X.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Bound the box after transforming it by `m`.
    ///
    /// All eight corners are transformed and re-bounded, so a rotated box
    /// comes back larger than the tightest possible fit.
    pub fn transform(&self, m: &Mat4x4) -> BoundingBox {
        if self.is_empty() {
            return BoundingBox::EMPTY;
        }

        let (lo, hi) = (self.min, self.max);
        let corners = [
            point(lo.x, lo.y, lo.z),
            point(lo.x, lo.y, hi.z),
            point(lo.x, hi.y, lo.z),
            point(lo.x, hi.y, hi.z),
            point(hi.x, lo.y, lo.z),
            point(hi.x, lo.y, hi.z),
            point(hi.x, hi.y, lo.z),
            point(hi.x, hi.y, hi.z),
        ];

        let mut out = BoundingBox::EMPTY;
        for corner in corners {
            out.add(transform_corner(m, corner));
        }
        out
    }

    /// Slab-method ray test.
    ///
    /// A zero direction component turns into an infinite slab distance
    /// instead of a division error. Hits behind the origin do not count.
    pub fn intersects(&self, ray: &Ray) -> bool {
        if self.is_empty() {
            return false;
        }

        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;

        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // NaN (origin on a face of a parallel slab) leaves the interval alone.
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return false;
            }
        }

        t_far >= 0.0
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// `m * p`, skipping zero coefficients so `0 * inf` never turns into NaN.
fn transform_corner(m: &Mat4x4, p: Tuple4) -> Tuple4 {
    let mut out = Tuple4::ZERO;
    for row in 0..4 {
        let mut sum = 0.0;
        for col in 0..4 {
            let coeff = m.get(row, col);
            if coeff != 0.0 {
                sum += coeff * p[col];
            }
        }
        out[row] = sum;
    }
    out
}

// Transform constructors for Mat4x4
//
// Rotation, scale and translation come from glam (column-major) and are
// converted to our row-major layout. Shearing and the camera view transform
// have no glam equivalent with the conventions the renderer uses, so they
// are written out directly.

use glam::{DMat4, DVec3};

use crate::{Mat4x4, Tuple4, TupleExt};

/// Translation matrix. Moves points; vectors (`w = 0`) are unaffected.
pub fn translation(x: f64, y: f64, z: f64) -> Mat4x4 {
    DMat4::from_translation(DVec3::new(x, y, z)).into()
}

pub fn scaling(x: f64, y: f64, z: f64) -> Mat4x4 {
    DMat4::from_scale(DVec3::new(x, y, z)).into()
}

/// Right-handed rotation around the X axis, in radians.
pub fn rotation_x(radians: f64) -> Mat4x4 {
    DMat4::from_rotation_x(radians).into()
}

/// Right-handed rotation around the Y axis, in radians.
pub fn rotation_y(radians: f64) -> Mat4x4 {
    DMat4::from_rotation_y(radians).into()
}

/// Right-handed rotation around the Z axis, in radians.
pub fn rotation_z(radians: f64) -> Mat4x4 {
    DMat4::from_rotation_z(radians).into()
}

/// Shearing: each component moves in proportion to the other two.
///
/// `xy` is "x in proportion to y", and so on.
pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64) -> Mat4x4 {
    Mat4x4::from_rows([
        [1.0, xy, xz, 0.0],
        [yx, 1.0, yz, 0.0],
        [zx, zy, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// World-to-eye transform for a camera at `from` looking at `to`.
///
/// The eye looks down -Z with `up` roughly along +Y.
pub fn view_transform(from: Tuple4, to: Tuple4, up: Tuple4) -> Mat4x4 {
    let forward = (to - from).to_unit_vector();
    let left = forward.cross(up.to_unit_vector());
    let true_up = left.cross(forward);

    let orientation = Mat4x4::from_rows([
        [left.x, left.y, left.z, 0.0],
        [true_up.x, true_up.y, true_up.z, 0.0],
        [-forward.x, -forward.y, -forward.z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    orientation * translation(-from.x, -from.y, -from.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{point, vector};
    use std::f64::consts::PI;

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = translation(5.0, -3.0, 2.0);
        assert_eq!(t * point(-3.0, 4.0, 5.0), point(2.0, 1.0, 7.0));
        assert_eq!(t * vector(-3.0, 4.0, 5.0), vector(-3.0, 4.0, 5.0));

        let inv = t.inverse().unwrap();
        assert_eq!(inv * point(-3.0, 4.0, 5.0), point(-8.0, 7.0, 3.0));
    }

    #[test]
    fn test_scaling() {
        let s = scaling(2.0, 3.0, 4.0);
        assert_eq!(s * point(-4.0, 6.0, 8.0), point(-8.0, 18.0, 32.0));
        assert_eq!(scaling(-1.0, 1.0, 1.0) * point(2.0, 3.0, 4.0), point(-2.0, 3.0, 4.0));
    }

    #[test]
    fn test_rotations_follow_right_hand_rule() {
        let p = rotation_x(PI / 2.0) * point(0.0, 1.0, 0.0);
        assert!(p.approx_eq(&point(0.0, 0.0, 1.0), 1e-9));

        let p = rotation_y(PI / 2.0) * point(0.0, 0.0, 1.0);
        assert!(p.approx_eq(&point(1.0, 0.0, 0.0), 1e-9));

        let p = rotation_z(PI / 2.0) * point(0.0, 1.0, 0.0);
        assert!(p.approx_eq(&point(-1.0, 0.0, 0.0), 1e-9));
    }

    #[test]
    fn test_shearing() {
        let p = point(2.0, 3.0, 4.0);
        assert_eq!(shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0) * p, point(5.0, 3.0, 4.0));
        assert_eq!(shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0) * p, point(2.0, 3.0, 7.0));
    }

    #[test]
    fn test_chained_transforms_apply_in_reverse_order() {
        let t = translation(10.0, 5.0, 7.0) * scaling(5.0, 5.0, 5.0) * rotation_x(PI / 2.0);
        assert!((t * point(1.0, 0.0, 1.0)).approx_eq(&point(15.0, 0.0, 7.0), 1e-9));
    }

    #[test]
    fn test_view_transform_default_orientation() {
        let t = view_transform(point(0.0, 0.0, 0.0), point(0.0, 0.0, -1.0), vector(0.0, 1.0, 0.0));
        assert!(t.approx_eq(&Mat4x4::IDENTITY, 1e-12));

        let t = view_transform(point(0.0, 0.0, 8.0), point(0.0, 0.0, 0.0), vector(0.0, 1.0, 0.0));
        assert!(t.approx_eq(&translation(0.0, 0.0, -8.0), 1e-12));
    }

    #[test]
    fn test_view_transform_arbitrary() {
        let t = view_transform(point(1.0, 3.0, 2.0), point(4.0, -2.0, 8.0), vector(1.0, 1.0, 0.0));
        let expected = Mat4x4::from_rows([
            [-0.50709, 0.50709, 0.67612, -2.36643],
            [0.76772, 0.60609, 0.12122, -2.82843],
            [-0.35857, 0.59761, -0.71714, 0.00000],
            [0.00000, 0.00000, 0.00000, 1.00000],
        ]);
        assert!(t.approx_eq(&expected, 1e-5));
    }
}

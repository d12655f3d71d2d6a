//! Pinhole camera with optional depth-of-field parameters.

use ptocl_math::{point, vector, view_transform, Mat4x4, Ray, Tuple4, TupleExt};

use crate::CoreResult;

/// Maps pixels to world-space rays.
///
/// The camera sits at the origin of its own space looking down -Z at a
/// canvas one unit away; `transform` (a view transform) places it in the
/// world. Pixel (0, 0) is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
    /// Horizontal field of view in radians (vertical when taller than wide)
    pub fov: f64,
    pub pixel_size: f64,
    pub half_width: f64,
    pub half_height: f64,
    /// Lens aperture; 0 disables depth of field
    pub aperture: f64,
    /// Distance to the plane of perfect focus
    pub focal_length: f64,
    transform: Mat4x4,
    inverse: Mat4x4,
}

impl Camera {
    /// Create a camera at the origin looking down -Z.
    pub fn new(width: u32, height: u32, fov: f64) -> Self {
        let half_view = (fov / 2.0).tan();
        let aspect = width as f64 / height as f64;
        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        Self {
            width,
            height,
            fov,
            pixel_size: half_width * 2.0 / width as f64,
            half_width,
            half_height,
            aperture: 0.0,
            focal_length: 0.0,
            transform: Mat4x4::IDENTITY,
            inverse: Mat4x4::IDENTITY,
        }
    }

    /// Place the camera at `from`, looking at `to` with +Y up.
    pub fn look_at(self, from: Tuple4, to: Tuple4) -> CoreResult<Self> {
        self.with_transform(view_transform(from, to, vector(0.0, 1.0, 0.0)))
    }

    /// Replace the view transform.
    pub fn with_transform(mut self, transform: Mat4x4) -> CoreResult<Self> {
        self.inverse = transform.inverse()?;
        self.transform = transform;
        Ok(self)
    }

    pub fn with_aperture(mut self, aperture: f64) -> Self {
        self.aperture = aperture;
        self
    }

    pub fn with_focal_length(mut self, focal_length: f64) -> Self {
        self.focal_length = focal_length;
        self
    }

    pub fn transform(&self) -> &Mat4x4 {
        &self.transform
    }

    pub fn inverse(&self) -> &Mat4x4 {
        &self.inverse
    }

    /// Ray through pixel (`px`, `py`), offset by (`dx`, `dy`) within the pixel.
    ///
    /// `(0.5, 0.5)` is the pixel center.
    pub fn ray_for_pixel(&self, px: u32, py: u32, dx: f64, dy: f64) -> Ray {
        ray_for_pixel(
            &self.inverse,
            self.pixel_size,
            self.half_width,
            self.half_height,
            px as f64 + dx,
            py as f64 + dy,
        )
    }
}

/// Shared by [`Camera`] and consumers that only hold the raw camera fields.
pub fn ray_for_pixel(
    inverse: &Mat4x4,
    pixel_size: f64,
    half_width: f64,
    half_height: f64,
    x: f64,
    y: f64,
) -> Ray {
    let world_x = half_width - x * pixel_size;
    let world_y = half_height - y * pixel_size;

    let pixel = *inverse * point(world_x, world_y, -1.0);
    let origin = *inverse * point(0.0, 0.0, 0.0);
    Ray::new(origin, (pixel - origin).to_unit_vector())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptocl_math::{rotation_y, translation};
    use std::f64::consts::PI;

    #[test]
    fn test_pixel_size() {
        assert!((Camera::new(200, 125, PI / 2.0).pixel_size - 0.01).abs() < 1e-9);
        assert!((Camera::new(125, 200, PI / 2.0).pixel_size - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_ray_through_center() {
        let c = Camera::new(201, 101, PI / 2.0);
        let r = c.ray_for_pixel(100, 50, 0.5, 0.5);
        assert!(r.origin.approx_eq(&point(0.0, 0.0, 0.0), 1e-9));
        assert!(r.direction.approx_eq(&vector(0.0, 0.0, -1.0), 1e-9));
    }

    #[test]
    fn test_ray_through_corner() {
        let c = Camera::new(201, 101, PI / 2.0);
        let r = c.ray_for_pixel(0, 0, 0.5, 0.5);
        assert!(r.direction.approx_eq(&vector(0.66519, 0.33259, -0.66851), 1e-5));
    }

    #[test]
    fn test_ray_with_transformed_camera() {
        let c = Camera::new(201, 101, PI / 2.0)
            .with_transform(rotation_y(PI / 4.0) * translation(0.0, -2.0, 5.0))
            .unwrap();
        let r = c.ray_for_pixel(100, 50, 0.5, 0.5);
        let s = 2f64.sqrt() / 2.0;
        assert!(r.origin.approx_eq(&point(0.0, 2.0, -5.0), 1e-9));
        assert!(r.direction.approx_eq(&vector(s, 0.0, -s), 1e-9));
    }

    #[test]
    fn test_look_at_sets_inverse() {
        let c = Camera::new(64, 48, PI / 3.0)
            .look_at(point(0.0, 0.1, -1.5), point(0.0, 0.05, 0.0))
            .unwrap();
        assert!((*c.transform() * *c.inverse()).approx_eq(&Mat4x4::IDENTITY, 1e-9));
        assert!(c.ray_for_pixel(32, 24, 0.0, 0.0).origin.approx_eq(&point(0.0, 0.1, -1.5), 1e-9));
    }
}

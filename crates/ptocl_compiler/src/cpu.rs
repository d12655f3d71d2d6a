//! Reference backend that walks the compiled records on the CPU.
//!
//! It only reads the flattened arrays, never the original scene, so it
//! doubles as an end-to-end check of the wire format. Shading is a single
//! first-hit Lambert term against the view direction with an ambient floor.

use ptocl_core::camera::ray_for_pixel;
use ptocl_core::primitives::{
    cube_normal, intersect_cube, intersect_plane, intersect_sphere, plane_normal, sphere_normal,
    SHAPE_EPSILON,
};
use ptocl_core::{interpolate_normal, moller_trumbore, Cylinder, LocalHit};
use ptocl_math::{color, BoundingBox, Mat4x4, Ray, Tuple4, TupleExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::records::{GroupRecord, ObjectKind, ObjectRecord};
use crate::{BackendError, CompiledScene, ComputeBackend, DispatchBatch};

/// Default ambient term.
pub const DEFAULT_AMBIENT: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct CpuBackend {
    ambient: f64,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self {
            ambient: DEFAULT_AMBIENT,
        }
    }
}

/// Closest hit so far, with the normal still in object space.
struct Hit {
    t: f64,
    normal: Tuple4,
    color: Tuple4,
    emission: Tuple4,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ambient(mut self, ambient: f64) -> Self {
        self.ambient = ambient.clamp(0.0, 1.0);
        self
    }

    fn shade(&self, scene: &CompiledScene, ray: &Ray) -> Result<Tuple4, BackendError> {
        let mut best_t = f64::INFINITY;
        let mut shaded = color(0.0, 0.0, 0.0);
        let mut scratch = Vec::new();

        for object in &scene.objects {
            let local_ray = ray.transform(&Mat4x4(object.inverse));
            let Some(hit) = self.hit_object(scene, object, &local_ray, best_t, &mut scratch)? else {
                continue;
            };
            best_t = hit.t;

            let normal = (Mat4x4(object.inverse_transpose) * hit.normal).to_unit_vector();
            let facing = normal.dot(ray.direction).abs();
            shaded = hit.emission + hit.color * (self.ambient + (1.0 - self.ambient) * facing);
        }
        Ok(shaded)
    }

    fn hit_object(
        &self,
        scene: &CompiledScene,
        object: &ObjectRecord,
        ray: &Ray,
        max_t: f64,
        scratch: &mut Vec<LocalHit>,
    ) -> Result<Option<Hit>, BackendError> {
        let kind = object
            .object_kind()
            .ok_or_else(|| BackendError::Rejected(format!("unknown object type {}", object.kind)))?;

        let surface = |normal: Tuple4, t: f64| Hit {
            t,
            normal,
            color: Tuple4::from_array(object.color),
            emission: Tuple4::from_array(object.emission),
        };

        scratch.clear();
        let hit = match kind {
            ObjectKind::Sphere => {
                intersect_sphere(ray, scratch);
                nearest(scratch, max_t).map(|t| surface(sphere_normal(ray.position(t)), t))
            }
            ObjectKind::Plane => {
                intersect_plane(ray, scratch);
                nearest(scratch, max_t).map(|t| surface(plane_normal(), t))
            }
            ObjectKind::Cube => {
                intersect_cube(ray, scratch);
                nearest(scratch, max_t).map(|t| surface(cube_normal(ray.position(t)), t))
            }
            ObjectKind::Cylinder => {
                let cylinder = Cylinder::new(object.min_y, object.max_y, object.closed != 0);
                cylinder.intersect(ray, scratch);
                nearest(scratch, max_t).map(|t| surface(cylinder.normal_at(ray.position(t)), t))
            }
            ObjectKind::Group => {
                let mut best = None;
                let count = (object.child_count.max(0) as usize).min(object.children.len());
                for &root in &object.children[..count] {
                    self.hit_group(scene, root, None, ray, max_t, &mut best)?;
                }
                best
            }
        };
        Ok(hit)
    }

    /// Test a group record and its subtree. `parent` bounds the id: a valid
    /// child always has a smaller id than its parent.
    fn hit_group(
        &self,
        scene: &CompiledScene,
        id: i32,
        parent: Option<i32>,
        ray: &Ray,
        max_t: f64,
        best: &mut Option<Hit>,
    ) -> Result<(), BackendError> {
        if parent.is_some_and(|p| id >= p) || id < 0 {
            return Err(BackendError::Rejected(format!("group {id} is not a valid child id")));
        }
        let group: &GroupRecord = scene
            .groups
            .get(id as usize)
            .ok_or_else(|| BackendError::Rejected(format!("group {id} out of range")))?;

        let bounds = BoundingBox::new(
            Tuple4::from_array(group.bb_min),
            Tuple4::from_array(group.bb_max),
        );
        if !bounds.intersects(ray) {
            return Ok(());
        }

        let triangles = scene
            .triangles
            .get(group.triangle_range())
            .ok_or_else(|| BackendError::Rejected(format!("group {id} triangle slice out of range")))?;
        for tri in triangles {
            let p1 = Tuple4::from_array(tri.p1);
            let e1 = Tuple4::from_array(tri.e1);
            let e2 = Tuple4::from_array(tri.e2);
            let Some(local) = moller_trumbore(p1, e1, e2, ray) else {
                continue;
            };
            let limit = best.as_ref().map_or(max_t, |h| h.t);
            if local.t <= SHAPE_EPSILON || local.t >= limit {
                continue;
            }
            let normal = interpolate_normal(
                Tuple4::from_array(tri.n1),
                Tuple4::from_array(tri.n2),
                Tuple4::from_array(tri.n3),
                local.u,
                local.v,
            );
            *best = Some(Hit {
                t: local.t,
                normal,
                color: Tuple4::from_array(tri.color),
                emission: Tuple4::from_array(group.emission),
            });
        }

        for &child in group.child_groups() {
            self.hit_group(scene, child, Some(id), ray, max_t, best)?;
        }
        Ok(())
    }
}

/// Smallest t in front of the origin and before `max_t`.
fn nearest(hits: &[LocalHit], max_t: f64) -> Option<f64> {
    hits.iter()
        .map(|h| h.t)
        .filter(|&t| t > SHAPE_EPSILON && t < max_t)
        .min_by(f64::total_cmp)
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn dispatch(&self, batch: &DispatchBatch<'_>) -> Result<Vec<f64>, BackendError> {
        if batch.seeds.len() != batch.pixel_count() {
            return Err(BackendError::Rejected(format!(
                "expected {} seeds, got {}",
                batch.pixel_count(),
                batch.seeds.len()
            )));
        }

        let camera = &batch.scene.camera;
        let inverse = Mat4x4(camera.inverse);
        let width = batch.width().max(1) as usize;
        let samples = batch.samples.max(1);

        let mut out = Vec::with_capacity(batch.expected_len());
        for (i, seed) in batch.seeds.iter().enumerate() {
            let x = (i % width) as f64;
            let y = (batch.row_offset as usize + i / width) as f64;
            let mut rng = StdRng::seed_from_u64(seed.to_bits());

            let mut sum = color(0.0, 0.0, 0.0);
            for _ in 0..samples {
                let (dx, dy) = if samples == 1 {
                    (0.5, 0.5)
                } else {
                    (rng.gen::<f64>(), rng.gen::<f64>())
                };
                let ray = ray_for_pixel(
                    &inverse,
                    camera.pixel_size,
                    camera.half_width,
                    camera.half_height,
                    x + dx,
                    y + dy,
                );
                sum += self.shade(batch.scene, &ray)?;
            }
            let c = sum / samples as f64;
            out.extend_from_slice(&[c.x, c.y, c.z, 1.0]);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, render, RenderOptions};
    use ptocl_core::{Camera, Material, Scene, Shape};
    use ptocl_math::{point, rotation_y, translation};
    use std::f64::consts::PI;

    fn single_batch(scene: &CompiledScene) -> DispatchBatch<'_> {
        DispatchBatch {
            scene,
            row_offset: 0,
            rows: scene.height(),
            samples: 1,
            seeds: vec![0.25; (scene.width() * scene.height()) as usize],
        }
    }

    fn pixel(out: &[f64], width: u32, x: u32, y: u32) -> [f64; 4] {
        let i = (y * width + x) as usize * 4;
        [out[i], out[i + 1], out[i + 2], out[i + 3]]
    }

    #[test]
    fn test_sphere_center_is_fully_lit() {
        let mut scene = Scene::new(Camera::new(11, 11, PI / 3.0));
        scene.add_root(
            Shape::sphere()
                .with_transform(translation(0.0, 0.0, -5.0))
                .unwrap()
                .with_material(Material::diffuse(1.0, 0.0, 0.0)),
        );
        let compiled = compile(&scene).unwrap();
        let out = CpuBackend::new().dispatch(&single_batch(&compiled)).unwrap();

        let center = pixel(&out, 11, 5, 5);
        assert!((center[0] - 1.0).abs() < 1e-9);
        assert_eq!(center[1], 0.0);
        assert_eq!(center[3], 1.0);
        assert_eq!(pixel(&out, 11, 0, 0), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_group_triangles_through_records() {
        let mut scene = Scene::new(Camera::new(9, 9, PI / 3.0));
        let root = scene.add_root(
            Shape::group("mesh")
                .with_transform(translation(0.0, 0.0, -3.0))
                .unwrap()
                .with_material(Material::diffuse(0.0, 1.0, 0.0).with_emission(0.0, 0.0, 0.5)),
        );
        let inner = scene
            .insert_child(root, Shape::group("inner").with_transform(rotation_y(PI)).unwrap())
            .unwrap();
        scene
            .insert_child(
                inner,
                Shape::triangle(point(0.0, 1.0, 0.0), point(-1.0, -1.0, 0.0), point(1.0, -1.0, 0.0)),
            )
            .unwrap();
        scene.refresh_bounds(root).unwrap();

        let compiled = compile(&scene).unwrap();
        let out = CpuBackend::new().with_ambient(0.0).dispatch(&single_batch(&compiled)).unwrap();

        let center = pixel(&out, 9, 4, 4);
        assert!((center[1] - 1.0).abs() < 1e-9);
        assert!((center[2] - 0.5).abs() < 1e-9);
        assert_eq!(pixel(&out, 9, 0, 0), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_nearest_object_wins() {
        let mut scene = Scene::new(Camera::new(5, 5, PI / 3.0));
        scene.add_root(
            Shape::cube()
                .with_transform(translation(0.0, 0.0, -10.0))
                .unwrap()
                .with_material(Material::diffuse(0.0, 0.0, 1.0)),
        );
        scene.add_root(
            Shape::sphere()
                .with_transform(translation(0.0, 0.0, -4.0))
                .unwrap()
                .with_material(Material::diffuse(1.0, 0.0, 0.0)),
        );
        let compiled = compile(&scene).unwrap();
        let out = CpuBackend::new().dispatch(&single_batch(&compiled)).unwrap();
        let center = pixel(&out, 5, 2, 2);
        assert!(center[0] > 0.9);
        assert_eq!(center[2], 0.0);
    }

    #[test]
    fn test_seeded_multisample_render_is_deterministic() {
        let mut scene = Scene::new(Camera::new(8, 6, PI / 3.0));
        scene.add_root(Shape::sphere().with_transform(translation(0.0, 0.0, -3.0)).unwrap());
        let compiled = compile(&scene).unwrap();
        let options = RenderOptions {
            samples: 4,
            rows_per_batch: 2,
            seed: Some(99),
        };

        let a = render(&compiled, &CpuBackend::new(), &options).unwrap();
        let b = render(&compiled, &CpuBackend::new(), &options).unwrap();
        assert_eq!(a, b);
        assert!(a.pixels().iter().all(|p| p.w == 1.0));
    }

    #[test]
    fn test_rejects_mismatched_seeds() {
        let mut scene = Scene::new(Camera::new(2, 2, PI / 3.0));
        scene.add_root(Shape::sphere());
        let compiled = compile(&scene).unwrap();
        let mut batch = single_batch(&compiled);
        batch.seeds.pop();
        assert!(matches!(
            CpuBackend::new().dispatch(&batch),
            Err(BackendError::Rejected(_))
        ));
    }

    #[test]
    fn test_rejects_forward_group_reference() {
        let mut scene = Scene::new(Camera::new(2, 2, PI / 3.0));
        let g = scene.add_root(Shape::group("g"));
        let inner = scene.insert_child(g, Shape::group("inner")).unwrap();
        scene
            .insert_child(
                inner,
                Shape::triangle(point(0.0, 1.0, -2.0), point(-1.0, -1.0, -2.0), point(1.0, -1.0, -2.0)),
            )
            .unwrap();
        scene.refresh_bounds(g).unwrap();
        let mut compiled = compile(&scene).unwrap();
        // point the nested group back at its parent
        compiled.groups[0].child_group_count = 1;
        compiled.groups[0].children[0] = 1;

        assert!(matches!(
            CpuBackend::new().dispatch(&single_batch(&compiled)),
            Err(BackendError::Rejected(_))
        ));
    }
}

//! Scene flattening.
//!
//! [`SceneCompiler`] walks each root group depth first. A visited group
//! records the current triangle count as its offset, appends its direct
//! triangles, then flattens its child groups and stores their ids. Group ids
//! are assigned post-order, so a group's children always have smaller ids
//! than the group itself.
//!
//! All counters and output arrays live in the compiler value, so two
//! compilations never share state.

use bytemuck::Zeroable;
use ptocl_core::{CoreError, Material, Scene, ShapeId, ShapeKind};
use ptocl_math::{Mat4x4, Tuple4, TupleExt};

use crate::records::{
    CameraRecord, GroupRecord, ObjectKind, ObjectRecord, TriangleRecord, GROUP_CHILD_CAPACITY,
};
use crate::CompileError;

/// Flattened scene, ready to hand to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScene {
    pub objects: Vec<ObjectRecord>,
    pub triangles: Vec<TriangleRecord>,
    pub groups: Vec<GroupRecord>,
    pub camera: CameraRecord,
}

impl CompiledScene {
    pub fn width(&self) -> u32 {
        self.camera.width.max(0) as u32
    }

    pub fn height(&self) -> u32 {
        self.camera.height.max(0) as u32
    }

    pub fn object_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.objects)
    }

    pub fn triangle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    pub fn group_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.groups)
    }

    pub fn camera_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.camera)
    }
}

/// Flatten `scene` into records.
pub fn compile(scene: &Scene) -> Result<CompiledScene, CompileError> {
    SceneCompiler::new(scene).compile()
}

/// One compilation in progress.
pub struct SceneCompiler<'a> {
    scene: &'a Scene,
    objects: Vec<ObjectRecord>,
    triangles: Vec<TriangleRecord>,
    groups: Vec<GroupRecord>,
}

/// Maps a nested group's local space into its root group's space.
struct Placement {
    to_root: Mat4x4,
    normal_matrix: Mat4x4,
    identity: bool,
}

impl Placement {
    fn root() -> Self {
        Self {
            to_root: Mat4x4::IDENTITY,
            normal_matrix: Mat4x4::IDENTITY,
            identity: true,
        }
    }

    fn nested(&self, transform: &Mat4x4) -> Result<Self, CompileError> {
        let to_root = self.to_root * *transform;
        if to_root.is_identity() {
            return Ok(Self::root());
        }
        let inverse = to_root.inverse().map_err(CoreError::from)?;
        Ok(Self {
            to_root,
            normal_matrix: inverse.transpose(),
            identity: false,
        })
    }

    fn point(&self, p: Tuple4) -> Tuple4 {
        if self.identity {
            p
        } else {
            self.to_root * p
        }
    }

    fn normal(&self, n: Tuple4) -> Tuple4 {
        if self.identity {
            n
        } else {
            (self.normal_matrix * n).to_unit_vector()
        }
    }
}

impl<'a> SceneCompiler<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            objects: Vec::with_capacity(scene.roots().len()),
            triangles: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn compile(mut self) -> Result<CompiledScene, CompileError> {
        for &root in self.scene.roots() {
            let record = self.compile_object(root)?;
            self.objects.push(record);
        }

        log::info!(
            "compiled {} objects, {} triangles, {} groups",
            self.objects.len(),
            self.triangles.len(),
            self.groups.len()
        );

        if self.triangles.is_empty() {
            log::debug!("no triangles in scene, emitting placeholder record");
            self.triangles.push(TriangleRecord::zeroed());
        }
        if self.groups.is_empty() {
            log::debug!("no groups in scene, emitting placeholder record");
            self.groups.push(GroupRecord::zeroed());
        }

        Ok(CompiledScene {
            objects: self.objects,
            triangles: self.triangles,
            groups: self.groups,
            camera: CameraRecord::from(&self.scene.camera),
        })
    }

    fn compile_object(&mut self, id: ShapeId) -> Result<ObjectRecord, CompileError> {
        let shape = self.scene.shape(id)?;
        let material = self.scene.material_of(id);

        let mut record = ObjectRecord::zeroed();
        record.transform = shape.transform().0;
        record.inverse = shape.inverse().0;
        record.inverse_transpose = shape.inverse_transpose().0;
        write_material(&mut record, material);

        let kind = match shape.kind() {
            ShapeKind::Plane => ObjectKind::Plane,
            ShapeKind::Sphere => ObjectKind::Sphere,
            ShapeKind::Cube => ObjectKind::Cube,
            ShapeKind::Cylinder(c) => {
                record.min_y = c.min_y;
                record.max_y = c.max_y;
                record.closed = c.closed as u8;
                ObjectKind::Cylinder
            }
            ShapeKind::Group(_) => {
                record.children[0] = self.compile_group(id, &Placement::root())?;
                record.child_count = 1;
                ObjectKind::Group
            }
            other @ (ShapeKind::Triangle(_) | ShapeKind::SmoothTriangle(_)) => {
                return Err(CompileError::UnsupportedRoot {
                    shape: id,
                    kind: other.name(),
                });
            }
        };
        record.kind = kind.tag();

        let bbox = self.scene.bounds_of(id);
        record.bb_min = bbox.min.to_array();
        record.bb_max = bbox.max.to_array();
        Ok(record)
    }

    /// Flatten `id` and its subtree, returning the group's record id.
    fn compile_group(&mut self, id: ShapeId, placement: &Placement) -> Result<i32, CompileError> {
        let scene = self.scene;
        let material = scene.material_of(id);

        let mut record = GroupRecord::zeroed();
        record.color = material.color.to_array();
        record.emission = material.emission.to_array();
        record.triangle_offset = self.triangles.len() as i32;

        let mut child_groups = Vec::new();
        for &child in scene.children(id) {
            let shape = &scene[child];
            let color = scene.material_of(child).color;
            match shape.kind() {
                ShapeKind::Triangle(t) => {
                    let points = [t.p1, t.p2, t.p3];
                    self.push_triangle(placement, points, t.normal, [t.normal; 3], color)
                }
                ShapeKind::SmoothTriangle(s) => {
                    let t = &s.triangle;
                    let points = [t.p1, t.p2, t.p3];
                    self.push_triangle(placement, points, t.normal, [s.n1, s.n2, s.n3], color)
                }
                ShapeKind::Group(_) => child_groups.push(child),
                other => {
                    return Err(CompileError::UnsupportedGroupChild {
                        group: id,
                        kind: other.name(),
                    })
                }
            }
        }
        record.triangle_count = self.triangles.len() as i32 - record.triangle_offset;

        if child_groups.len() > GROUP_CHILD_CAPACITY {
            return Err(CompileError::TooManyChildren {
                group: id,
                count: child_groups.len(),
                capacity: GROUP_CHILD_CAPACITY,
            });
        }
        for (slot, &child) in child_groups.iter().enumerate() {
            let nested = placement.nested(scene[child].transform())?;
            record.children[slot] = self.compile_group(child, &nested)?;
        }
        record.child_group_count = child_groups.len() as i32;

        let bounds = scene.bounds_of(id);
        let bounds = if placement.identity {
            bounds
        } else {
            bounds.transform(&placement.to_root)
        };
        record.bb_min = bounds.min.to_array();
        record.bb_max = bounds.max.to_array();

        let group_id = self.groups.len() as i32;
        log::debug!(
            "group {group_id} '{}': triangles {}..+{}, children {:?}",
            scene[id].label(),
            record.triangle_offset,
            record.triangle_count,
            record.child_groups()
        );
        self.groups.push(record);
        Ok(group_id)
    }

    fn push_triangle(
        &mut self,
        placement: &Placement,
        points: [Tuple4; 3],
        face_normal: Tuple4,
        normals: [Tuple4; 3],
        color: Tuple4,
    ) {
        let [p1, p2, p3] = points.map(|p| placement.point(p));
        let [n1, n2, n3] = normals.map(|n| placement.normal(n));

        let mut record = TriangleRecord::zeroed();
        record.p1 = p1.to_array();
        record.p2 = p2.to_array();
        record.p3 = p3.to_array();
        record.e1 = (p2 - p1).to_array();
        record.e2 = (p3 - p1).to_array();
        record.n = placement.normal(face_normal).to_array();
        record.n1 = n1.to_array();
        record.n2 = n2.to_array();
        record.n3 = n3.to_array();
        record.color = color.to_array();
        self.triangles.push(record);
    }
}

fn write_material(record: &mut ObjectRecord, material: &Material) {
    record.color = material.color.to_array();
    record.emission = material.emission.to_array();
    record.refractive_index = material.refractive_index;
    record.reflectivity = material.reflectivity;
    if let Some(t) = material.texture {
        record.textured = 1;
        record.texture_index = t.index;
        record.texture_scale_x = t.scale_x;
        record.texture_scale_y = t.scale_y;
    }
    if let Some(nm) = material.normal_map {
        record.normal_mapped = 1;
        record.normal_map_index = nm.index;
        record.normal_map_scale_x = nm.scale_x;
        record.normal_map_scale_y = nm.scale_y;
    }
    record.env_map = material.is_env_map as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptocl_core::{Camera, Shape, TextureBinding};
    use ptocl_math::{point, scaling, translation, vector};
    use std::f64::consts::PI;

    fn camera() -> Camera {
        Camera::new(32, 24, PI / 3.0)
    }

    fn tri(x: f64) -> Shape {
        Shape::triangle(point(x, 1.0, 0.0), point(x - 1.0, 0.0, 0.0), point(x + 1.0, 0.0, 0.0))
    }

    /// Root group with 2 triangles and a nested group holding 3.
    fn nested_scene() -> (Scene, ShapeId, ShapeId) {
        let mut s = Scene::new(camera());
        let root = s.add_root(Shape::group("root").with_material(Material::diffuse(0.9, 0.1, 0.1)));
        s.insert_child(root, tri(0.0)).unwrap();
        s.insert_child(root, tri(2.0)).unwrap();
        let inner = s.insert_child(root, Shape::group("inner")).unwrap();
        for i in 0..3 {
            s.insert_child(inner, tri(10.0 + i as f64)).unwrap();
        }
        (s, root, inner)
    }

    #[test]
    fn test_nested_group_slices() {
        let (s, root, inner) = nested_scene();
        let compiled = compile(&s).unwrap();

        assert_eq!(compiled.triangles.len(), 5);
        assert_eq!(compiled.groups.len(), 2);

        // post-order: the nested group gets id 0, the root group id 1
        let nested = &compiled.groups[0];
        assert_eq!(nested.triangle_offset, 2);
        assert_eq!(nested.triangle_count, 3);
        assert_eq!(nested.child_group_count, 0);

        let top = &compiled.groups[1];
        assert_eq!(top.triangle_offset, 0);
        assert_eq!(top.triangle_count, 2);
        assert_eq!(top.child_groups(), &[0]);

        let object = &compiled.objects[0];
        assert_eq!(object.object_kind(), Some(ObjectKind::Group));
        assert_eq!(object.child_count, 1);
        assert_eq!(object.children[0], 1);

        assert_eq!(nested.bb_min, s.bounds_of(inner).min.to_array());
        assert_eq!(nested.bb_max, s.bounds_of(inner).max.to_array());
        assert_eq!(top.bb_min, s.bounds_of(root).min.to_array());
        assert_eq!(top.bb_max, s.bounds_of(root).max.to_array());
    }

    #[test]
    fn test_triangle_slices_do_not_overlap() {
        let (mut s, root, _) = nested_scene();
        s.divide(root, 1).unwrap();
        let compiled = compile(&s).unwrap();

        let mut covered = vec![0; compiled.triangles.len()];
        for g in &compiled.groups {
            for i in g.triangle_range() {
                covered[i] += 1;
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
        for (id, g) in compiled.groups.iter().enumerate() {
            assert!(g.child_groups().iter().all(|&c| (c as usize) < id));
        }
    }

    #[test]
    fn test_triangle_colors_are_inherited() {
        let (s, _, _) = nested_scene();
        let compiled = compile(&s).unwrap();
        for t in &compiled.triangles {
            assert_eq!(t.color, Material::diffuse(0.9, 0.1, 0.1).color.to_array());
        }
    }

    #[test]
    fn test_placeholders_for_empty_scene() {
        let mut s = Scene::new(camera());
        s.add_root(Shape::sphere());
        let compiled = compile(&s).unwrap();

        assert_eq!(compiled.triangles, vec![TriangleRecord::zeroed()]);
        assert_eq!(compiled.groups, vec![GroupRecord::zeroed()]);
        assert!(compiled.triangle_bytes().iter().all(|&b| b == 0));
        assert!(compiled.group_bytes().iter().all(|&b| b == 0));
        assert_eq!(compiled.objects[0].object_kind(), Some(ObjectKind::Sphere));
    }

    #[test]
    fn test_compile_is_idempotent_and_reentrant() {
        let (a, _, _) = nested_scene();
        let mut b = Scene::new(camera());
        b.add_root(Shape::cube());

        let first = compile(&a).unwrap();
        let other = compile(&b).unwrap();
        let second = compile(&a).unwrap();

        assert_eq!(first.object_bytes(), second.object_bytes());
        assert_eq!(first.triangle_bytes(), second.triangle_bytes());
        assert_eq!(first.group_bytes(), second.group_bytes());
        assert_eq!(first.camera_bytes(), second.camera_bytes());
        assert_eq!(other.groups.len(), 1);
    }

    #[test]
    fn test_too_many_child_groups() {
        let mut s = Scene::new(camera());
        let root = s.add_root(Shape::group("root"));
        for i in 0..3 {
            let g = s.insert_child(root, Shape::group(format!("g{i}"))).unwrap();
            s.insert_child(g, tri(i as f64 * 3.0)).unwrap();
        }

        assert_eq!(
            compile(&s),
            Err(CompileError::TooManyChildren {
                group: root,
                count: 3,
                capacity: 2
            })
        );

        s.divide(root, 64).unwrap();
        let compiled = compile(&s).unwrap();
        assert_eq!(compiled.triangles.len(), 3);
    }

    #[test]
    fn test_unsupported_shapes() {
        let mut s = Scene::new(camera());
        let g = s.add_root(Shape::group("g"));
        s.insert_child(g, Shape::sphere()).unwrap();
        assert_eq!(
            compile(&s),
            Err(CompileError::UnsupportedGroupChild {
                group: g,
                kind: "sphere"
            })
        );

        let mut s = Scene::new(camera());
        let t = s.add_root(tri(0.0));
        assert_eq!(
            compile(&s),
            Err(CompileError::UnsupportedRoot {
                shape: t,
                kind: "triangle"
            })
        );
    }

    #[test]
    fn test_nested_transforms_are_baked() {
        let mut s = Scene::new(camera());
        let root = s
            .add_root(Shape::group("root").with_transform(scaling(3.0, 3.0, 3.0)).unwrap());
        let inner = s
            .insert_child(root, Shape::group("inner").with_transform(translation(0.0, 0.0, 5.0)).unwrap())
            .unwrap();
        s.insert_child(inner, tri(0.0)).unwrap();

        let compiled = compile(&s).unwrap();
        let t = &compiled.triangles[0];
        // the root transform stays on the object record
        assert_eq!(t.p1, point(0.0, 1.0, 5.0).to_array());
        assert_eq!(t.e1, vector(-1.0, -1.0, 0.0).to_array());
        assert_eq!(t.n, vector(0.0, 0.0, -1.0).to_array());
        assert_eq!(compiled.groups[0].bb_min[2], 5.0);
        assert_eq!(compiled.objects[0].transform, scaling(3.0, 3.0, 3.0).0);
    }

    #[test]
    fn test_object_record_fields() {
        let mut s = Scene::new(camera());
        let material = Material::glass()
            .with_texture(TextureBinding::new(3).with_scale(2.0, 4.0))
            .as_env_map();
        let c = s.add_root(
            Shape::cylinder(-1.0, 2.0, true)
                .with_transform(translation(1.0, 0.0, 0.0))
                .unwrap()
                .with_material(material),
        );
        let compiled = compile(&s).unwrap();
        let o = &compiled.objects[0];

        assert_eq!(o.object_kind(), Some(ObjectKind::Cylinder));
        assert_eq!((o.min_y, o.max_y, o.closed), (-1.0, 2.0, 1));
        assert_eq!(o.refractive_index, 1.52);
        assert_eq!((o.textured, o.texture_index), (1, 3));
        assert_eq!((o.texture_scale_x, o.texture_scale_y), (2.0, 4.0));
        assert_eq!(o.normal_mapped, 0);
        assert_eq!(o.env_map, 1);
        assert_eq!(o.inverse, s[c].inverse().0);
        assert_eq!(o.bb_max, point(1.0, 2.0, 1.0).to_array());
    }
}

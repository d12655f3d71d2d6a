//! Scene graph arena.
//!
//! The [`Scene`] owns every shape. Groups refer to their children by
//! [`ShapeId`], and each child keeps its group's id as a non-owning parent
//! link used only for world/object space conversion. Ownership therefore
//! runs strictly from the arena down, and `add_child` refuses anything that
//! would give a shape two parents or close a cycle.

use std::ops::Index;

use ptocl_math::{BoundingBox, Mat4x4, Ray, Tuple4, TupleExt};

use crate::uv::{cube_uv, spherical_map};
use crate::{
    sort_intersections, Camera, CoreError, CoreResult, Group, Intersection, LocalHit, Material,
    Shape, ShapeId, ShapeKind,
};

static DEFAULT_MATERIAL: Material = Material::DEFAULT;

/// A forest of shapes plus the camera looking at it.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<Shape>,
    roots: Vec<ShapeId>,
    pub camera: Camera,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            shapes: Vec::new(),
            roots: Vec::new(),
            camera,
        }
    }

    /// Number of shapes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Top-level shapes in insertion order.
    pub fn roots(&self) -> &[ShapeId] {
        &self.roots
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    /// Mutable access for materials, labels and transforms.
    ///
    /// Changing a child's transform leaves its ancestors' cached bounds
    /// stale until [`Scene::refresh_bounds`] runs.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id.0)
    }

    /// Like [`Scene::get`] but with an error for unknown ids.
    pub fn shape(&self, id: ShapeId) -> CoreResult<&Shape> {
        self.get(id).ok_or(CoreError::UnknownShape(id))
    }

    fn shape_mut(&mut self, id: ShapeId) -> CoreResult<&mut Shape> {
        self.shapes.get_mut(id.0).ok_or(CoreError::UnknownShape(id))
    }

    /// Children of a group; empty for every other shape.
    pub fn children(&self, id: ShapeId) -> &[ShapeId] {
        self.get(id)
            .and_then(Shape::as_group)
            .map(|g| g.children())
            .unwrap_or(&[])
    }

    /// Add a detached shape to the arena.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = ShapeId(self.shapes.len());
        self.shapes.push(shape);
        id
    }

    /// Add a shape as a new top-level object.
    pub fn add_root(&mut self, shape: Shape) -> ShapeId {
        let id = self.insert(shape);
        self.roots.push(id);
        id
    }

    /// Insert `shape` and attach it to `group` in one step.
    pub fn insert_child(&mut self, group: ShapeId, shape: Shape) -> CoreResult<ShapeId> {
        if !self.shape(group)?.is_group() {
            return Err(CoreError::NotAGroup(group));
        }
        let id = self.insert(shape);
        self.attach(group, id);
        Ok(id)
    }

    /// Append `child` to `group`, set its parent link and grow the group's
    /// cached bounds by the child's parent-space bounds.
    pub fn add_child(&mut self, group: ShapeId, child: ShapeId) -> CoreResult<()> {
        let child_shape = self.shape(child)?;
        if !self.shape(group)?.is_group() {
            return Err(CoreError::NotAGroup(group));
        }
        if self.ancestors_and_self(group).any(|a| a == child) {
            return Err(CoreError::Cycle { group, child });
        }
        if let Some(parent) = child_shape.parent {
            return Err(CoreError::AlreadyParented { child, parent });
        }
        if self.roots.contains(&child) {
            return Err(CoreError::AlreadyRoot(child));
        }

        self.attach(group, child);
        Ok(())
    }

    pub fn add_children(
        &mut self,
        group: ShapeId,
        children: impl IntoIterator<Item = ShapeId>,
    ) -> CoreResult<()> {
        for child in children {
            self.add_child(group, child)?;
        }
        Ok(())
    }

    /// Unchecked attach; callers have validated both ids.
    pub(crate) fn attach(&mut self, group: ShapeId, child: ShapeId) {
        let child_bounds = self.parent_space_bounds_of(child);
        self.shapes[child.0].parent = Some(group);
        if let ShapeKind::Group(g) = self.shapes[group.0].kind_mut() {
            g.children.push(child);
            g.bounding_box.merge_with(&child_bounds);
        }
    }

    /// Clear a child's parent link. The old group's child list is the
    /// caller's responsibility.
    pub(crate) fn detach(&mut self, child: ShapeId) {
        self.shapes[child.0].parent = None;
    }

    pub(crate) fn group_mut(&mut self, id: ShapeId) -> Option<&mut Group> {
        match self.shapes.get_mut(id.0)?.kind_mut() {
            ShapeKind::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Compose a transform onto a shape. See [`Shape::set_transform`].
    pub fn set_transform(&mut self, id: ShapeId, delta: Mat4x4) -> CoreResult<()> {
        self.shape_mut(id)?.set_transform(delta)
    }

    pub fn set_material(&mut self, id: ShapeId, material: Material) -> CoreResult<()> {
        self.shape_mut(id)?.set_material(material);
        Ok(())
    }

    /// Effective material: the shape's own, else the nearest ancestor's,
    /// else [`Material::DEFAULT`].
    pub fn material_of(&self, id: ShapeId) -> &Material {
        self.ancestors_and_self(id)
            .find_map(|a| self.shapes[a.0].material())
            .unwrap_or(&DEFAULT_MATERIAL)
    }

    /// Walk from `id` up through its parents.
    fn ancestors_and_self(&self, id: ShapeId) -> impl Iterator<Item = ShapeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |cur| self.shapes[cur.0].parent)
    }

    /// Convert a world-space point into `id`'s object space by applying
    /// every ancestor's inverse, outermost first.
    ///
    /// # Panics
    /// If `id` does not belong to this scene.
    pub fn world_to_object(&self, id: ShapeId, world_point: Tuple4) -> Tuple4 {
        let shape = &self[id];
        let p = match shape.parent {
            Some(parent) => self.world_to_object(parent, world_point),
            None => world_point,
        };
        *shape.inverse() * p
    }

    /// Convert an object-space normal of `id` into world space.
    ///
    /// Each level applies its inverse-transpose and renormalizes with `w = 0`.
    ///
    /// # Panics
    /// If `id` does not belong to this scene.
    pub fn normal_to_world(&self, id: ShapeId, normal: Tuple4) -> Tuple4 {
        let shape = &self[id];
        let n = (*shape.inverse_transpose() * normal).to_unit_vector();
        match shape.parent {
            Some(parent) => self.normal_to_world(parent, n),
            None => n,
        }
    }

    /// Object-space bounds, recomputed from scratch for groups.
    ///
    /// # Panics
    /// If `id` does not belong to this scene.
    pub fn bounds_of(&self, id: ShapeId) -> BoundingBox {
        let shape = &self[id];
        match shape.as_group() {
            Some(g) => g.children.iter().fold(BoundingBox::EMPTY, |acc, &c| {
                acc.merged(&self.parent_space_bounds_of(c))
            }),
            None => shape.local_bounds(),
        }
    }

    /// Bounds in the space of the shape's parent.
    ///
    /// # Panics
    /// If `id` does not belong to this scene.
    pub fn parent_space_bounds_of(&self, id: ShapeId) -> BoundingBox {
        self.bounds_of(id).transform(self[id].transform())
    }

    /// Recompute the cached bounds of `id` and every group below it.
    ///
    /// `add_child` only merges incrementally; after transforms or structure
    /// change, this is the authoritative recomputation.
    pub fn refresh_bounds(&mut self, id: ShapeId) -> CoreResult<BoundingBox> {
        self.shape(id)?;
        Ok(self.refresh_subtree(id))
    }

    fn refresh_subtree(&mut self, id: ShapeId) -> BoundingBox {
        let children = match self.shapes[id.0].as_group() {
            Some(g) => g.children.clone(),
            None => return self.shapes[id.0].local_bounds(),
        };

        let mut bbox = BoundingBox::EMPTY;
        for child in children {
            let local = self.refresh_subtree(child);
            bbox.merge_with(&local.transform(self.shapes[child.0].transform()));
        }
        if let ShapeKind::Group(g) = self.shapes[id.0].kind_mut() {
            g.bounding_box = bbox;
        }
        bbox
    }

    /// All hits of a world-space ray, nearest first.
    pub fn intersect(&self, ray: &Ray) -> Vec<Intersection> {
        let mut out = Vec::new();
        let mut scratch = Vec::new();
        for &root in &self.roots {
            self.intersect_shape(root, ray, &mut out, &mut scratch);
        }
        sort_intersections(&mut out);
        out
    }

    fn intersect_shape(
        &self,
        id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Intersection>,
        scratch: &mut Vec<LocalHit>,
    ) {
        let shape = &self.shapes[id.0];
        let local_ray = ray.transform(shape.inverse());

        match shape.kind() {
            ShapeKind::Group(g) => {
                if g.bounding_box.intersects(&local_ray) {
                    for &child in &g.children {
                        self.intersect_shape(child, &local_ray, out, scratch);
                    }
                }
            }
            _ => {
                scratch.clear();
                shape.intersect_local(&local_ray, scratch);
                out.extend(scratch.iter().map(|h| Intersection::from_local(*h, id)));
            }
        }
    }

    /// World-space surface normal at `world_point` for `hit`.
    pub fn normal_at(&self, hit: &Intersection, world_point: Tuple4) -> CoreResult<Tuple4> {
        let shape = self.shape(hit.shape)?;
        let local_point = self.world_to_object(hit.shape, world_point);
        let local_normal = shape
            .local_normal_at(local_point, hit)
            .ok_or(CoreError::NotASurface(hit.shape))?;
        Ok(self.normal_to_world(hit.shape, local_normal))
    }

    /// Texture coordinates of a world-space point on `id`, repeated by the
    /// effective material's texture scale.
    ///
    /// Only spheres and cubes carry a mapping; everything else gives `None`.
    pub fn texture_uv(&self, id: ShapeId, world_point: Tuple4) -> CoreResult<Option<(f64, f64)>> {
        let shape = self.shape(id)?;
        let local_point = self.world_to_object(id, world_point);
        let (u, v) = match shape.kind() {
            ShapeKind::Sphere => spherical_map(local_point),
            ShapeKind::Cube => {
                let (_, u, v) = cube_uv(local_point);
                (u, v)
            }
            _ => return Ok(None),
        };
        let (sx, sy) = self
            .material_of(id)
            .texture
            .map_or((1.0, 1.0), |t| (t.scale_x, t.scale_y));
        Ok(Some(((u * sx).rem_euclid(1.0), (v * sy).rem_euclid(1.0))))
    }
}

impl Index<ShapeId> for Scene {
    type Output = Shape;

    fn index(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }
}

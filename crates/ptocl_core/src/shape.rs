//! Shapes and their per-type dispatch.
//!
//! Every shape owns its transform together with the cached inverse and
//! inverse-transpose; the three are only ever updated together through
//! [`Shape::set_transform`]. The closed [`ShapeKind`] enum replaces dynamic
//! dispatch, so adding a primitive means every `match` has to handle it.

use std::fmt;

use ptocl_math::{BoundingBox, Mat4x4, Ray, Tuple4};

use crate::primitives::{
    cube_normal, intersect_cube, intersect_plane, intersect_sphere, plane_normal, sphere_normal,
    Cylinder,
};
use crate::{CoreError, CoreResult, Intersection, LocalHit, Material, SmoothTriangle, Triangle};

/// Index of a shape inside its [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub(crate) usize);

impl ShapeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Children and cached bounds of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub(crate) children: Vec<ShapeId>,
    pub(crate) bounding_box: BoundingBox,
}

impl Group {
    pub fn children(&self) -> &[ShapeId] {
        &self.children
    }

    /// Cached bounds in the group's local space.
    ///
    /// Merged incrementally by `add_child`; call
    /// [`Scene::refresh_bounds`](crate::Scene::refresh_bounds) after moving
    /// children around.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }
}

/// The closed set of shape types.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Sphere,
    Plane,
    Cube,
    Cylinder(Cylinder),
    Triangle(Triangle),
    SmoothTriangle(SmoothTriangle),
    Group(Group),
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Plane => "plane",
            ShapeKind::Cube => "cube",
            ShapeKind::Cylinder(_) => "cylinder",
            ShapeKind::Triangle(_) => "triangle",
            ShapeKind::SmoothTriangle(_) => "smooth triangle",
            ShapeKind::Group(_) => "group",
        }
    }

    pub fn is_triangle(&self) -> bool {
        matches!(self, ShapeKind::Triangle(_) | ShapeKind::SmoothTriangle(_))
    }
}

/// A node of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    transform: Mat4x4,
    inverse: Mat4x4,
    inverse_transpose: Mat4x4,
    material: Option<Material>,
    pub(crate) parent: Option<ShapeId>,
    label: String,
    casts_shadow: bool,
}

impl Shape {
    fn from_kind(kind: ShapeKind) -> Self {
        let label = kind.name().to_string();
        Self {
            kind,
            transform: Mat4x4::IDENTITY,
            inverse: Mat4x4::IDENTITY,
            inverse_transpose: Mat4x4::IDENTITY,
            material: None,
            parent: None,
            label,
            casts_shadow: true,
        }
    }

    pub fn sphere() -> Self {
        Self::from_kind(ShapeKind::Sphere)
    }

    pub fn plane() -> Self {
        Self::from_kind(ShapeKind::Plane)
    }

    pub fn cube() -> Self {
        Self::from_kind(ShapeKind::Cube)
    }

    pub fn cylinder(min_y: f64, max_y: f64, closed: bool) -> Self {
        Self::from_kind(ShapeKind::Cylinder(Cylinder::new(min_y, max_y, closed)))
    }

    pub fn triangle(p1: Tuple4, p2: Tuple4, p3: Tuple4) -> Self {
        Self::from_kind(ShapeKind::Triangle(Triangle::new(p1, p2, p3)))
    }

    pub fn smooth_triangle(
        p1: Tuple4,
        p2: Tuple4,
        p3: Tuple4,
        n1: Tuple4,
        n2: Tuple4,
        n3: Tuple4,
    ) -> Self {
        Self::from_kind(ShapeKind::SmoothTriangle(SmoothTriangle::new(
            p1, p2, p3, n1, n2, n3,
        )))
    }

    /// An empty group.
    pub fn group(label: impl Into<String>) -> Self {
        let mut shape = Self::from_kind(ShapeKind::Group(Group {
            children: Vec::new(),
            bounding_box: BoundingBox::EMPTY,
        }));
        shape.label = label.into();
        shape
    }

    /// Builder form of [`Shape::set_transform`].
    pub fn with_transform(mut self, delta: Mat4x4) -> CoreResult<Self> {
        self.set_transform(delta)?;
        Ok(self)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_shadow(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    /// Compose `delta` onto the current transform: `T = T * delta`.
    ///
    /// Repeated calls concatenate in call order. The inverse and
    /// inverse-transpose are recomputed with it; if `T` is singular the shape
    /// is left untouched. Triangles only accept the identity.
    pub fn set_transform(&mut self, delta: Mat4x4) -> CoreResult<()> {
        if self.kind.is_triangle() {
            if delta.is_identity() {
                return Ok(());
            }
            return Err(CoreError::TriangleTransform {
                label: self.label.clone(),
            });
        }

        let transform = self.transform * delta;
        let inverse = transform.inverse()?;
        self.transform = transform;
        self.inverse = inverse;
        self.inverse_transpose = inverse.transpose();
        Ok(())
    }

    pub fn transform(&self) -> &Mat4x4 {
        &self.transform
    }

    pub fn inverse(&self) -> &Mat4x4 {
        &self.inverse
    }

    pub fn inverse_transpose(&self) -> &Mat4x4 {
        &self.inverse_transpose
    }

    /// The explicitly assigned material, if any.
    ///
    /// Use [`Scene::material_of`](crate::Scene::material_of) for the
    /// inherited one.
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = Some(material);
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ShapeKind {
        &mut self.kind
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ShapeKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        self.as_group().is_some()
    }

    /// Bounds in object space. For groups this is the cached box.
    pub fn local_bounds(&self) -> BoundingBox {
        match &self.kind {
            ShapeKind::Sphere | ShapeKind::Cube => {
                BoundingBox::from_coords(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0)
            }
            ShapeKind::Plane => BoundingBox::from_coords(
                f64::NEG_INFINITY,
                0.0,
                f64::NEG_INFINITY,
                f64::INFINITY,
                0.0,
                f64::INFINITY,
            ),
            ShapeKind::Cylinder(c) => c.bounds(),
            ShapeKind::Triangle(t) => t.bounds(),
            ShapeKind::SmoothTriangle(s) => s.triangle.bounds(),
            ShapeKind::Group(g) => g.bounding_box,
        }
    }

    /// Intersect a ray already in this shape's object space.
    ///
    /// Groups return nothing here; their children are resolved by the scene.
    pub fn intersect_local(&self, local_ray: &Ray, out: &mut Vec<LocalHit>) {
        match &self.kind {
            ShapeKind::Sphere => intersect_sphere(local_ray, out),
            ShapeKind::Plane => intersect_plane(local_ray, out),
            ShapeKind::Cube => intersect_cube(local_ray, out),
            ShapeKind::Cylinder(c) => c.intersect(local_ray, out),
            ShapeKind::Triangle(t) => out.extend(t.intersect(local_ray)),
            ShapeKind::SmoothTriangle(s) => out.extend(s.triangle.intersect(local_ray)),
            ShapeKind::Group(_) => {}
        }
    }

    /// Object-space normal at `local_point`; `None` for groups.
    ///
    /// The intersection supplies the barycentric weights smooth triangles
    /// interpolate with.
    pub fn local_normal_at(&self, local_point: Tuple4, hit: &Intersection) -> Option<Tuple4> {
        let n = match &self.kind {
            ShapeKind::Sphere => sphere_normal(local_point),
            ShapeKind::Plane => plane_normal(),
            ShapeKind::Cube => cube_normal(local_point),
            ShapeKind::Cylinder(c) => c.normal_at(local_point),
            ShapeKind::Triangle(t) => t.normal,
            ShapeKind::SmoothTriangle(s) => s.normal_at(hit.u, hit.v),
            ShapeKind::Group(_) => return None,
        };
        Some(n)
    }
}

//! ptocl core - scene graph, shapes and framebuffer.
//!
//! This crate provides:
//!
//! - **Shapes**: spheres, planes, cubes, cylinders, flat and smooth triangles, groups
//! - **Scene**: an arena of shapes with parent links, effective materials and bounds
//! - **Subdivision**: `Scene::divide` turns flat meshes into a binary group hierarchy
//! - **UV mapping**: spherical and cube texture coordinates
//! - **Camera / Canvas**: pixel rays in, RGBA pixels out
//!
//! # Example
//!
//! ```ignore
//! use ptocl_core::{Camera, Scene, Shape};
//!
//! let mut scene = Scene::new(Camera::new(640, 480, std::f64::consts::FRAC_PI_3));
//! let mesh = scene.add_root(Shape::group("mesh"));
//! scene.insert_child(mesh, Shape::triangle(p1, p2, p3))?;
//! scene.divide(mesh, 8)?;
//! ```

pub mod camera;
pub mod canvas;
pub mod divide;
pub mod error;
pub mod intersection;
pub mod material;
pub mod primitives;
pub mod scene;
pub mod shape;
pub mod triangle;
pub mod uv;

// Re-export commonly used types
pub use camera::Camera;
pub use canvas::{channel_to_u8, Canvas};
pub use divide::MAX_CHILD_GROUPS;
pub use error::{CoreError, CoreResult};
pub use intersection::{hit, sort_intersections, Intersection, LocalHit};
pub use material::{Material, TextureBinding};
pub use primitives::Cylinder;
pub use scene::Scene;
pub use shape::{Group, Shape, ShapeId, ShapeKind};
pub use triangle::{interpolate_normal, moller_trumbore, SmoothTriangle, Triangle, TRIANGLE_EPSILON};
pub use uv::{cube_uv, spherical_map, AlignCheck, CubeFace};

pub use ptocl_math;

//! ptocl math - the algebra every other crate in the workspace builds on.
//!
//! - [`Tuple4`]: homogeneous points (`w = 1`) and vectors (`w = 0`), backed by `glam::DVec4`
//! - [`Mat4x4`], [`Mat3x3`], [`Mat2x2`]: row-major matrices with cofactor determinants and inverses
//! - [`Ray`]: origin + direction, transformable by a matrix
//! - [`BoundingBox`]: axis-aligned boxes with slab-method ray tests

// Re-export glam for convenience
pub use glam::{self, DMat4, DVec3, DVec4};

mod aabb;
mod error;
mod matrix;
mod ray;
mod transform;
mod tuple;

pub use aabb::BoundingBox;
pub use error::{MathError, MathResult};
pub use matrix::{Mat2x2, Mat3x3, Mat4x4};
pub use ray::Ray;
pub use transform::{
    rotation_x, rotation_y, rotation_z, scaling, shearing, translation, view_transform,
};
pub use tuple::{approx_eq, color, point, vector, Tuple4, TupleExt, EPSILON};

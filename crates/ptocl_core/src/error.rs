use ptocl_math::MathError;
use thiserror::Error;

use crate::ShapeId;

/// Errors raised while building or querying a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("no shape with id {0} in this scene")]
    UnknownShape(ShapeId),

    #[error("shape {0} is not a group")]
    NotAGroup(ShapeId),

    #[error("shape {child} already belongs to group {parent}")]
    AlreadyParented { child: ShapeId, parent: ShapeId },

    #[error("shape {0} is a scene root and cannot also be a child")]
    AlreadyRoot(ShapeId),

    #[error("adding {child} to group {group} would create a cycle")]
    Cycle { group: ShapeId, child: ShapeId },

    #[error("triangle '{label}' is positioned by its vertices; transform its group instead")]
    TriangleTransform { label: String },

    #[error("shape {0} has no surface to compute a normal on")]
    NotASurface(ShapeId),
}

pub type CoreResult<T> = Result<T, CoreError>;

use ptocl_core::{CoreError, ShapeId};
use thiserror::Error;

/// Reasons a scene cannot be flattened into records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(
        "group {group} has {count} child groups but a group record holds at most {capacity}; \
         subdivide the scene first"
    )]
    TooManyChildren {
        group: ShapeId,
        count: usize,
        capacity: usize,
    },

    #[error("group {group} contains a {kind}; nested groups may only hold triangles and groups")]
    UnsupportedGroupChild { group: ShapeId, kind: &'static str },

    #[error("a bare {kind} ({shape}) cannot be a scene root; wrap it in a group")]
    UnsupportedRoot { shape: ShapeId, kind: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Failures reported by a [`ComputeBackend`](crate::ComputeBackend).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend rejected the batch: {0}")]
    Rejected(String),

    #[error("backend returned {actual} floats, expected {expected}")]
    ShortBuffer { expected: usize, actual: usize },
}

/// Failures of a whole render invocation.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("dispatch of rows starting at {row_offset} failed")]
    Backend {
        row_offset: u32,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! ptocl compiler - turns a scene graph into flat records and renders them.
//!
//! - [`compile`]: flattens a [`Scene`](ptocl_core::Scene) into object,
//!   triangle, group and camera records with integer cross references
//! - [`ComputeBackend`]: the interface an executor of those records implements
//! - [`render`]: slices the image into row batches and dispatches them in parallel
//! - [`CpuBackend`]: reference executor that reads only the records
//!
//! # Example
//!
//! ```ignore
//! use ptocl_compiler::{compile, render, CpuBackend, RenderOptions};
//!
//! let compiled = compile(&scene)?;
//! let canvas = render(&compiled, &CpuBackend::new(), &RenderOptions::default())?;
//! ```

mod backend;
mod compiler;
mod cpu;
mod error;
pub mod raw;
pub mod records;
mod render;

pub use backend::{ComputeBackend, DispatchBatch};
pub use compiler::{compile, CompiledScene, SceneCompiler};
pub use cpu::{CpuBackend, DEFAULT_AMBIENT};
pub use error::{BackendError, CompileError, RenderError};
pub use records::{CameraRecord, GroupRecord, ObjectKind, ObjectRecord, TriangleRecord};
pub use render::{render, RenderOptions, DEFAULT_ROWS_PER_BATCH};

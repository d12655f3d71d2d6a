//! The seam between compiled scenes and whatever executes them.

use crate::{BackendError, CompiledScene};

/// A band of rows to shade.
#[derive(Debug, Clone)]
pub struct DispatchBatch<'a> {
    pub scene: &'a CompiledScene,
    /// First image row in the batch
    pub row_offset: u32,
    pub rows: u32,
    /// Samples per pixel
    pub samples: u32,
    /// One random seed in [0, 1) per pixel, row-major
    pub seeds: Vec<f64>,
}

impl DispatchBatch<'_> {
    pub fn width(&self) -> u32 {
        self.scene.width()
    }

    pub fn pixel_count(&self) -> usize {
        self.rows as usize * self.width() as usize
    }

    /// Number of floats a backend must return: RGBA per pixel.
    pub fn expected_len(&self) -> usize {
        self.pixel_count() * 4
    }
}

/// Executes batches of a compiled scene.
///
/// Implementations return `rows * width * 4` floats, RGBA per pixel in
/// row-major order starting at the top-left pixel of the batch.
pub trait ComputeBackend: Send + Sync {
    fn name(&self) -> &str;

    fn dispatch(&self, batch: &DispatchBatch<'_>) -> Result<Vec<f64>, BackendError>;
}

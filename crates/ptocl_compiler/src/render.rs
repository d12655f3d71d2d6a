//! Batched, parallel dispatch of a compiled scene.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use ptocl_core::Canvas;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::{BackendError, CompiledScene, ComputeBackend, DispatchBatch, RenderError};

/// Default rows per dispatched batch.
pub const DEFAULT_ROWS_PER_BATCH: u32 = 4;

/// How a compiled scene is sliced and sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Samples per pixel
    pub samples: u32,
    /// Image rows per backend call
    pub rows_per_batch: u32,
    /// Seed for the per-pixel seeds; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            samples: 1,
            rows_per_batch: DEFAULT_ROWS_PER_BATCH,
            seed: None,
        }
    }
}

/// Render `compiled` with `backend`, one batch of rows at a time.
///
/// Batches run in parallel and each result is unpacked into a shared
/// canvas. The first backend failure aborts the render; nothing is retried.
pub fn render(
    compiled: &CompiledScene,
    backend: &dyn ComputeBackend,
    options: &RenderOptions,
) -> Result<Canvas, RenderError> {
    let width = compiled.width();
    let height = compiled.height();
    let batches = plan_batches(compiled, options);

    log::info!(
        "rendering {width}x{height} with '{}': {} batches of {} rows, {} samples",
        backend.name(),
        batches.len(),
        options.rows_per_batch.max(1),
        options.samples
    );

    let canvas = Mutex::new(Canvas::new(width, height));
    let rows_done = AtomicU32::new(0);
    let start = Instant::now();

    batches.par_iter().try_for_each(|batch| {
        let rgba = dispatch_checked(backend, batch).map_err(|source| {
            log::error!(
                "backend '{}' failed on rows {}..{}: {source}",
                backend.name(),
                batch.row_offset,
                batch.row_offset + batch.rows
            );
            RenderError::Backend {
                row_offset: batch.row_offset,
                source,
            }
        })?;

        canvas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_rgba_rows(batch.row_offset, &rgba);

        let done = rows_done.fetch_add(batch.rows, Ordering::Relaxed) + batch.rows;
        log::info!("rows {done}/{height} done in {:.2?}", start.elapsed());
        Ok::<(), RenderError>(())
    })?;

    Ok(canvas.into_inner().unwrap_or_else(PoisonError::into_inner))
}

/// Slice the image into batches and draw their seeds.
///
/// Seeds are drawn sequentially before any dispatch, so the output does not
/// depend on scheduling.
fn plan_batches<'a>(compiled: &'a CompiledScene, options: &RenderOptions) -> Vec<DispatchBatch<'a>> {
    let width = compiled.width();
    let height = compiled.height();
    let rows_per_batch = options.rows_per_batch.max(1);
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..height)
        .step_by(rows_per_batch as usize)
        .map(|row_offset| {
            let rows = rows_per_batch.min(height - row_offset);
            let seeds = (0..rows as usize * width as usize)
                .map(|_| rng.gen::<f64>())
                .collect();
            DispatchBatch {
                scene: compiled,
                row_offset,
                rows,
                samples: options.samples,
                seeds,
            }
        })
        .collect()
}

fn dispatch_checked(
    backend: &dyn ComputeBackend,
    batch: &DispatchBatch<'_>,
) -> Result<Vec<f64>, BackendError> {
    let rgba = backend.dispatch(batch)?;
    if rgba.len() != batch.expected_len() {
        return Err(BackendError::ShortBuffer {
            expected: batch.expected_len(),
            actual: rgba.len(),
        });
    }
    Ok(rgba)
}

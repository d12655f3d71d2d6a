//! Raw float image output.
//!
//! Layout, all big-endian: four `i32` header values (format major 1,
//! minor 0, width, height) followed by `f32` R, G, B for every pixel in
//! row-major order. Alpha is dropped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ptocl_core::Canvas;

use crate::RenderError;

pub const FORMAT_MAJOR: i32 = 1;
pub const FORMAT_MINOR: i32 = 0;

const HEADER_LEN: usize = 16;

/// Encode `canvas` into the raw format.
pub fn encode(canvas: &Canvas) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + canvas.pixels().len() * 12);
    for value in [
        FORMAT_MAJOR,
        FORMAT_MINOR,
        canvas.width() as i32,
        canvas.height() as i32,
    ] {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    for p in canvas.pixels() {
        for channel in [p.x, p.y, p.z] {
            bytes.extend_from_slice(&(channel as f32).to_be_bytes());
        }
    }
    bytes
}

pub fn write_raw<W: Write>(canvas: &Canvas, mut out: W) -> Result<(), RenderError> {
    out.write_all(&encode(canvas))?;
    out.flush()?;
    Ok(())
}

pub fn write_raw_file(canvas: &Canvas, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let file = File::create(path.as_ref())?;
    write_raw(canvas, BufWriter::new(file))?;
    log::info!("wrote raw image to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptocl_math::color;

    #[test]
    fn test_header_and_pixels() {
        let mut canvas = Canvas::new(2, 1);
        canvas.write_pixel(1, 0, color(0.5, 1.0, 2.0));
        let bytes = encode(&canvas);

        assert_eq!(bytes.len(), 16 + 2 * 12);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 2]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 1]);
        assert_eq!(&bytes[16..28], &[0u8; 12]);
        assert_eq!(&bytes[28..32], &0.5f32.to_be_bytes());
        assert_eq!(&bytes[36..40], &2.0f32.to_be_bytes());
    }

    #[test]
    fn test_write_raw_to_buffer() {
        let canvas = Canvas::new(3, 2);
        let mut out = Vec::new();
        write_raw(&canvas, &mut out).unwrap();
        assert_eq!(out, encode(&canvas));
    }
}

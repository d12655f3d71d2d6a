//! Framebuffer for render output.

use ptocl_math::{color, Tuple4};

/// Row-major RGBA framebuffer with linear float channels.
///
/// Pixel (0, 0) is the top-left corner, matching the camera's ray
/// convention and the row order of backend output.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Tuple4>,
}

impl Canvas {
    /// Create a new canvas filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color(0.0, 0.0, 0.0); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Tuple4] {
        &self.pixels
    }

    /// Get the pixel at (x, y), if it is inside the canvas.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<Tuple4> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y). Out-of-range writes are logged and dropped.
    pub fn write_pixel(&mut self, x: u32, y: u32, c: Tuple4) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = c;
                true
            }
            None => {
                log::warn!(
                    "pixel ({x}, {y}) is outside the {}x{} canvas, ignoring",
                    self.width,
                    self.height
                );
                false
            }
        }
    }

    /// Unpack a backend buffer of 4 floats per pixel starting at `row_offset`.
    ///
    /// Alpha is carried through. Pixels that would land past the last row
    /// are dropped with a warning. Returns the number of pixels written.
    pub fn write_rgba_rows(&mut self, row_offset: u32, rgba: &[f64]) -> usize {
        let start = row_offset as usize * self.width as usize;
        let mut written = 0;
        for (i, px) in rgba.chunks_exact(4).enumerate() {
            match self.pixels.get_mut(start + i) {
                Some(slot) => {
                    *slot = Tuple4::new(px[0], px[1], px[2], px[3]);
                    written += 1;
                }
                None => {
                    log::warn!(
                        "{} pixels from row {row_offset} fall outside the canvas, ignoring",
                        rgba.len() / 4 - i
                    );
                    break;
                }
            }
        }
        written
    }

    /// Convert to 8-bit RGBA bytes (alpha forced opaque).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            bytes.extend_from_slice(&[
                channel_to_u8(c.x),
                channel_to_u8(c.y),
                channel_to_u8(c.z),
                255,
            ]);
        }
        bytes
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Scale a [0, 1] channel to a byte, rounding half away from zero.
#[inline]
pub fn channel_to_u8(c: f64) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

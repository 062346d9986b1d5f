//! Output frame buffer owned by the PPU.

/// Visible frame width in pixels.
pub const WIDTH: usize = 256;
/// Visible frame height in pixels.
pub const HEIGHT: usize = 240;

/// 256x240 packed-ARGB frame, rewritten pixel by pixel during rendering.
///
/// The presentation collaborator only reads it after the frame-complete
/// signal; the PPU is the sole writer.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pixels: Box<[u32]>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0u32; WIDTH * HEIGHT].into_boxed_slice(),
        }
    }

    /// Writes one pixel; out-of-frame coordinates are discarded.
    #[inline]
    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIDTH && y < HEIGHT {
            self.pixels[y * WIDTH + x] = color;
        }
    }

    /// Row-major pixel data for the presentation layer.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

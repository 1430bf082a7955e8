// Frame sink - The boundary where decoded frames leave the decoder
//
// After every graphics packet the decoder lends the current canvas to a sink
// as a `Frame`. The borrow ends when the sink returns, so a sink that needs
// the pixels later must copy them.

use crate::canvas::{
    Canvas, Palette, BORDER_HEIGHT, BORDER_WIDTH, DISPLAY_HEIGHT, DISPLAY_WIDTH, FULL_HEIGHT,
    FULL_WIDTH,
};

/// Read-only view of the canvas after one decode step
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    canvas: &'a Canvas,
}

impl<'a> Frame<'a> {
    pub fn new(canvas: &'a Canvas) -> Self {
        Frame { canvas }
    }

    /// The underlying canvas
    pub fn canvas(&self) -> &'a Canvas {
        self.canvas
    }

    /// Raw palette indices, row padding included
    pub fn pixels(&self) -> &'a [u8] {
        self.canvas.pixels()
    }

    pub fn stride(&self) -> usize {
        self.canvas.stride()
    }

    pub fn width(&self) -> usize {
        FULL_WIDTH
    }

    pub fn height(&self) -> usize {
        FULL_HEIGHT
    }

    pub fn palette(&self) -> &'a Palette {
        self.canvas.palette()
    }

    /// Whether palette entries changed since the previous frame
    pub fn palette_changed(&self) -> bool {
        self.canvas.palette_changed()
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.canvas.get_pixel(x, y)
    }

    /// Tightly packed palette indices of the whole canvas
    pub fn packed_pixels(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FULL_WIDTH * FULL_HEIGHT);
        for y in 0..FULL_HEIGHT {
            out.extend_from_slice(self.canvas.row(y));
        }
        out
    }

    /// Tightly packed palette indices of the 294×204 area inside the border
    pub fn visible_pixels(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DISPLAY_WIDTH * DISPLAY_HEIGHT);
        for y in BORDER_HEIGHT..BORDER_HEIGHT + DISPLAY_HEIGHT {
            out.extend_from_slice(&self.canvas.row(y)[BORDER_WIDTH..BORDER_WIDTH + DISPLAY_WIDTH]);
        }
        out
    }

    /// Expand the whole canvas to RGB888 through the palette
    pub fn to_rgb(&self) -> Vec<u8> {
        expand_rgb(self.palette(), &self.packed_pixels())
    }

    /// Expand the whole canvas into an RGBA8888 buffer
    ///
    /// # Panics
    /// Panics if output buffer is too small
    pub fn to_rgba(&self, output: &mut [u8]) {
        assert!(
            output.len() >= FULL_WIDTH * FULL_HEIGHT * 4,
            "Output buffer too small for RGBA conversion"
        );

        let palette = self.palette();
        let mut offset = 0;
        for y in 0..FULL_HEIGHT {
            for &index in self.canvas.row(y) {
                output[offset..offset + 4].copy_from_slice(&palette.to_rgba(index));
                offset += 4;
            }
        }
    }
}

/// Expand packed palette indices to RGB888
pub fn expand_rgb(palette: &Palette, indices: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(indices.len() * 3);
    for &index in indices {
        rgb.extend_from_slice(&palette.to_rgb(index));
    }
    rgb
}

/// Receiver of decoded frames
pub trait FrameSink {
    fn on_frame(&mut self, frame: &Frame<'_>);
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame<'_>),
{
    fn on_frame(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}

/// Sink that discards every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn on_frame(&mut self, _frame: &Frame<'_>) {}
}

// Canvas - The persistent indexed-color raster every instruction draws into
//
// A canvas is 300×216 pixels, one palette index (0-15) per byte. Rows may be
// padded: `stride` is the distance in bytes between the starts of two rows
// and every offset is computed with it. The canvas also carries the 16-entry
// palette and the fine-scroll offset that later tile writes are shifted by.

pub mod constants;
pub mod palette;

pub use constants::*;
pub use palette::{rgb444_to_rgb, Palette, PALETTE_SIZE};

use crate::error::AllocationError;

/// Indexed-color canvas with palette and active scroll offset
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Palette indices, `stride * FULL_HEIGHT` bytes
    pixels: Vec<u8>,

    /// Bytes per row, at least `FULL_WIDTH`
    stride: usize,

    palette: Palette,

    /// Set when palette entries were overwritten since the last frame emission
    palette_changed: bool,

    /// Horizontal fine-scroll offset (0-5)
    hscroll: u8,

    /// Vertical fine-scroll offset (0-11)
    vscroll: u8,
}

impl Canvas {
    /// Create a tightly packed canvas with all pixels 0 and a black palette
    pub fn new() -> Self {
        Canvas {
            pixels: vec![0; FULL_WIDTH * FULL_HEIGHT],
            stride: FULL_WIDTH,
            palette: Palette::new(),
            palette_changed: false,
            hscroll: 0,
            vscroll: 0,
        }
    }

    /// Create a canvas with a padded row stride
    ///
    /// The reservation is fallible so that a host running out of memory gets
    /// an error instead of an abort.
    ///
    /// # Arguments
    /// * `stride` - Bytes per row, at least `FULL_WIDTH`
    pub fn try_with_stride(stride: usize) -> Result<Self, AllocationError> {
        if stride < FULL_WIDTH {
            return Err(AllocationError::InvalidStride { stride });
        }

        let bytes = stride
            .checked_mul(FULL_HEIGHT)
            .ok_or(AllocationError::OutOfMemory { bytes: usize::MAX })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| AllocationError::OutOfMemory { bytes })?;
        pixels.resize(bytes, 0);

        Ok(Canvas {
            pixels,
            stride,
            palette: Palette::new(),
            palette_changed: false,
            hscroll: 0,
            vscroll: 0,
        })
    }

    /// Put the canvas back into its initial state without reallocating
    pub fn reset(&mut self) {
        self.pixels.fill(0);
        self.palette = Palette::new();
        self.palette_changed = false;
        self.hscroll = 0;
        self.vscroll = 0;
    }

    #[inline]
    pub fn width(&self) -> usize {
        FULL_WIDTH
    }

    #[inline]
    pub fn height(&self) -> usize {
        FULL_HEIGHT
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Byte offset of a pixel inside the buffer
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    /// Get a pixel
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < FULL_WIDTH, "X coordinate {} out of bounds", x);
        assert!(y < FULL_HEIGHT, "Y coordinate {} out of bounds", y);

        self.pixels[self.offset(x, y)]
    }

    /// Set a pixel, keeping only the low four bits of `color`
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u8) {
        assert!(x < FULL_WIDTH, "X coordinate {} out of bounds", x);
        assert!(y < FULL_HEIGHT, "Y coordinate {} out of bounds", y);

        let offset = self.offset(x, y);
        self.pixels[offset] = color & 0x0F;
    }

    /// Raw buffer including any row padding
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw buffer including any row padding
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// The `FULL_WIDTH` pixels of one row, padding excluded
    pub fn row(&self, y: usize) -> &[u8] {
        let start = self.offset(0, y);
        &self.pixels[start..start + FULL_WIDTH]
    }

    /// Fill the whole buffer, padding included
    pub fn fill(&mut self, color: u8) {
        self.pixels.fill(color & 0x0F);
    }

    /// Fill a rectangle with one color
    ///
    /// # Arguments
    /// * `x`, `y` - Top-left corner
    /// * `w`, `h` - Size of the rectangle
    /// * `color` - Palette index
    ///
    /// # Panics
    /// Panics if the rectangle extends past the canvas
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u8) {
        assert!(x + w <= FULL_WIDTH, "rectangle exceeds canvas width");
        assert!(y + h <= FULL_HEIGHT, "rectangle exceeds canvas height");

        let color = color & 0x0F;
        for row in y..y + h {
            let start = self.offset(x, row);
            self.pixels[start..start + w].fill(color);
        }
    }

    /// Copy a rectangle of pixels out of another canvas
    ///
    /// Both canvases must share the same stride.
    ///
    /// # Arguments
    /// * `src` - Canvas to read from
    /// * `src_x`, `src_y` - Top-left corner in `src`
    /// * `dst_x`, `dst_y` - Top-left corner in `self`
    /// * `w`, `h` - Size of the rectangle
    ///
    /// # Panics
    /// Panics if either rectangle extends past its canvas
    #[allow(clippy::too_many_arguments)]
    pub fn copy_rect(
        &mut self,
        src: &Canvas,
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
        w: usize,
        h: usize,
    ) {
        assert!(
            src_x + w <= FULL_WIDTH && dst_x + w <= FULL_WIDTH,
            "rectangle exceeds canvas width"
        );
        assert!(
            src_y + h <= FULL_HEIGHT && dst_y + h <= FULL_HEIGHT,
            "rectangle exceeds canvas height"
        );

        for row in 0..h {
            let from = src.offset(src_x, src_y + row);
            let to = self.offset(dst_x, dst_y + row);
            self.pixels[to..to + w].copy_from_slice(&src.pixels[from..from + w]);
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Mutable palette access; callers that change entries must also call
    /// [`Canvas::mark_palette_changed`]
    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    #[inline]
    pub fn palette_changed(&self) -> bool {
        self.palette_changed
    }

    pub fn mark_palette_changed(&mut self) {
        self.palette_changed = true;
    }

    pub fn clear_palette_changed(&mut self) {
        self.palette_changed = false;
    }

    /// Take over the palette and its changed flag from another canvas
    pub fn copy_palette_from(&mut self, other: &Canvas) {
        self.palette = other.palette;
        self.palette_changed = other.palette_changed;
    }

    /// Active fine-scroll offset as (horizontal, vertical)
    #[inline]
    pub fn scroll_offset(&self) -> (u8, u8) {
        (self.hscroll, self.vscroll)
    }

    /// Replace the active fine-scroll offset, clamped to 0-5 / 0-11
    pub fn set_scroll_offset(&mut self, hscroll: u8, vscroll: u8) {
        self.hscroll = hscroll.min(MAX_HSCROLL);
        self.vscroll = vscroll.min(MAX_VSCROLL);
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("stride", &self.stride)
            .field("palette", &self.palette)
            .field("palette_changed", &self.palette_changed)
            .field("hscroll", &self.hscroll)
            .field("vscroll", &self.vscroll)
            .finish_non_exhaustive()
    }
}

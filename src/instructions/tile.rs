// Tile painting: TILE_BLOCK and TILE_BLOCK_XOR
//
// A tile is a 6×12 two-color bitmap placed on a 6×12 grid. Each of the
// twelve bitmap bytes holds one row, bit 5 being the leftmost pixel. The
// active fine-scroll offset moves every tile by (hscroll, vscroll) pixels;
// a tile that would then cross the canvas edge is dropped entirely.

use crate::canvas::{Canvas, FULL_HEIGHT, FULL_WIDTH, TILE_HEIGHT, TILE_WIDTH};
use crate::packet::{nibble, six_bits, DATA_SIZE, SUBCODE_MASK, TILE_ROW_MASK};

/// How tile pixels combine with what is already on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// Tile pixels overwrite the canvas
    Normal,
    /// Tile pixels are XORed into the canvas
    Xor,
}

/// Decoded payload of a tile instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBlock {
    /// Color for clear bitmap bits
    pub c0: u8,
    /// Color for set bitmap bits
    pub c1: u8,
    /// Top pixel row of the tile, before scrolling
    pub row: usize,
    /// Left pixel column of the tile, before scrolling
    pub col: usize,
    /// One 6-bit row per entry
    pub bitmap: [u8; TILE_HEIGHT],
}

impl TileBlock {
    /// Decode a tile payload
    pub fn from_data(data: &[u8; DATA_SIZE]) -> Self {
        let mut bitmap = [0u8; TILE_HEIGHT];
        for (y, row) in bitmap.iter_mut().enumerate() {
            *row = six_bits(data[4 + y]);
        }

        TileBlock {
            c0: nibble(data[0]),
            c1: nibble(data[1]),
            row: (data[2] & TILE_ROW_MASK) as usize * TILE_HEIGHT,
            col: (data[3] & SUBCODE_MASK) as usize * TILE_WIDTH,
            bitmap,
        }
    }

    /// Color of one tile pixel
    #[inline]
    pub fn color_at(&self, x: usize, y: usize) -> u8 {
        let bit = (self.bitmap[y] >> (TILE_WIDTH - 1 - x)) & 0x01;
        if bit == 0 {
            self.c0
        } else {
            self.c1
        }
    }

    /// Whether the tile fits on the canvas once shifted by the scroll offset
    pub fn fits(&self, hscroll: u8, vscroll: u8) -> bool {
        let row = self.row as i32;
        let col = self.col as i32;
        let vscroll = vscroll as i32;
        let hscroll = hscroll as i32;

        if row > (FULL_HEIGHT - TILE_HEIGHT) as i32 - vscroll || row + vscroll < 0 {
            return false;
        }
        if col > (FULL_WIDTH - TILE_WIDTH) as i32 - hscroll || col + hscroll < 0 {
            return false;
        }
        true
    }
}

impl Canvas {
    /// Paint a tile at the position given by its payload
    ///
    /// # Returns
    /// `false` if the tile was dropped for lying outside the canvas
    pub fn tile_block(&mut self, data: &[u8; DATA_SIZE], mode: TileMode) -> bool {
        let tile = TileBlock::from_data(data);
        let (hscroll, vscroll) = self.scroll_offset();

        if !tile.fits(hscroll, vscroll) {
            return false;
        }

        let left = tile.col + hscroll as usize;
        let top = tile.row + vscroll as usize;

        for y in 0..TILE_HEIGHT {
            for x in 0..TILE_WIDTH {
                let offset = self.offset(left + x, top + y);
                let mut color = tile.color_at(x, y);
                if mode == TileMode::Xor {
                    color ^= self.pixels()[offset];
                }
                self.pixels_mut()[offset] = color;
            }
        }

        true
    }
}

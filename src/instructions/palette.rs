// Palette loading: LOAD_PAL_LO / LOAD_PAL_HIGH
//
// Each packet carries eight colors in 16 bytes. A color is spread over two
// bytes as `rrrrgg` / `ggbbbb`, giving a 12-bit 0x0RGB value.

use crate::canvas::{rgb444_to_rgb, Canvas};
use crate::packet::{six_bits, DATA_SIZE};

/// Number of colors carried by one palette packet
pub const COLORS_PER_PACKET: usize = 8;

/// Which half of the palette a load instruction writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteHalf {
    /// Entries 0-7
    Low,
    /// Entries 8-15
    High,
}

impl PaletteHalf {
    /// First palette index written by this half
    pub fn base(self) -> usize {
        match self {
            PaletteHalf::Low => 0,
            PaletteHalf::High => COLORS_PER_PACKET,
        }
    }
}

/// Unpack the i-th 12-bit color of a palette packet
#[inline]
pub fn packed_color(data: &[u8; DATA_SIZE], i: usize) -> u16 {
    let high = six_bits(data[2 * i]) as u16;
    let low = six_bits(data[2 * i + 1]) as u16;
    (high << 6) | low
}

impl Canvas {
    /// Load eight palette entries and flag the palette as changed
    pub fn load_palette(&mut self, data: &[u8; DATA_SIZE], half: PaletteHalf) {
        let base = half.base();
        let palette = self.palette_mut();

        for i in 0..COLORS_PER_PACKET {
            palette.set((base + i) as u8, rgb444_to_rgb(packed_color(data, i)));
        }

        self.mark_palette_changed();
    }
}

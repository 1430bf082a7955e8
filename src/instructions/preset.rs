// Preset instructions: memory preset and border preset
//
// Both read (color, repeat) from the first two data bytes and only draw when
// repeat is zero.

use super::get_preset_values;
use crate::canvas::{Canvas, BORDER_HEIGHT, BORDER_WIDTH, FULL_HEIGHT, FULL_WIDTH};
use crate::packet::DATA_SIZE;

impl Canvas {
    /// MEMORY_PRESET - Fill every pixel of the canvas with one color
    ///
    /// The fill covers the border and any row padding, not just the
    /// display area.
    pub fn memory_preset(&mut self, data: &[u8; DATA_SIZE]) {
        let (color, repeat) = get_preset_values(data);
        if repeat != 0 {
            return;
        }

        self.fill(color);
    }

    /// BORDER_PRESET - Fill the 6-pixel side borders and 12-pixel top and
    /// bottom borders with one color
    ///
    /// The 294×204 interior is left untouched.
    pub fn border_preset(&mut self, data: &[u8; DATA_SIZE]) {
        let (color, repeat) = get_preset_values(data);
        if repeat != 0 {
            return;
        }

        // Top and bottom bands
        self.fill_rect(0, 0, FULL_WIDTH, BORDER_HEIGHT, color);
        self.fill_rect(
            0,
            FULL_HEIGHT - BORDER_HEIGHT,
            FULL_WIDTH,
            BORDER_HEIGHT,
            color,
        );

        // Side bands between them
        let side_height = FULL_HEIGHT - 2 * BORDER_HEIGHT;
        self.fill_rect(0, BORDER_HEIGHT, BORDER_WIDTH, side_height, color);
        self.fill_rect(
            FULL_WIDTH - BORDER_WIDTH,
            BORDER_HEIGHT,
            BORDER_WIDTH,
            side_height,
            color,
        );
    }
}

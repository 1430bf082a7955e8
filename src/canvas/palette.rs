// CD+G Color Palette - 16 entries loaded at runtime from 12-bit colors
//
// Unlike a fixed master palette, every entry here is written by the stream.
// Sources carry 4 bits per channel packed as 0x0RGB; each channel is scaled by
// 17 so that 0x0 maps to 0x00 and 0xF maps to 0xFF.

/// Number of palette entries
pub const PALETTE_SIZE: usize = 16;

/// Scale factor from a 4-bit channel to an 8-bit channel
const CHANNEL_SCALE: u32 = 17;

/// Convert a 12-bit 0x0RGB color to 32-bit RGB (0xRRGGBB)
///
/// # Arguments
/// * `color` - 12-bit color, red in bits 8-11, green in 4-7, blue in 0-3
///
/// # Returns
/// 32-bit RGB color value (0xRRGGBB)
#[inline]
pub fn rgb444_to_rgb(color: u16) -> u32 {
    let color = color as u32;
    let r = ((color >> 8) & 0x0F) * CHANNEL_SCALE;
    let g = ((color >> 4) & 0x0F) * CHANNEL_SCALE;
    let b = (color & 0x0F) * CHANNEL_SCALE;
    (r << 16) | (g << 8) | b
}

/// Split a 32-bit RGB color into [R, G, B] bytes
#[inline]
pub fn rgb_to_bytes(rgb: u32) -> [u8; 3] {
    [
        ((rgb >> 16) & 0xFF) as u8, // Red
        ((rgb >> 8) & 0xFF) as u8,  // Green
        (rgb & 0xFF) as u8,         // Blue
    ]
}

/// Convert a 32-bit RGB color to [R, G, B, A] bytes, fully opaque
#[inline]
pub fn rgb_to_rgba(rgb: u32) -> [u8; 4] {
    let [r, g, b] = rgb_to_bytes(rgb);
    [r, g, b, 0xFF]
}

/// The 16-entry color table a canvas indexes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Colors as 0xRRGGBB
    colors: [u32; PALETTE_SIZE],
}

impl Palette {
    /// Create a palette with every entry black
    pub fn new() -> Self {
        Palette {
            colors: [0; PALETTE_SIZE],
        }
    }

    /// Get the color of an entry
    ///
    /// Only the low four bits of `index` are used.
    #[inline]
    pub fn get(&self, index: u8) -> u32 {
        self.colors[(index & 0x0F) as usize]
    }

    /// Overwrite an entry
    ///
    /// Only the low four bits of `index` are used.
    #[inline]
    pub fn set(&mut self, index: u8, rgb: u32) {
        self.colors[(index & 0x0F) as usize] = rgb & 0x00FF_FFFF;
    }

    /// All entries in index order
    pub fn colors(&self) -> &[u32; PALETTE_SIZE] {
        &self.colors
    }

    /// Convert an entry to [R, G, B] bytes
    #[inline]
    pub fn to_rgb(&self, index: u8) -> [u8; 3] {
        rgb_to_bytes(self.get(index))
    }

    /// Convert an entry to [R, G, B, A] bytes
    #[inline]
    pub fn to_rgba(&self, index: u8) -> [u8; 4] {
        rgb_to_rgba(self.get(index))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

// Canvas geometry constants

/// Full canvas width in pixels, border included
pub const FULL_WIDTH: usize = 300;

/// Full canvas height in pixels, border included
pub const FULL_HEIGHT: usize = 216;

/// Width of the area a player normally shows
pub const DISPLAY_WIDTH: usize = 294;

/// Height of the area a player normally shows
pub const DISPLAY_HEIGHT: usize = 204;

/// Left and right border width in pixels
pub const BORDER_WIDTH: usize = 6;

/// Top and bottom border height in pixels
pub const BORDER_HEIGHT: usize = 12;

/// Tile width in pixels
pub const TILE_WIDTH: usize = 6;

/// Tile height in pixels
pub const TILE_HEIGHT: usize = 12;

/// Largest horizontal fine-scroll offset
pub const MAX_HSCROLL: u8 = (BORDER_WIDTH - 1) as u8;

/// Largest vertical fine-scroll offset
pub const MAX_VSCROLL: u8 = (BORDER_HEIGHT - 1) as u8;

//! Instruction handler unit tests
//!
//! Organized by instruction group; every test drives a handler directly on
//! a [`Canvas`] without going through the decoder.

use super::*;
use crate::canvas::{Canvas, FULL_HEIGHT, FULL_WIDTH};

// ========================================
// Test Helper Functions
// ========================================

/// Build a payload from its leading bytes, zero-filling the rest
pub(crate) fn data(bytes: &[u8]) -> [u8; DATA_SIZE] {
    let mut data = [0u8; DATA_SIZE];
    data[..bytes.len()].copy_from_slice(bytes);
    data
}

/// Canvas whose pixel at (x, y) is `(x + 3 * y) % 16`, so every shift is visible
pub(crate) fn patterned_canvas() -> Canvas {
    let mut canvas = Canvas::new();
    for y in 0..FULL_HEIGHT {
        for x in 0..FULL_WIDTH {
            canvas.set_pixel(x, y, ((x + 3 * y) % 16) as u8);
        }
    }
    canvas
}

/// Tile payload with both colors, grid position and one bitmap byte for every row
pub(crate) fn tile_data(c0: u8, c1: u8, row: u8, col: u8, bits: u8) -> [u8; DATA_SIZE] {
    let mut data = [bits; DATA_SIZE];
    data[0] = c0;
    data[1] = c1;
    data[2] = row;
    data[3] = col;
    data
}

#[test]
fn test_instruction_codes_round_trip() {
    for code in 0..64u8 {
        assert_eq!(Instruction::from_code(code).code(), code);
    }
}

#[test]
fn test_unknown_instruction() {
    assert_eq!(Instruction::from_code(7), Instruction::Unknown(7));
    assert_eq!(Instruction::from_code(7).name(), "UNKNOWN");
    assert!(!Instruction::from_code(7).is_scroll());
    assert!(Instruction::ScrollCopy.is_scroll());
    assert_eq!(Instruction::TileBlockXor.to_string(), "TILE_BLOCK_XOR(38)");
}

#[test]
fn test_get_preset_values_masks_high_bits() {
    assert_eq!(get_preset_values(&data(&[0xF3, 0x20])), (3, 0));
    assert_eq!(get_preset_values(&data(&[0x05, 0x0A])), (5, 10));
}

// ========================================
// Test Modules
// ========================================

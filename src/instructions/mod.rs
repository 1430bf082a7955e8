// Instructions module for the CD+G graphics command set
// This module organizes the instruction handlers by what they draw

pub mod palette;
pub mod preset;
pub mod scroll;
pub mod tile;

#[cfg(test)]
mod tests;

pub use palette::PaletteHalf;
pub use scroll::{HScrollCommand, ScrollMode, ScrollParams, ScrollShift, VScrollCommand};
pub use tile::{TileBlock, TileMode};

use crate::packet::{nibble, DATA_SIZE};

/// Instruction code: fill the whole canvas
pub const INST_MEMORY_PRESET: u8 = 1;
/// Instruction code: fill the border
pub const INST_BORDER_PRESET: u8 = 2;
/// Instruction code: paint a tile
pub const INST_TILE_BLOCK: u8 = 6;
/// Instruction code: scroll, filling vacated edges with a color
pub const INST_SCROLL_PRESET: u8 = 20;
/// Instruction code: scroll, wrapping vacated edges around
pub const INST_SCROLL_COPY: u8 = 24;
/// Instruction code: load palette entries 0-7
pub const INST_LOAD_PALETTE_LOW: u8 = 30;
/// Instruction code: load palette entries 8-15
pub const INST_LOAD_PALETTE_HIGH: u8 = 31;
/// Instruction code: paint a tile XORed over the canvas
pub const INST_TILE_BLOCK_XOR: u8 = 38;

/// A graphics instruction selected by a packet's instruction code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    MemoryPreset,
    BorderPreset,
    TileBlock,
    ScrollPreset,
    ScrollCopy,
    LoadPaletteLow,
    LoadPaletteHigh,
    TileBlockXor,
    /// Any code the command set does not define; decoded as a no-op
    Unknown(u8),
}

impl Instruction {
    /// Map a 6-bit instruction code to an instruction
    pub fn from_code(code: u8) -> Self {
        match code {
            INST_MEMORY_PRESET => Instruction::MemoryPreset,
            INST_BORDER_PRESET => Instruction::BorderPreset,
            INST_TILE_BLOCK => Instruction::TileBlock,
            INST_SCROLL_PRESET => Instruction::ScrollPreset,
            INST_SCROLL_COPY => Instruction::ScrollCopy,
            INST_LOAD_PALETTE_LOW => Instruction::LoadPaletteLow,
            INST_LOAD_PALETTE_HIGH => Instruction::LoadPaletteHigh,
            INST_TILE_BLOCK_XOR => Instruction::TileBlockXor,
            other => Instruction::Unknown(other),
        }
    }

    /// The instruction code this instruction is encoded with
    pub fn code(self) -> u8 {
        match self {
            Instruction::MemoryPreset => INST_MEMORY_PRESET,
            Instruction::BorderPreset => INST_BORDER_PRESET,
            Instruction::TileBlock => INST_TILE_BLOCK,
            Instruction::ScrollPreset => INST_SCROLL_PRESET,
            Instruction::ScrollCopy => INST_SCROLL_COPY,
            Instruction::LoadPaletteLow => INST_LOAD_PALETTE_LOW,
            Instruction::LoadPaletteHigh => INST_LOAD_PALETTE_HIGH,
            Instruction::TileBlockXor => INST_TILE_BLOCK_XOR,
            Instruction::Unknown(code) => code,
        }
    }

    /// Short mnemonic used in traces
    pub fn name(self) -> &'static str {
        match self {
            Instruction::MemoryPreset => "MEMORY_PRESET",
            Instruction::BorderPreset => "BORDER_PRESET",
            Instruction::TileBlock => "TILE_BLOCK",
            Instruction::ScrollPreset => "SCROLL_PRESET",
            Instruction::ScrollCopy => "SCROLL_COPY",
            Instruction::LoadPaletteLow => "LOAD_PAL_LO",
            Instruction::LoadPaletteHigh => "LOAD_PAL_HIGH",
            Instruction::TileBlockXor => "TILE_BLOCK_XOR",
            Instruction::Unknown(_) => "UNKNOWN",
        }
    }

    /// Whether this instruction replaces the canvas instead of drawing into it
    pub fn is_scroll(self) -> bool {
        matches!(self, Instruction::ScrollPreset | Instruction::ScrollCopy)
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

/// Read the (color, repeat) pair shared by the preset instructions
///
/// A nonzero repeat marks a packet that repeats one already applied, and the
/// preset handlers skip it.
#[inline]
pub fn get_preset_values(data: &[u8; DATA_SIZE]) -> (u8, u8) {
    (nibble(data[0]), nibble(data[1]))
}

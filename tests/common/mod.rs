// Common test utilities for stream-based integration tests
//
// Builders for synthetic CD+G packets and streams, plus a sink that records
// what every emitted frame looked like.

#![allow(dead_code)]

use cdg_rs::instructions::Instruction;
use cdg_rs::packet::{Packet, DATA_SIZE, PACKET_SIZE};
use cdg_rs::{Frame, FrameSink};

/// Build a graphics packet from an instruction and the leading payload bytes
pub fn packet(instruction: Instruction, payload: &[u8]) -> [u8; PACKET_SIZE] {
    let mut data = [0u8; DATA_SIZE];
    data[..payload.len()].copy_from_slice(payload);
    Packet::new(instruction, data).to_bytes()
}

/// A record whose command byte does not select graphics
pub fn non_graphics_packet() -> [u8; PACKET_SIZE] {
    let mut bytes = packet(Instruction::MemoryPreset, &[0x0F, 0]);
    bytes[0] = 0x3C;
    bytes
}

pub fn memory_preset(color: u8) -> [u8; PACKET_SIZE] {
    packet(Instruction::MemoryPreset, &[color, 0])
}

pub fn border_preset(color: u8) -> [u8; PACKET_SIZE] {
    packet(Instruction::BorderPreset, &[color])
}

/// Tile packet with the same bitmap byte on every row
pub fn tile(c0: u8, c1: u8, row: u8, col: u8, bits: u8, xor: bool) -> [u8; PACKET_SIZE] {
    let mut payload = [bits; 16];
    payload[0] = c0;
    payload[1] = c1;
    payload[2] = row;
    payload[3] = col;
    let instruction = if xor {
        Instruction::TileBlockXor
    } else {
        Instruction::TileBlock
    };
    packet(instruction, &payload)
}

/// Palette packet giving all eight entries of one half the same 12-bit color
pub fn load_palette(high: bool, rgb444: u16) -> [u8; PACKET_SIZE] {
    let hi = ((rgb444 >> 6) & 0x3F) as u8;
    let lo = (rgb444 & 0x3F) as u8;
    let mut payload = [0u8; DATA_SIZE];
    for pair in payload.chunks_exact_mut(2) {
        pair[0] = hi;
        pair[1] = lo;
    }
    let instruction = if high {
        Instruction::LoadPaletteHigh
    } else {
        Instruction::LoadPaletteLow
    };
    packet(instruction, &payload)
}

/// Scroll packet; `h` and `v` are the raw six-bit command/offset bytes
pub fn scroll(copy: bool, color: u8, h: u8, v: u8) -> [u8; PACKET_SIZE] {
    let instruction = if copy {
        Instruction::ScrollCopy
    } else {
        Instruction::ScrollPreset
    };
    packet(instruction, &[color, h, v])
}

/// Concatenate records into one stream
pub fn stream(records: &[[u8; PACKET_SIZE]]) -> Vec<u8> {
    records.iter().flatten().copied().collect()
}

/// What a sink saw for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenFrame {
    pub palette_changed: bool,
    pub top_left: u8,
}

/// Sink that records every frame it is handed
#[derive(Default)]
pub struct RecordingSink {
    pub frames: Vec<SeenFrame>,
}

impl FrameSink for RecordingSink {
    fn on_frame(&mut self, frame: &Frame<'_>) {
        self.frames.push(SeenFrame {
            palette_changed: frame.palette_changed(),
            top_left: frame.pixel(0, 0),
        });
    }
}

/// Small deterministic generator for fuzz-style inputs
pub struct XorShift(pub u64);

impl XorShift {
    pub fn next_byte(&mut self) -> u8 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 24) as u8
    }

    pub fn fill(&mut self, buf: &mut [u8]) {
        for b in buf {
            *b = self.next_byte();
        }
    }
}

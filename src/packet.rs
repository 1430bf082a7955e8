// Packet - Fixed-layout decode of one 24-byte CD+G subchannel record
//
// Wire layout:
// - byte 0:      command (low 6 bits, 0x09 for graphics)
// - byte 1:      instruction (low 6 bits)
// - bytes 2-3:   parity Q (unused)
// - bytes 4-19:  instruction data
// - bytes 20-23: parity P (unused)
//
// Every field is read through a masking accessor: the upper two bits of each
// subchannel byte are P/Q channel bits and are never trusted.

use crate::error::DecodeError;
use crate::instructions::Instruction;

/// Size of one packet on the wire
pub const PACKET_SIZE: usize = 24;

/// Size of the instruction payload
pub const DATA_SIZE: usize = 16;

/// Command tag carried by every graphics packet
pub const CDG_COMMAND: u8 = 0x09;

/// Mask for the six subchannel bits R-W of a byte
pub const SUBCODE_MASK: u8 = 0x3F;

/// Mask for a 4-bit palette index or repeat counter
pub const NIBBLE_MASK: u8 = 0x0F;

/// Mask for the 5-bit tile row field
pub const TILE_ROW_MASK: u8 = 0x1F;

const DATA_OFFSET: usize = 4;

/// Low six bits of a subchannel byte
#[inline]
pub fn six_bits(byte: u8) -> u8 {
    byte & SUBCODE_MASK
}

/// Low four bits of a subchannel byte
#[inline]
pub fn nibble(byte: u8) -> u8 {
    byte & NIBBLE_MASK
}

/// One decoded CD+G instruction record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    command: u8,
    instruction: u8,
    data: [u8; DATA_SIZE],
}

impl Packet {
    /// Build a graphics packet for the given instruction
    ///
    /// Used to synthesize streams; the parity bytes are left zero when the
    /// packet is encoded with [`Packet::to_bytes`].
    pub fn new(instruction: Instruction, data: [u8; DATA_SIZE]) -> Self {
        Packet {
            command: CDG_COMMAND,
            instruction: instruction.code(),
            data,
        }
    }

    /// Parse a packet from a raw record
    ///
    /// # Arguments
    /// * `bytes` - The record, which must be exactly [`PACKET_SIZE`] bytes
    ///
    /// # Returns
    /// The packet, or `DecodeError::MalformedPacket` for any other length
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let record: &[u8; PACKET_SIZE] = bytes
            .try_into()
            .map_err(|_| DecodeError::MalformedPacket { len: bytes.len() })?;
        Ok(Self::from_bytes(record))
    }

    /// Decode a packet from a record that is already known to be the right size
    pub fn from_bytes(bytes: &[u8; PACKET_SIZE]) -> Self {
        let mut data = [0u8; DATA_SIZE];
        data.copy_from_slice(&bytes[DATA_OFFSET..DATA_OFFSET + DATA_SIZE]);

        Packet {
            command: bytes[0],
            instruction: bytes[1],
            data,
        }
    }

    /// Encode the packet back into a 24-byte record with zeroed parity
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0] = self.command;
        bytes[1] = self.instruction;
        bytes[DATA_OFFSET..DATA_OFFSET + DATA_SIZE].copy_from_slice(&self.data);
        bytes
    }

    /// Raw command byte
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Raw instruction byte
    pub fn instruction_byte(&self) -> u8 {
        self.instruction
    }

    /// Instruction payload
    pub fn data(&self) -> &[u8; DATA_SIZE] {
        &self.data
    }

    /// Whether this record carries a graphics instruction at all
    #[inline]
    pub fn is_graphics(&self) -> bool {
        six_bits(self.command) == CDG_COMMAND
    }

    /// The instruction selected by the low six bits of the instruction byte
    #[inline]
    pub fn instruction(&self) -> Instruction {
        Instruction::from_code(six_bits(self.instruction))
    }
}

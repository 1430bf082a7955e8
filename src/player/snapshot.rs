// Decoder snapshots
//
// Serializes the complete decoder state (canvas, palette, scroll offset and
// packet position) to JSON so decoding can resume from a saved point.

use crate::canvas::{FULL_HEIGHT, FULL_WIDTH, PALETTE_SIZE};
use crate::decoder::{CanvasAllocator, Decoder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Errors that can occur during snapshot operations
#[derive(Debug)]
pub enum SnapshotError {
    /// I/O error
    Io(io::Error),

    /// Serialization/deserialization error
    Serialization(serde_json::Error),

    /// Snapshot format version mismatch
    VersionMismatch { expected: u32, found: u32 },

    /// A stored array has the wrong number of entries
    InvalidLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "I/O error: {}", e),
            SnapshotError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SnapshotError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SnapshotError::InvalidLength {
                field,
                expected,
                found,
            } => write!(
                f,
                "Invalid {} length: expected {}, found {}",
                field, expected, found
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Serialization(e)
    }
}

/// Current snapshot format version
const SNAPSHOT_VERSION: u32 = 1;

/// Saved decoder state
///
/// Pixels are stored tightly packed (300 per row) whatever the stride of the
/// canvas they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderSnapshot {
    version: u32,

    /// When the snapshot was taken (RFC 3339)
    timestamp: String,

    packets_decoded: u64,
    hscroll: u8,
    vscroll: u8,

    /// Palette entries as 0xRRGGBB
    palette: Vec<u32>,
    palette_changed: bool,

    pixels: Vec<u8>,
}

impl DecoderSnapshot {
    /// Capture the state of a decoder
    pub fn from_decoder<A: CanvasAllocator>(decoder: &Decoder<A>) -> Self {
        let canvas = decoder.canvas();
        let (hscroll, vscroll) = canvas.scroll_offset();

        DecoderSnapshot {
            version: SNAPSHOT_VERSION,
            timestamp: chrono::Local::now().to_rfc3339(),
            packets_decoded: decoder.packets_decoded(),
            hscroll,
            vscroll,
            palette: canvas.palette().colors().to_vec(),
            palette_changed: canvas.palette_changed(),
            pixels: decoder.frame().packed_pixels(),
        }
    }

    /// Restore a decoder to this snapshot
    ///
    /// The snapshot is validated completely before the decoder is touched.
    pub fn restore_to_decoder<A: CanvasAllocator>(
        &self,
        decoder: &mut Decoder<A>,
    ) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        check_length("palette", PALETTE_SIZE, self.palette.len())?;
        check_length("pixels", FULL_WIDTH * FULL_HEIGHT, self.pixels.len())?;

        let canvas = decoder.canvas_mut();
        let stride = canvas.stride();
        for (y, row) in self.pixels.chunks_exact(FULL_WIDTH).enumerate() {
            let start = y * stride;
            let target = &mut canvas.pixels_mut()[start..start + FULL_WIDTH];
            for (dst, &src) in target.iter_mut().zip(row) {
                *dst = src & 0x0F;
            }
        }

        for (index, &rgb) in self.palette.iter().enumerate() {
            canvas.palette_mut().set(index as u8, rgb);
        }
        if self.palette_changed {
            canvas.mark_palette_changed();
        } else {
            canvas.clear_palette_changed();
        }
        canvas.set_scroll_offset(self.hscroll, self.vscroll);

        decoder.set_packets_decoded(self.packets_decoded);
        Ok(())
    }

    pub fn packets_decoded(&self) -> u64 {
        self.packets_decoded
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a snapshot from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn check_length(field: &'static str, expected: usize, found: usize) -> Result<(), SnapshotError> {
    if expected != found {
        return Err(SnapshotError::InvalidLength {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

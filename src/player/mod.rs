// Player module - Streams a .cdg file through the decoder
//
// A .cdg file is nothing but back-to-back 24-byte packets. The player reads
// them one at a time from any reader, feeds each to the decoder, forwards the
// emitted frames to a sink and keeps per-instruction statistics. It also
// wires up the configured logging, frame export and decoder snapshots.

mod config;
mod screenshot;
mod snapshot;

pub use config::{DecoderConfig, ExportConfig, LoggingConfig, PlayerConfig, CONFIG_FILE};
pub use screenshot::{save_frame_png, save_screenshot, FrameExporter, ScreenshotError};
pub use snapshot::{DecoderSnapshot, SnapshotError};

use crate::debug::LogLevel;
use crate::decoder::{Decoder, FrameSink, PooledAllocator};
use crate::error::DecodeError;
use crate::instructions::Instruction;
use crate::packet::{Packet, PACKET_SIZE};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Errors that stop playback
#[derive(Debug)]
pub enum PlayerError {
    /// Reading the stream or opening the log file failed
    Io(io::Error),

    /// The decoder could not continue
    Decode(DecodeError),

    /// Writing a frame failed
    Screenshot(ScreenshotError),

    /// Saving or restoring decoder state failed
    Snapshot(SnapshotError),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::Io(e) => write!(f, "I/O error: {}", e),
            PlayerError::Decode(e) => write!(f, "Decode error: {}", e),
            PlayerError::Screenshot(e) => write!(f, "Export error: {}", e),
            PlayerError::Snapshot(e) => write!(f, "Snapshot error: {}", e),
        }
    }
}

impl std::error::Error for PlayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayerError::Io(e) => Some(e),
            PlayerError::Decode(e) => Some(e),
            PlayerError::Screenshot(e) => Some(e),
            PlayerError::Snapshot(e) => Some(e),
        }
    }
}

impl From<io::Error> for PlayerError {
    fn from(e: io::Error) -> Self {
        PlayerError::Io(e)
    }
}

impl From<DecodeError> for PlayerError {
    fn from(e: DecodeError) -> Self {
        PlayerError::Decode(e)
    }
}

impl From<ScreenshotError> for PlayerError {
    fn from(e: ScreenshotError) -> Self {
        PlayerError::Screenshot(e)
    }
}

impl From<SnapshotError> for PlayerError {
    fn from(e: SnapshotError) -> Self {
        PlayerError::Snapshot(e)
    }
}

/// Counters collected while playing a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Complete records read
    pub packets: u64,

    /// Frames handed to the sink
    pub frames: u64,

    /// Records that were not graphics packets
    pub ignored_packets: u64,

    /// Records that could not be decoded (a truncated tail)
    pub malformed: u64,

    /// Graphics packets seen, by instruction code
    pub instruction_counts: BTreeMap<u8, u64>,
}

impl PlaybackStats {
    /// Number of graphics packets that carried `instruction`
    pub fn count(&self, instruction: Instruction) -> u64 {
        self.instruction_counts
            .get(&instruction.code())
            .copied()
            .unwrap_or(0)
    }

    fn merge(&mut self, other: &PlaybackStats) {
        self.packets += other.packets;
        self.frames += other.frames;
        self.ignored_packets += other.ignored_packets;
        self.malformed += other.malformed;
        for (&code, &count) in &other.instruction_counts {
            *self.instruction_counts.entry(code).or_insert(0) += count;
        }
    }
}

/// Stream player
///
/// Owns a decoder backed by a bounded canvas pool, sized from the
/// configuration.
pub struct Player {
    decoder: Decoder<PooledAllocator>,

    config: PlayerConfig,

    /// File currently being played, if any
    source_path: Option<PathBuf>,

    /// Totals over every stream played
    stats: PlaybackStats,
}

impl Player {
    /// Create a player from a configuration
    ///
    /// # Returns
    ///
    /// The player, or an error if the canvas cannot be allocated or the log
    /// file cannot be created
    ///
    /// # Example
    ///
    /// ```
    /// use cdg_rs::player::{Player, PlayerConfig};
    ///
    /// let player = Player::new(PlayerConfig::default()).unwrap();
    /// assert_eq!(player.decoder().canvas().stride(), 300);
    /// ```
    pub fn new(config: PlayerConfig) -> Result<Self, PlayerError> {
        let allocator = PooledAllocator::new(config.decoder.pool_capacity);
        let mut decoder = Decoder::with_allocator(allocator, config.decoder.stride)?;

        let logger = decoder.logger_mut();
        logger.set_log_level(config.logging.level);
        if config.logging.packet_trace {
            logger.enable_packet_trace();
        }
        if let Some(path) = &config.logging.log_file {
            logger.open_log_file(path)?;
        }

        Ok(Player {
            decoder,
            config,
            source_path: None,
            stats: PlaybackStats::default(),
        })
    }

    /// Decode every packet from `reader`
    ///
    /// Reading stops at end of input. A trailing partial record is counted as
    /// malformed and otherwise ignored. An allocation failure stops playback
    /// with the decoder still holding the last good frame.
    ///
    /// # Arguments
    ///
    /// * `reader` - Source of back-to-back 24-byte packets
    /// * `sink` - Receives every emitted frame
    ///
    /// # Returns
    ///
    /// Statistics for this stream
    pub fn play<R, S>(&mut self, mut reader: R, sink: &mut S) -> Result<PlaybackStats, PlayerError>
    where
        R: Read,
        S: FrameSink + ?Sized,
    {
        let mut stats = PlaybackStats::default();
        let mut record = [0u8; PACKET_SIZE];

        loop {
            let filled = read_record(&mut reader, &mut record)?;
            if filled == 0 {
                break;
            }
            if filled < PACKET_SIZE {
                // Logged by the decoder
                let _ = self.decoder.decode(&record[..filled], sink);
                stats.malformed += 1;
                break;
            }

            stats.packets += 1;
            match self.decoder.decode(&record, sink) {
                Ok(true) => {
                    stats.frames += 1;
                    let code = Packet::from_bytes(&record).instruction().code();
                    *stats.instruction_counts.entry(code).or_insert(0) += 1;
                }
                Ok(false) => stats.ignored_packets += 1,
                Err(e) => {
                    self.stats.merge(&stats);
                    return Err(e.into());
                }
            }
        }

        if self.decoder.logger().is_enabled(LogLevel::Info) {
            self.decoder.logger_mut().log_message(
                LogLevel::Info,
                format!(
                    "played {} packets, {} frames, {} ignored, {} malformed",
                    stats.packets, stats.frames, stats.ignored_packets, stats.malformed
                ),
            );
        }

        self.stats.merge(&stats);
        Ok(stats)
    }

    /// Open and play a .cdg file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the .cdg file
    /// * `sink` - Receives every emitted frame
    pub fn play_file<P, S>(&mut self, path: P, sink: &mut S) -> Result<PlaybackStats, PlayerError>
    where
        P: AsRef<Path>,
        S: FrameSink + ?Sized,
    {
        let path = path.as_ref();
        let file = File::open(path)?;
        self.source_path = Some(path.to_path_buf());

        self.play(BufReader::new(file), sink)
    }

    /// Save the current frame as the final screenshot of this source
    ///
    /// # Returns
    ///
    /// Path of the written PNG
    pub fn screenshot(&self) -> Result<PathBuf, ScreenshotError> {
        save_screenshot(
            &self.decoder.frame(),
            self.source_path.as_deref(),
            &self.config.export,
        )
    }

    /// Write the decoder state to a JSON file
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        DecoderSnapshot::from_decoder(&self.decoder).save_to_file(path)
    }

    /// Restore the decoder state from a JSON file
    pub fn load_snapshot<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SnapshotError> {
        let snapshot = DecoderSnapshot::load_from_file(path)?;
        snapshot.restore_to_decoder(&mut self.decoder)
    }

    /// Reset the decoder and statistics for a new stream
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.stats = PlaybackStats::default();
        self.source_path = None;
    }

    pub fn decoder(&self) -> &Decoder<PooledAllocator> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder<PooledAllocator> {
        &mut self.decoder
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Totals since the player was created or last reset
    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }
}

/// Fill `record` from `reader`
///
/// # Returns
///
/// Bytes read; less than a full record only at end of input
fn read_record<R: Read>(reader: &mut R, record: &mut [u8; PACKET_SIZE]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < PACKET_SIZE {
        match reader.read(&mut record[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

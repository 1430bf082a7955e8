// CD+G Decoder Library
// Core library for decoding CD+G karaoke subchannel graphics

// Public modules
pub mod canvas;
pub mod debug;
pub mod decoder;
pub mod error;
pub mod instructions;
pub mod packet;
pub mod player;

// Re-export main types for convenience
pub use canvas::{Canvas, Palette};
pub use debug::{LogLevel, Logger, PacketTrace, ScrollTrace, TraceEntry};
pub use decoder::{
    CanvasAllocator, Decoder, Frame, FrameSink, HeapAllocator, NullSink, PooledAllocator,
};
pub use error::{AllocationError, DecodeError};
pub use instructions::{Instruction, ScrollMode, TileMode};
pub use packet::{Packet, PACKET_SIZE};
pub use player::{
    DecoderSnapshot, FrameExporter, PlaybackStats, Player, PlayerConfig, PlayerError,
    ScreenshotError, SnapshotError,
};

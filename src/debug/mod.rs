// Debug module - Decoder tracing
//
// Provides a trace logger the decoder reports packets, scrolls and failures
// to. Tracing is off by default and never changes what is decoded.

pub mod logger;

pub use logger::{LogLevel, Logger, PacketTrace, ScrollTrace, TraceEntry};

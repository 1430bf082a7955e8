// Logger - Trace logging for packet decoding
//
// Provides:
// - Per-packet instruction trace
// - Scroll trace (net shift and new fine offset)
// - Leveled messages for failures and dropped work
// - Log output to file or memory

use crate::instructions::{Instruction, ScrollMode};
use crate::packet::DATA_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warning,
    /// Info, warnings, and errors
    Info,
    /// Debug information (includes scroll traces)
    Debug,
    /// Verbose trace logging (includes packet traces)
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::None => "NONE",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        };
        f.write_str(name)
    }
}

/// One decoded graphics packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketTrace {
    /// Position of the packet in the stream, counting every record fed in
    pub index: u64,
    pub instruction: Instruction,
    pub data: [u8; DATA_SIZE],
}

impl fmt::Display for PacketTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08} {:<20}", self.index, self.instruction.to_string())?;
        for byte in &self.data {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// One scroll that moved pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollTrace {
    pub mode: ScrollMode,
    pub dx: i32,
    pub dy: i32,
    /// Fine offset in effect after the scroll
    pub hscroll: u8,
    pub vscroll: u8,
}

impl fmt::Display for ScrollTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scroll {:?} dx={:+} dy={:+} offset=({}, {})",
            self.mode, self.dx, self.dy, self.hscroll, self.vscroll
        )
    }
}

/// Trace entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEntry {
    Packet(PacketTrace),
    Scroll(ScrollTrace),
    Message { level: LogLevel, text: String },
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEntry::Packet(trace) => write!(f, "PKT: {}", trace),
            TraceEntry::Scroll(trace) => write!(f, "SCR: {}", trace),
            TraceEntry::Message { level, text } => write!(f, "[{}] {}", level, text),
        }
    }
}

/// Logger
///
/// Collects trace entries in a bounded in-memory buffer and optionally
/// mirrors them to a file.
pub struct Logger {
    log_level: LogLevel,

    /// Record every graphics packet (needs `LogLevel::Trace`)
    packet_trace: bool,

    trace_buffer: Vec<TraceEntry>,

    /// Maximum number of entries in trace buffer (0 = unlimited)
    max_buffer_size: usize,

    output_file: Option<File>,
}

impl Logger {
    /// Create a silent logger
    pub fn new() -> Self {
        Logger {
            log_level: LogLevel::None,
            packet_trace: false,
            trace_buffer: Vec::new(),
            max_buffer_size: 10000,
            output_file: None,
        }
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Whether a message at `level` would be recorded
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && level <= self.log_level
    }

    pub fn enable_packet_trace(&mut self) {
        self.packet_trace = true;
    }

    pub fn disable_packet_trace(&mut self) {
        self.packet_trace = false;
    }

    /// Check if packet tracing is enabled
    ///
    /// # Returns
    ///
    /// `true` if packet trace is switched on and the level is `Trace`
    pub fn is_packet_trace_enabled(&self) -> bool {
        self.packet_trace && self.log_level >= LogLevel::Trace
    }

    /// Set maximum trace buffer size
    ///
    /// When the buffer exceeds this size, old entries are removed.
    /// Set to 0 for unlimited size.
    pub fn set_max_buffer_size(&mut self, size: usize) {
        self.max_buffer_size = size;

        if size > 0 && self.trace_buffer.len() > size {
            self.trace_buffer.drain(0..self.trace_buffer.len() - size);
        }
    }

    /// Open a log file for output
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the log file; an existing file is truncated
    pub fn open_log_file<P: AsRef<Path>>(&mut self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        self.output_file = Some(file);
        Ok(())
    }

    pub fn close_log_file(&mut self) {
        self.output_file = None;
    }

    /// Log a decoded packet
    pub fn log_packet(&mut self, trace: PacketTrace) {
        if !self.is_packet_trace_enabled() {
            return;
        }

        self.add_entry(TraceEntry::Packet(trace));
    }

    /// Log a scroll that moved pixels
    pub fn log_scroll(&mut self, trace: ScrollTrace) {
        if !self.is_enabled(LogLevel::Debug) {
            return;
        }

        self.add_entry(TraceEntry::Scroll(trace));
    }

    /// Log a message
    ///
    /// # Arguments
    ///
    /// * `level` - The log level for this message
    /// * `message` - The message to log
    pub fn log_message(&mut self, level: LogLevel, message: String) {
        if !self.is_enabled(level) {
            return;
        }

        self.add_entry(TraceEntry::Message {
            level,
            text: message,
        });
    }

    fn add_entry(&mut self, entry: TraceEntry) {
        if let Some(ref mut file) = self.output_file {
            let _ = writeln!(file, "{}", entry);
        }

        self.trace_buffer.push(entry);

        if self.max_buffer_size > 0 && self.trace_buffer.len() > self.max_buffer_size {
            self.trace_buffer.remove(0);
        }
    }

    pub fn trace_buffer(&self) -> &[TraceEntry] {
        &self.trace_buffer
    }

    pub fn clear_buffer(&mut self) {
        self.trace_buffer.clear();
    }

    /// Get the last N trace entries
    pub fn last_entries(&self, count: usize) -> &[TraceEntry] {
        let start = self.trace_buffer.len().saturating_sub(count);
        &self.trace_buffer[start..]
    }

    /// Format the whole trace buffer, one entry per line
    pub fn format_trace_buffer(&self) -> String {
        let mut output = String::new();

        for entry in &self.trace_buffer {
            output.push_str(&format!("{}\n", entry));
        }

        output
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

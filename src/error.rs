// Error types shared by the packet parser, the decoder and the canvas allocators
//
// Only two conditions ever fail a decode step: a record that is not exactly
// one packet long, and a host that cannot hand out a new canvas for a scroll.
// Everything else the decoder sees (unknown instructions, off-canvas tiles,
// zero-length scrolls) is a defined no-op.

use std::fmt;

/// Errors raised when a canvas buffer cannot be supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The pixel buffer could not be reserved
    OutOfMemory { bytes: usize },

    /// The requested row stride is narrower than a canvas row
    InvalidStride { stride: usize },

    /// A bounded pool already has every buffer checked out
    PoolExhausted { capacity: usize },

    /// The allocator returned a canvas with a different row stride
    ShapeMismatch { expected: usize, found: usize },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::OutOfMemory { bytes } => {
                write!(f, "could not reserve {} bytes for a canvas", bytes)
            }
            AllocationError::InvalidStride { stride } => {
                write!(f, "stride {} is narrower than a canvas row", stride)
            }
            AllocationError::PoolExhausted { capacity } => {
                write!(f, "all {} pooled canvases are in use", capacity)
            }
            AllocationError::ShapeMismatch { expected, found } => write!(
                f,
                "canvas stride mismatch: expected {}, found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for AllocationError {}

/// Errors that abort a single decode step
///
/// Either kind leaves the decoder exactly as it was before the call, so the
/// caller may keep feeding packets afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input record was not exactly one packet long
    MalformedPacket { len: usize },

    /// A scroll needed a fresh canvas and the allocator could not supply one
    BufferAllocationFailure(AllocationError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedPacket { len } => write!(
                f,
                "malformed packet: expected {} bytes, got {}",
                crate::packet::PACKET_SIZE,
                len
            ),
            DecodeError::BufferAllocationFailure(e) => {
                write!(f, "buffer allocation failed: {}", e)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::BufferAllocationFailure(e) => Some(e),
            DecodeError::MalformedPacket { .. } => None,
        }
    }
}

impl From<AllocationError> for DecodeError {
    fn from(e: AllocationError) -> Self {
        DecodeError::BufferAllocationFailure(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_malformed_packet_message() {
        let err = DecodeError::MalformedPacket { len: 23 };
        assert_eq!(
            err.to_string(),
            "malformed packet: expected 24 bytes, got 23"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_allocation_error_conversion() {
        let err: DecodeError = AllocationError::PoolExhausted { capacity: 2 }.into();
        assert_eq!(
            err,
            DecodeError::BufferAllocationFailure(AllocationError::PoolExhausted { capacity: 2 })
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("all 2 pooled canvases"));
    }
}

// Canvas allocators - Where scroll instructions get their second buffer from
//
// A scroll renders into a new canvas and hands the old one back. Hosts that
// manage their own frame memory implement `CanvasAllocator`; the two
// implementations here cover plain heap allocation and a bounded recycling
// pool.

use crate::canvas::Canvas;
use crate::error::AllocationError;

/// Source of canvas buffers for the decoder
pub trait CanvasAllocator {
    /// Hand out a canvas with the given row stride
    ///
    /// The contents may be stale; the decoder overwrites every pixel.
    fn acquire(&mut self, stride: usize) -> Result<Canvas, AllocationError>;

    /// Take back a canvas the decoder no longer uses
    fn release(&mut self, canvas: Canvas);
}

/// Allocates a fresh zeroed canvas every time and drops released ones
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl CanvasAllocator for HeapAllocator {
    fn acquire(&mut self, stride: usize) -> Result<Canvas, AllocationError> {
        Canvas::try_with_stride(stride)
    }

    fn release(&mut self, _canvas: Canvas) {}
}

/// Recycles released canvases and bounds how many may be live at once
///
/// The decoder holds one canvas and needs a second only for the duration of
/// a scroll, so a capacity of 2 never runs dry.
#[derive(Debug, Default)]
pub struct PooledAllocator {
    /// Released canvases ready for reuse
    free: Vec<Canvas>,

    /// Canvases handed out and not yet released
    live: usize,

    /// Maximum number of live canvases (0 = unbounded)
    capacity: usize,

    /// Number of acquisitions served from `free`
    reused: u64,
}

impl PooledAllocator {
    /// Create a pool
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of canvases checked out at once (0 = unbounded)
    pub fn new(capacity: usize) -> Self {
        PooledAllocator {
            capacity,
            ..Self::default()
        }
    }

    /// Number of canvases currently checked out
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of released canvases waiting for reuse
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of acquisitions that reused a released canvas
    pub fn reused(&self) -> u64 {
        self.reused
    }
}

impl CanvasAllocator for PooledAllocator {
    fn acquire(&mut self, stride: usize) -> Result<Canvas, AllocationError> {
        if self.capacity > 0 && self.live >= self.capacity {
            return Err(AllocationError::PoolExhausted {
                capacity: self.capacity,
            });
        }

        let canvas = match self.free.iter().position(|c| c.stride() == stride) {
            Some(index) => {
                self.reused += 1;
                self.free.swap_remove(index)
            }
            None => Canvas::try_with_stride(stride)?,
        };

        self.live += 1;
        Ok(canvas)
    }

    fn release(&mut self, canvas: Canvas) {
        self.live = self.live.saturating_sub(1);
        self.free.push(canvas);
    }
}

// Decoder module - Packet dispatch and canvas ownership
//
// The decoder owns the only live canvas. Each call parses one record,
// dispatches its instruction to a handler and, for graphics packets, lends
// the resulting canvas to a frame sink. Scroll instructions are the one
// exception to in-place drawing: they render into a second canvas taken from
// the allocator, which replaces the current one only once it is complete.

pub mod allocator;
pub mod sink;

pub use allocator::{CanvasAllocator, HeapAllocator, PooledAllocator};
pub use sink::{expand_rgb, Frame, FrameSink, NullSink};

use crate::canvas::{Canvas, FULL_WIDTH};
use crate::debug::{LogLevel, Logger, PacketTrace, ScrollTrace};
use crate::error::{AllocationError, DecodeError};
use crate::instructions::{
    Instruction, PaletteHalf, ScrollMode, ScrollParams, TileBlock, TileMode,
};
use crate::packet::{Packet, DATA_SIZE};

/// CD+G packet decoder
pub struct Decoder<A: CanvasAllocator = HeapAllocator> {
    canvas: Canvas,
    allocator: A,
    logger: Logger,

    /// Records successfully decoded, graphics or not
    packets_decoded: u64,
}

impl Decoder<HeapAllocator> {
    /// Create a decoder with a tightly packed canvas on the heap
    ///
    /// # Example
    ///
    /// ```
    /// use cdg_rs::decoder::{Decoder, NullSink};
    ///
    /// let mut decoder = Decoder::new();
    /// let mut record = [0u8; 24];
    /// record[0] = 0x09; // graphics command
    /// record[1] = 0x01; // memory preset
    /// record[4] = 0x03; // color 3
    /// decoder.decode(&record, &mut NullSink).unwrap();
    /// assert_eq!(decoder.canvas().get_pixel(0, 0), 3);
    /// ```
    pub fn new() -> Self {
        Decoder {
            canvas: Canvas::new(),
            allocator: HeapAllocator,
            logger: Logger::new(),
            packets_decoded: 0,
        }
    }
}

impl Default for Decoder<HeapAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: CanvasAllocator> Decoder<A> {
    /// Create a decoder whose canvases come from `allocator`
    ///
    /// # Arguments
    /// * `allocator` - Source of the initial canvas and of every scroll target
    /// * `stride` - Row stride of the canvases, at least 300
    pub fn with_allocator(mut allocator: A, stride: usize) -> Result<Self, DecodeError> {
        if stride < FULL_WIDTH {
            return Err(AllocationError::InvalidStride { stride }.into());
        }

        let mut canvas = allocator.acquire(stride)?;
        if canvas.stride() != stride {
            let found = canvas.stride();
            allocator.release(canvas);
            return Err(AllocationError::ShapeMismatch {
                expected: stride,
                found,
            }
            .into());
        }
        canvas.reset();

        Ok(Decoder {
            canvas,
            allocator,
            logger: Logger::new(),
            packets_decoded: 0,
        })
    }

    /// Decode one record and hand the resulting frame to `sink`
    ///
    /// # Arguments
    /// * `bytes` - One 24-byte packet
    /// * `sink` - Receives the frame if the packet was a graphics packet
    ///
    /// # Returns
    /// `Ok(true)` if a frame was emitted, `Ok(false)` for non-graphics
    /// packets. On error the decoder state is unchanged.
    pub fn decode<S>(&mut self, bytes: &[u8], sink: &mut S) -> Result<bool, DecodeError>
    where
        S: FrameSink + ?Sized,
    {
        let packet = match Packet::parse(bytes) {
            Ok(packet) => packet,
            Err(e) => {
                self.logger.log_message(LogLevel::Error, e.to_string());
                return Err(e);
            }
        };

        if !self.decode_packet(&packet)? {
            return Ok(false);
        }

        sink.on_frame(&Frame::new(&self.canvas));
        self.canvas.clear_palette_changed();
        Ok(true)
    }

    /// Apply one parsed packet to the canvas without emitting a frame
    ///
    /// The palette-changed flag stays set until a frame is emitted by
    /// [`Decoder::decode`].
    ///
    /// # Returns
    /// `Ok(true)` if the packet was a graphics packet
    pub fn decode_packet(&mut self, packet: &Packet) -> Result<bool, DecodeError> {
        if !packet.is_graphics() {
            self.packets_decoded += 1;
            return Ok(false);
        }

        let instruction = packet.instruction();
        if self.logger.is_packet_trace_enabled() {
            self.logger.log_packet(PacketTrace {
                index: self.packets_decoded,
                instruction,
                data: *packet.data(),
            });
        }

        self.execute(instruction, packet.data())?;
        self.packets_decoded += 1;
        Ok(true)
    }

    /// Run a single instruction against the canvas
    pub fn execute(
        &mut self,
        instruction: Instruction,
        data: &[u8; DATA_SIZE],
    ) -> Result<(), DecodeError> {
        match instruction {
            Instruction::MemoryPreset => self.canvas.memory_preset(data),
            Instruction::BorderPreset => self.canvas.border_preset(data),
            Instruction::LoadPaletteLow => self.canvas.load_palette(data, PaletteHalf::Low),
            Instruction::LoadPaletteHigh => self.canvas.load_palette(data, PaletteHalf::High),
            Instruction::TileBlock => self.tile_block(data, TileMode::Normal),
            Instruction::TileBlockXor => self.tile_block(data, TileMode::Xor),
            Instruction::ScrollPreset => self.scroll(data, ScrollMode::Preset)?,
            Instruction::ScrollCopy => self.scroll(data, ScrollMode::Copy)?,
            Instruction::Unknown(code) => {
                if self.logger.is_enabled(LogLevel::Debug) {
                    self.logger
                        .log_message(LogLevel::Debug, format!("ignoring instruction {}", code));
                }
            }
        }

        Ok(())
    }

    fn tile_block(&mut self, data: &[u8; DATA_SIZE], mode: TileMode) {
        let painted = self.canvas.tile_block(data, mode);
        if !painted && self.logger.is_enabled(LogLevel::Debug) {
            let tile = TileBlock::from_data(data);
            let (hscroll, vscroll) = self.canvas.scroll_offset();
            self.logger.log_message(
                LogLevel::Debug,
                format!(
                    "dropping tile at ({}, {}) with offset ({}, {})",
                    tile.col, tile.row, hscroll, vscroll
                ),
            );
        }
    }

    /// Scroll the canvas, swapping in a freshly rendered one
    ///
    /// The new offset is only committed together with the new canvas, so a
    /// failed acquisition leaves the decoder untouched.
    fn scroll(&mut self, data: &[u8; DATA_SIZE], mode: ScrollMode) -> Result<(), DecodeError> {
        let params = ScrollParams::from_data(data);
        let shift = self.canvas.scroll_shift(&params);

        if shift.is_zero() {
            self.canvas
                .set_scroll_offset(params.h_offset, params.v_offset);
            return Ok(());
        }

        let mut next = self.acquire_canvas()?;
        self.canvas
            .scroll_into(&mut next, shift, params.color, mode);
        next.set_scroll_offset(params.h_offset, params.v_offset);

        let previous = std::mem::replace(&mut self.canvas, next);
        self.allocator.release(previous);

        self.logger.log_scroll(ScrollTrace {
            mode,
            dx: shift.dx,
            dy: shift.dy,
            hscroll: params.h_offset,
            vscroll: params.v_offset,
        });

        Ok(())
    }

    fn acquire_canvas(&mut self) -> Result<Canvas, DecodeError> {
        let stride = self.canvas.stride();
        let result = self.allocator.acquire(stride).and_then(|canvas| {
            if canvas.stride() == stride {
                Ok(canvas)
            } else {
                let found = canvas.stride();
                self.allocator.release(canvas);
                Err(AllocationError::ShapeMismatch {
                    expected: stride,
                    found,
                })
            }
        });

        result.map_err(|e| {
            let err = DecodeError::from(e);
            self.logger.log_message(LogLevel::Error, err.to_string());
            err
        })
    }

    /// Put the canvas back into its initial state and restart the packet count
    pub fn reset(&mut self) {
        self.canvas.reset();
        self.packets_decoded = 0;
    }

    /// The current frame, without clearing the palette-changed flag
    pub fn frame(&self) -> Frame<'_> {
        Frame::new(&self.canvas)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mutable canvas access, for restoring saved state
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn packets_decoded(&self) -> u64 {
        self.packets_decoded
    }

    pub(crate) fn set_packets_decoded(&mut self, count: u64) {
        self.packets_decoded = count;
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PACKET_SIZE;

    fn record(instruction: u8, data: &[u8]) -> [u8; PACKET_SIZE] {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0] = 0x09;
        bytes[1] = instruction;
        bytes[4..4 + data.len()].copy_from_slice(data);
        bytes
    }

    /// Allocator that always fails
    struct FailingAllocator;

    impl CanvasAllocator for FailingAllocator {
        fn acquire(&mut self, _stride: usize) -> Result<Canvas, AllocationError> {
            Err(AllocationError::OutOfMemory { bytes: 0 })
        }

        fn release(&mut self, _canvas: Canvas) {}
    }

    /// Allocator that hands out canvases of the wrong stride after the first
    struct WrongStrideAllocator {
        handed_out: usize,
        released: usize,
    }

    impl CanvasAllocator for WrongStrideAllocator {
        fn acquire(&mut self, stride: usize) -> Result<Canvas, AllocationError> {
            self.handed_out += 1;
            if self.handed_out == 1 {
                Canvas::try_with_stride(stride)
            } else {
                Canvas::try_with_stride(stride + 4)
            }
        }

        fn release(&mut self, _canvas: Canvas) {
            self.released += 1;
        }
    }

    #[test]
    fn test_non_graphics_packet_is_ignored() {
        let mut decoder = Decoder::new();
        let mut bytes = record(1, &[5, 0]);
        bytes[0] = 0x08;

        let mut frames = 0;
        let emitted = decoder
            .decode(&bytes, &mut |_: &Frame<'_>| frames += 1)
            .unwrap();

        assert!(!emitted);
        assert_eq!(frames, 0);
        assert_eq!(decoder.canvas().get_pixel(0, 0), 0);
        assert_eq!(decoder.packets_decoded(), 1);
    }

    #[test]
    fn test_malformed_packet_leaves_state() {
        let mut decoder = Decoder::new();
        decoder.decode(&record(1, &[5, 0]), &mut NullSink).unwrap();

        let err = decoder.decode(&[0x09, 0x01, 0, 0], &mut NullSink);
        assert_eq!(err, Err(DecodeError::MalformedPacket { len: 4 }));
        assert_eq!(decoder.packets_decoded(), 1);
        assert!(decoder.canvas().pixels().iter().all(|&p| p == 5));
    }

    #[test]
    fn test_unknown_instruction_is_a_no_op() {
        let mut decoder = Decoder::new();
        decoder.logger_mut().set_log_level(LogLevel::Debug);

        let emitted = decoder.decode(&record(7, &[5, 0]), &mut NullSink).unwrap();
        assert!(emitted);
        assert!(decoder.canvas().pixels().iter().all(|&p| p == 0));
        assert_eq!(
            decoder.logger().trace_buffer()[0].to_string(),
            "[DEBUG] ignoring instruction 7"
        );
    }

    #[test]
    fn test_palette_changed_reported_once() {
        let mut decoder = Decoder::new();
        let mut flags = Vec::new();
        let mut sink = |frame: &Frame<'_>| flags.push(frame.palette_changed());

        decoder.decode(&record(30, &[0x3F, 0x3F]), &mut sink).unwrap();
        decoder.decode(&record(1, &[0, 0]), &mut sink).unwrap();

        assert_eq!(flags, vec![true, false]);
        assert_eq!(decoder.canvas().palette().get(0), 0xFFFFFF);
    }

    #[test]
    fn test_zero_shift_scroll_keeps_canvas() {
        let mut decoder = Decoder::with_allocator(PooledAllocator::new(1), FULL_WIDTH).unwrap();
        decoder.decode(&record(1, &[4, 0]), &mut NullSink).unwrap();

        // Capacity 1 is enough: a zero shift never asks for a new canvas
        decoder
            .decode(&record(20, &[0, 0x00, 0x00]), &mut NullSink)
            .unwrap();
        assert!(decoder.canvas().pixels().iter().all(|&p| p == 4));
        assert_eq!(decoder.allocator().live(), 1);
    }

    #[test]
    fn test_scroll_swaps_and_releases() {
        let mut decoder = Decoder::with_allocator(PooledAllocator::new(2), FULL_WIDTH).unwrap();
        decoder.canvas_mut().set_pixel(0, 0, 9);

        decoder
            .decode(&record(24, &[0, 0x10, 0x00]), &mut NullSink)
            .unwrap();
        assert_eq!(decoder.canvas().get_pixel(6, 0), 9);
        assert_eq!(decoder.allocator().live(), 1);
        assert_eq!(decoder.allocator().available(), 1);

        // The released canvas is reused on the next scroll
        decoder
            .decode(&record(24, &[0, 0x20, 0x00]), &mut NullSink)
            .unwrap();
        assert_eq!(decoder.canvas().get_pixel(0, 0), 9);
        assert_eq!(decoder.allocator().reused(), 1);
    }

    #[test]
    fn test_allocation_failure_preserves_state() {
        let mut decoder = Decoder::with_allocator(PooledAllocator::new(1), FULL_WIDTH).unwrap();
        decoder.logger_mut().set_log_level(LogLevel::Error);
        decoder.decode(&record(1, &[4, 0]), &mut NullSink).unwrap();
        let before = decoder.canvas().clone();

        let mut frames = 0;
        let result = decoder.decode(&record(24, &[0, 0x13, 0x25]), &mut |_: &Frame<'_>| {
            frames += 1
        });

        assert_eq!(
            result,
            Err(DecodeError::BufferAllocationFailure(
                AllocationError::PoolExhausted { capacity: 1 }
            ))
        );
        assert_eq!(frames, 0);
        assert_eq!(decoder.canvas(), &before);
        assert_eq!(decoder.canvas().scroll_offset(), (0, 0));
        assert_eq!(decoder.packets_decoded(), 1);
        assert_eq!(decoder.logger().trace_buffer().len(), 1);
    }

    #[test]
    fn test_failing_allocator_at_construction() {
        let result = Decoder::with_allocator(FailingAllocator, FULL_WIDTH);
        assert!(matches!(
            result,
            Err(DecodeError::BufferAllocationFailure(
                AllocationError::OutOfMemory { .. }
            ))
        ));
    }

    #[test]
    fn test_stride_mismatch_is_rejected() {
        let allocator = WrongStrideAllocator {
            handed_out: 0,
            released: 0,
        };
        let mut decoder = Decoder::with_allocator(allocator, FULL_WIDTH).unwrap();

        let result = decoder.decode(&record(24, &[0, 0x10, 0x00]), &mut NullSink);
        assert_eq!(
            result,
            Err(DecodeError::BufferAllocationFailure(
                AllocationError::ShapeMismatch {
                    expected: FULL_WIDTH,
                    found: FULL_WIDTH + 4
                }
            ))
        );
        assert_eq!(decoder.allocator().released, 1);
        assert_eq!(decoder.canvas().stride(), FULL_WIDTH);
    }

    #[test]
    fn test_recycled_canvas_is_reset() {
        let mut pool = PooledAllocator::new(0);
        let mut dirty = pool.acquire(FULL_WIDTH).unwrap();
        dirty.fill(7);
        dirty.set_scroll_offset(3, 3);
        pool.release(dirty);

        let decoder = Decoder::with_allocator(pool, FULL_WIDTH).unwrap();
        assert!(decoder.canvas().pixels().iter().all(|&p| p == 0));
        assert_eq!(decoder.canvas().scroll_offset(), (0, 0));
    }

    #[test]
    fn test_packet_trace() {
        let mut decoder = Decoder::new();
        decoder.logger_mut().set_log_level(LogLevel::Trace);
        decoder.logger_mut().enable_packet_trace();

        decoder.decode(&record(6, &[0, 1]), &mut NullSink).unwrap();
        decoder
            .decode(&record(20, &[0, 0x10, 0x00]), &mut NullSink)
            .unwrap();

        let lines: Vec<String> = decoder
            .logger()
            .trace_buffer()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("PKT: #00000000 TILE_BLOCK(6)"));
        assert!(lines[1].starts_with("PKT: #00000001 SCROLL_PRESET(20)"));
        assert_eq!(lines[2], "SCR: scroll Preset dx=+6 dy=+0 offset=(0, 0)");
    }

    #[test]
    fn test_reset() {
        let mut decoder = Decoder::new();
        decoder.decode(&record(1, &[2, 0]), &mut NullSink).unwrap();
        decoder
            .decode(&record(20, &[0, 0x03, 0x04]), &mut NullSink)
            .unwrap();

        decoder.reset();
        assert_eq!(decoder.packets_decoded(), 0);
        assert_eq!(decoder.canvas().scroll_offset(), (0, 0));
        assert!(decoder.canvas().pixels().iter().all(|&p| p == 0));
    }
}

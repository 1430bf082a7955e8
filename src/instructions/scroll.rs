// Scrolling: SCROLL_PRESET and SCROLL_COPY
//
// A scroll moves the whole canvas by a coarse step (one tile, 6 or 12 pixels)
// in a chosen direction plus the change in fine offset. The result is built
// in a second canvas: in-bounds pixels are shifted across, then the strip
// uncovered by the shift is filled, either from the opposite edge (copy) or
// with a flat color (preset). The vertical strip is filled before the
// horizontal one, so the corners end up holding the horizontal fill.

use crate::canvas::{Canvas, BORDER_HEIGHT, BORDER_WIDTH, FULL_HEIGHT, FULL_WIDTH};
use crate::packet::{nibble, six_bits, DATA_SIZE};

const SCROLL_COMMAND_MASK: u8 = 0x30;
const SCROLL_COMMAND_SHIFT: u8 = 4;
const HSCROLL_OFFSET_MASK: u8 = 0x07;
const VSCROLL_OFFSET_MASK: u8 = 0x0F;

/// How the strip uncovered by a scroll is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// Fill with the instruction's color
    Preset,
    /// Wrap around: fill with the pixels pushed off the opposite edge
    Copy,
}

/// Coarse horizontal scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HScrollCommand {
    None,
    Right,
    Left,
}

impl HScrollCommand {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => HScrollCommand::Right,
            2 => HScrollCommand::Left,
            _ => HScrollCommand::None,
        }
    }

    /// Signed pixel step for this direction
    pub fn step(self) -> i32 {
        match self {
            HScrollCommand::None => 0,
            HScrollCommand::Right => BORDER_WIDTH as i32,
            HScrollCommand::Left => -(BORDER_WIDTH as i32),
        }
    }
}

/// Coarse vertical scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VScrollCommand {
    None,
    Down,
    Up,
}

impl VScrollCommand {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => VScrollCommand::Down,
            2 => VScrollCommand::Up,
            _ => VScrollCommand::None,
        }
    }

    /// Signed pixel step for this direction
    pub fn step(self) -> i32 {
        match self {
            VScrollCommand::None => 0,
            VScrollCommand::Down => BORDER_HEIGHT as i32,
            VScrollCommand::Up => -(BORDER_HEIGHT as i32),
        }
    }
}

/// Decoded payload of a scroll instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollParams {
    /// Fill color for preset scrolls
    pub color: u8,
    pub h_command: HScrollCommand,
    /// New horizontal fine offset (0-5)
    pub h_offset: u8,
    pub v_command: VScrollCommand,
    /// New vertical fine offset (0-11)
    pub v_offset: u8,
}

impl ScrollParams {
    /// Decode a scroll payload
    pub fn from_data(data: &[u8; DATA_SIZE]) -> Self {
        let hscroll = six_bits(data[1]);
        let vscroll = six_bits(data[2]);

        ScrollParams {
            color: nibble(data[0]),
            h_command: HScrollCommand::from_bits(
                (hscroll & SCROLL_COMMAND_MASK) >> SCROLL_COMMAND_SHIFT,
            ),
            h_offset: (hscroll & HSCROLL_OFFSET_MASK).min(BORDER_WIDTH as u8 - 1),
            v_command: VScrollCommand::from_bits(
                (vscroll & SCROLL_COMMAND_MASK) >> SCROLL_COMMAND_SHIFT,
            ),
            v_offset: (vscroll & VSCROLL_OFFSET_MASK).min(BORDER_HEIGHT as u8 - 1),
        }
    }
}

/// Net pixel displacement of a scroll; positive is right/down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollShift {
    pub dx: i32,
    pub dy: i32,
}

impl ScrollShift {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

impl Canvas {
    /// Net shift a scroll instruction applies, given this canvas's current
    /// fine offset
    pub fn scroll_shift(&self, params: &ScrollParams) -> ScrollShift {
        let (hscroll, vscroll) = self.scroll_offset();

        ScrollShift {
            dx: params.h_command.step() + params.h_offset as i32 - hscroll as i32,
            dy: params.v_command.step() + params.v_offset as i32 - vscroll as i32,
        }
    }

    /// Render this canvas scrolled by `shift` into `out`
    ///
    /// `out` receives this canvas's palette and every pixel; its previous
    /// contents are irrelevant. The scroll offset of `out` is left alone.
    ///
    /// # Panics
    /// Panics if the two canvases have different strides
    pub fn scroll_into(&self, out: &mut Canvas, shift: ScrollShift, color: u8, mode: ScrollMode) {
        assert_eq!(self.stride(), out.stride(), "scroll target stride differs");

        out.copy_palette_from(self);

        let width = FULL_WIDTH as i32;
        let height = FULL_HEIGHT as i32;
        let ScrollShift { dx, dy } = shift;

        // Pixels that stay on the canvas
        let x0 = dx.max(0);
        let x1 = (width + dx).min(width);
        let y0 = dy.max(0);
        let y1 = (height + dy).min(height);
        if x0 < x1 && y0 < y1 {
            out.copy_rect(
                self,
                (x0 - dx) as usize,
                (y0 - dy) as usize,
                x0 as usize,
                y0 as usize,
                (x1 - x0) as usize,
                (y1 - y0) as usize,
            );
        }

        let fill = Strip {
            src: self,
            color,
            mode,
        };

        // Vertical strip first, full width
        if dy > 0 {
            fill.apply(out, 0, FULL_HEIGHT - dy as usize, 0, 0, FULL_WIDTH, dy as usize);
        } else if dy < 0 {
            let h = (-dy) as usize;
            fill.apply(out, 0, 0, 0, FULL_HEIGHT - h, FULL_WIDTH, h);
        }

        // Then the horizontal strip, full height
        if dx > 0 {
            fill.apply(out, FULL_WIDTH - dx as usize, 0, 0, 0, dx as usize, FULL_HEIGHT);
        } else if dx < 0 {
            let w = (-dx) as usize;
            fill.apply(out, 0, 0, FULL_WIDTH - w, 0, w, FULL_HEIGHT);
        }
    }
}

/// Filler for the strip a scroll uncovers
struct Strip<'a> {
    src: &'a Canvas,
    color: u8,
    mode: ScrollMode,
}

impl Strip<'_> {
    /// Fill `w`×`h` pixels of `out` at (dst_x, dst_y), either from the
    /// source canvas at (src_x, src_y) or with the flat color
    #[allow(clippy::too_many_arguments)]
    fn apply(
        &self,
        out: &mut Canvas,
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
        w: usize,
        h: usize,
    ) {
        match self.mode {
            ScrollMode::Copy => out.copy_rect(self.src, src_x, src_y, dst_x, dst_y, w, h),
            ScrollMode::Preset => out.fill_rect(dst_x, dst_y, w, h, self.color),
        }
    }
}

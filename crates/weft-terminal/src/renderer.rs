//! Differential frame rendering.
//!
//! Walks the buffer's dirty cells, skips redundant cursor moves and
//! style changes, and batches everything into one buffered write per
//! flush.

use crate::cell_buffer::CellBuffer;
use crossterm::cursor::MoveTo;
use crossterm::style::{
    Attribute, Color as CtColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::{queue, QueueableCommand};
use std::io::{self, BufWriter, Write};
use weft_core::{Attrs, Color, ColorMode, Style};

/// Pick a color mode from the environment: `COLORTERM` advertises true
/// color, a `TERM` containing "256" gets the extended palette, anything
/// else the basic 16.
#[must_use]
pub fn detect_color_mode() -> ColorMode {
    if std::env::var("COLORTERM")
        .map(|v| v.contains("truecolor") || v.contains("24bit"))
        .unwrap_or(false)
    {
        return ColorMode::TrueColor;
    }
    if std::env::var("TERM")
        .map(|v| v.contains("256"))
        .unwrap_or(false)
    {
        return ColorMode::Palette256;
    }
    ColorMode::Basic
}

/// Quantize an RGB triple onto the xterm 256-color cube (or gray ramp).
fn rgb_to_palette(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        // Gray ramp: 24 steps from 232.
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + (u16::from(r) - 8).min(239) as u8 / 10;
    }
    let q = |v: u8| u8::try_from((u16::from(v) * 5 + 127) / 255).unwrap_or(5);
    16 + 36 * q(r) + 6 * q(g) + q(b)
}

/// Reduce an RGB triple to the nearest of the 16 basic colors.
fn rgb_to_basic(r: u8, g: u8, b: u8) -> u8 {
    let bright = u8::from(u16::from(r) + u16::from(g) + u16::from(b) > 460);
    let bit = |v: u8| u8::from(v > 96);
    (bit(b) << 2 | bit(g) << 1 | bit(r)) + 8 * bright
}

/// Resolve a color for output under the given mode.
fn resolve(color: Color, mode: ColorMode) -> CtColor {
    match color {
        Color::Default => CtColor::Reset,
        Color::Indexed(i) => CtColor::AnsiValue(i),
        Color::Rgb(r, g, b) => match mode {
            ColorMode::TrueColor => CtColor::Rgb { r, g, b },
            ColorMode::Palette256 => CtColor::AnsiValue(rgb_to_palette(r, g, b)),
            ColorMode::Basic => CtColor::AnsiValue(rgb_to_basic(r, g, b)),
        },
    }
}

/// Renders dirty cells, tracking cursor and style state to avoid
/// redundant escape sequences.
#[derive(Debug)]
pub struct DiffRenderer {
    color_mode: ColorMode,
    // u16::MAX = unknown position.
    cursor_x: u16,
    cursor_y: u16,
    last_style: Option<Style>,
    cells_written: usize,
    cursor_moves: usize,
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new(detect_color_mode())
    }
}

impl DiffRenderer {
    /// A renderer for the given color mode.
    #[must_use]
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            cursor_x: u16::MAX,
            cursor_y: u16::MAX,
            last_style: None,
            cells_written: 0,
            cursor_moves: 0,
        }
    }

    /// Change the color mode.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    /// The active color mode.
    #[must_use]
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Forget cached cursor/style state. Call after anything else wrote
    /// to the terminal.
    pub fn reset(&mut self) {
        self.cursor_x = u16::MAX;
        self.cursor_y = u16::MAX;
        self.last_style = None;
    }

    /// Cells written by the last flush.
    #[must_use]
    pub const fn cells_written(&self) -> usize {
        self.cells_written
    }

    /// Cursor moves emitted by the last flush.
    #[must_use]
    pub const fn cursor_moves(&self) -> usize {
        self.cursor_moves
    }

    /// Write every dirty cell to `writer` and clear the dirty bits.
    /// Returns the number of cells written.
    pub fn flush<W: Write>(&mut self, buffer: &mut CellBuffer, writer: &mut W) -> io::Result<usize> {
        self.cells_written = 0;
        self.cursor_moves = 0;

        let mut out = BufWriter::with_capacity(8192, writer);
        queue!(out, ResetColor)?;
        self.last_style = None;

        let width = buffer.width();
        for idx in buffer.iter_dirty() {
            let (x, y) = buffer.coords(idx);
            let cell = &buffer.cells()[idx];
            if cell.is_continuation() {
                continue;
            }

            if self.cursor_x != x || self.cursor_y != y {
                queue!(out, MoveTo(x, y))?;
                self.cursor_x = x;
                self.cursor_y = y;
                self.cursor_moves += 1;
            }

            if self.last_style != Some(cell.style) {
                apply_style(&mut out, cell.style, self.color_mode)?;
                self.last_style = Some(cell.style);
            }

            queue!(out, Print(&cell.symbol))?;
            self.cursor_x = self.cursor_x.saturating_add(u16::from(cell.width()));
            if self.cursor_x >= width {
                // Unknown after wrap.
                self.cursor_x = u16::MAX;
            }
            self.cells_written += 1;
        }

        buffer.clear_dirty();
        out.flush()?;
        Ok(self.cells_written)
    }
}

fn apply_style<W: Write>(writer: &mut W, style: Style, mode: ColorMode) -> io::Result<()> {
    // Attributes must reset before colors, or stale bold/underline leak
    // into the new style.
    writer.queue(SetAttribute(Attribute::Reset))?;
    writer.queue(SetForegroundColor(resolve(style.fg, mode)))?;
    writer.queue(SetBackgroundColor(resolve(style.bg, mode)))?;

    let pairs = [
        (Attrs::BOLD, Attribute::Bold),
        (Attrs::UNDERLINE, Attribute::Underlined),
        (Attrs::REVERSE, Attribute::Reverse),
        (Attrs::ITALIC, Attribute::Italic),
        (Attrs::DIM, Attribute::Dim),
        (Attrs::BLINK, Attribute::SlowBlink),
    ];
    for (attr, ct) in pairs {
        if style.attrs.contains(attr) {
            writer.queue(SetAttribute(ct))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{Cell, Vec2};

    #[test]
    fn test_flush_empty_buffer_writes_nothing() {
        let mut r = DiffRenderer::new(ColorMode::TrueColor);
        let mut buf = CellBuffer::new(10, 4);
        let mut out = Vec::new();
        assert_eq!(r.flush(&mut buf, &mut out).unwrap(), 0);
    }

    #[test]
    fn test_adjacent_cells_share_one_cursor_move() {
        let mut r = DiffRenderer::new(ColorMode::TrueColor);
        let mut buf = CellBuffer::new(10, 4);
        for (i, ch) in "abc".chars().enumerate() {
            buf.set(Vec2::new(i32::try_from(i).unwrap(), 0), Cell::from_char(ch));
        }
        let mut out = Vec::new();
        assert_eq!(r.flush(&mut buf, &mut out).unwrap(), 3);
        assert_eq!(r.cursor_moves(), 1);
        assert_eq!(buf.dirty_count(), 0);
    }

    #[test]
    fn test_scattered_cells_each_move() {
        let mut r = DiffRenderer::new(ColorMode::TrueColor);
        let mut buf = CellBuffer::new(10, 4);
        buf.set(Vec2::new(0, 0), Cell::from_char('a'));
        buf.set(Vec2::new(5, 2), Cell::from_char('b'));
        let mut out = Vec::new();
        r.flush(&mut buf, &mut out).unwrap();
        assert_eq!(r.cursor_moves(), 2);
    }

    #[test]
    fn test_continuation_cells_are_skipped() {
        let mut r = DiffRenderer::new(ColorMode::TrueColor);
        let mut buf = CellBuffer::new(10, 2);
        buf.set(Vec2::ZERO, Cell::from_char('\u{65e5}'));
        let mut out = Vec::new();
        // Two dirty cells, one printed symbol.
        assert_eq!(buf.dirty_count(), 2);
        assert_eq!(r.flush(&mut buf, &mut out).unwrap(), 1);
    }

    #[test]
    fn test_palette_quantization_hits_cube_corners() {
        assert_eq!(rgb_to_palette(0, 0, 1), 16);
        assert_eq!(rgb_to_palette(255, 0, 255), 16 + 36 * 5 + 5);
        // Pure grays land on the ramp.
        assert_eq!(rgb_to_palette(0, 0, 0), 16);
        assert_eq!(rgb_to_palette(255, 255, 255), 231);
    }

    #[test]
    fn test_basic_reduction_separates_channels() {
        // Bright red vs dark blue.
        assert_eq!(rgb_to_basic(230, 20, 20) & 0b111, 0b001);
        assert_eq!(rgb_to_basic(10, 10, 120) & 0b111, 0b100);
    }

    #[test]
    fn test_default_color_resolves_to_reset() {
        assert_eq!(resolve(Color::Default, ColorMode::Basic), CtColor::Reset);
        assert_eq!(
            resolve(Color::Rgb(1, 2, 3), ColorMode::TrueColor),
            CtColor::Rgb { r: 1, g: 2, b: 3 }
        );
    }
}

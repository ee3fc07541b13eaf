//! Back buffer with per-cell dirty tracking.
//!
//! Stores symbols as `CompactString` so typical graphemes stay inline,
//! and one dirty bit per cell so the renderer can walk only what
//! changed since the last flush.

use bitvec::prelude::*;
use compact_str::CompactString;
use unicode_width::UnicodeWidthChar;
use weft_core::{Cell, Style, Vec2};

/// One buffered cell: symbol, style and display width.
///
/// A width of 0 marks the continuation half of a wide character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufCell {
    /// The symbol displayed in this cell (inlined for short strings).
    pub symbol: CompactString,
    /// The cell's style.
    pub style: Style,
    width: u8,
}

impl BufCell {
    fn blank(style: Style) -> Self {
        Self {
            symbol: CompactString::const_new(" "),
            style,
            width: 1,
        }
    }

    fn set(&mut self, ch: char, style: Style) {
        self.symbol.clear();
        self.symbol.push(ch);
        self.style = style;
        self.width = u8::try_from(ch.width().unwrap_or(1).clamp(1, 2)).unwrap_or(1);
    }

    fn make_continuation(&mut self) {
        self.symbol.clear();
        self.width = 0;
    }

    /// Whether this cell is the trailing half of a wide character.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Display width of the symbol (0 for continuations).
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// First character of the symbol, for read-back.
    #[must_use]
    pub fn ch(&self) -> char {
        self.symbol.chars().next().unwrap_or(' ')
    }
}

/// A grid of [`BufCell`] with dirty bits.
#[derive(Debug)]
pub struct CellBuffer {
    cells: Vec<BufCell>,
    width: u16,
    height: u16,
    background: Style,
    dirty: BitVec,
}

impl CellBuffer {
    /// A blank buffer of the given dimensions.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        let background = Style::default();
        Self {
            cells: vec![BufCell::blank(background); size],
            width,
            height,
            background,
            dirty: bitvec![0; size],
        }
    }

    /// Buffer width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Dimensions as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(i32::from(self.width), i32::from(self.height))
    }

    /// Style used for cleared cells.
    pub fn set_background(&mut self, style: Style) {
        self.background = style;
    }

    fn index_of(&self, pos: Vec2) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as u16, pos.y as u16);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Convert a linear index back to coordinates.
    #[must_use]
    pub fn coords(&self, idx: usize) -> (u16, u16) {
        let w = usize::from(self.width).max(1);
        ((idx % w) as u16, (idx / w) as u16)
    }

    /// Write one cell, marking it dirty. A wide character claims the
    /// following cell as a continuation; out-of-bounds writes are
    /// ignored.
    pub fn set(&mut self, pos: Vec2, cell: Cell) {
        let Some(idx) = self.index_of(pos) else {
            return;
        };
        self.cells[idx].set(cell.ch, cell.style);
        self.dirty.set(idx, true);
        if self.cells[idx].width() == 2 {
            if let Some(next) = self.index_of(pos + Vec2::new(1, 0)) {
                self.cells[next].make_continuation();
                self.dirty.set(next, true);
            }
        }
    }

    /// Read one cell back, `None` out of bounds.
    #[must_use]
    pub fn get(&self, pos: Vec2) -> Option<Cell> {
        self.index_of(pos)
            .map(|idx| Cell::new(self.cells[idx].ch(), self.cells[idx].style))
    }

    /// Raw cell access for the renderer.
    #[must_use]
    pub fn cells(&self) -> &[BufCell] {
        &self.cells
    }

    /// Reset every cell to a styled blank and mark everything dirty.
    pub fn clear(&mut self) {
        let blank = BufCell::blank(self.background);
        self.cells.fill(blank);
        self.dirty.fill(true);
    }

    /// Resize, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        let size = usize::from(width) * usize::from(height);
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(size, BufCell::blank(self.background));
        self.dirty = bitvec![1; size];
    }

    /// Mark every cell dirty.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    /// Clear all dirty bits.
    pub fn clear_dirty(&mut self) {
        self.dirty.fill(false);
    }

    /// Number of dirty cells.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.count_ones()
    }

    /// Iterate dirty cell indices in row-major order.
    pub fn iter_dirty(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty.iter_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_marks_dirty_and_reads_back() {
        let mut buf = CellBuffer::new(10, 4);
        assert_eq!(buf.dirty_count(), 0);

        buf.set(Vec2::new(3, 2), Cell::from_char('x'));
        assert_eq!(buf.dirty_count(), 1);
        assert_eq!(buf.get(Vec2::new(3, 2)).unwrap().ch, 'x');
    }

    #[test]
    fn test_wide_char_claims_continuation() {
        let mut buf = CellBuffer::new(10, 2);
        buf.set(Vec2::new(0, 0), Cell::from_char('\u{65e5}'));

        assert_eq!(buf.cells()[0].width(), 2);
        assert!(buf.cells()[1].is_continuation());
        assert_eq!(buf.dirty_count(), 2);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut buf = CellBuffer::new(4, 2);
        buf.set(Vec2::new(-1, 0), Cell::from_char('x'));
        buf.set(Vec2::new(4, 0), Cell::from_char('x'));
        buf.set(Vec2::new(0, 2), Cell::from_char('x'));
        assert_eq!(buf.dirty_count(), 0);
        assert!(buf.get(Vec2::new(4, 0)).is_none());
    }

    #[test]
    fn test_clear_uses_background_style() {
        let mut buf = CellBuffer::new(3, 1);
        let bg = Style::new(
            weft_core::Color::Default,
            weft_core::Color::Indexed(4),
        );
        buf.set_background(bg);
        buf.clear();

        let cell = buf.get(Vec2::ZERO).unwrap();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.style, bg);
        assert_eq!(buf.dirty_count(), 3);
    }

    #[test]
    fn test_resize_clears_and_dirties() {
        let mut buf = CellBuffer::new(4, 2);
        buf.set(Vec2::ZERO, Cell::from_char('x'));
        buf.resize(6, 3);
        assert_eq!(buf.size(), Vec2::new(6, 3));
        assert_eq!(buf.get(Vec2::ZERO).unwrap().ch, ' ');
        assert_eq!(buf.dirty_count(), 18);
    }

    #[test]
    fn test_coords_round_trip() {
        let buf = CellBuffer::new(10, 5);
        assert_eq!(buf.coords(0), (0, 0));
        assert_eq!(buf.coords(10), (0, 1));
        assert_eq!(buf.coords(25), (5, 2));
    }
}

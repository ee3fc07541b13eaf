//! Primitive drawing helpers over the backend boundary.
//!
//! Free functions mapping data to cells: lines, fills, clipped text and
//! borders. Layout and state stay in the widgets; nothing here reads
//! anything back.

use crate::backend::Backend;
use crate::geometry::{Rect, Vec2};
use crate::style::{Cell, Style};

/// Which sides of a border to draw, as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderSides(u8);

impl BorderSides {
    /// No sides.
    pub const NONE: Self = Self(0);
    /// Top edge.
    pub const TOP: Self = Self(1 << 0);
    /// Bottom edge.
    pub const BOTTOM: Self = Self(1 << 1);
    /// Left edge.
    pub const LEFT: Self = Self(1 << 2);
    /// Right edge.
    pub const RIGHT: Self = Self(1 << 3);
    /// All four edges.
    pub const ALL: Self = Self(0b1111);

    /// Check whether all sides in `other` are included.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for BorderSides {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// The eight pieces of a box border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    /// Horizontal edge character.
    pub horizontal: char,
    /// Vertical edge character.
    pub vertical: char,
    /// Corners: top-left, top-right, bottom-left, bottom-right.
    pub corners: [char; 4],
    /// Style applied to every piece.
    pub style: Style,
}

impl BorderGlyphs {
    /// Light single-line box drawing.
    #[must_use]
    pub const fn single(style: Style) -> Self {
        Self {
            horizontal: '\u{2500}',
            vertical: '\u{2502}',
            corners: ['\u{250c}', '\u{2510}', '\u{2514}', '\u{2518}'],
            style,
        }
    }

    /// Double-line box drawing.
    #[must_use]
    pub const fn double(style: Style) -> Self {
        Self {
            horizontal: '\u{2550}',
            vertical: '\u{2551}',
            corners: ['\u{2554}', '\u{2557}', '\u{255a}', '\u{255d}'],
            style,
        }
    }

    /// Replace the style, keeping the glyphs.
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Default for BorderGlyphs {
    fn default() -> Self {
        Self::single(Style::default())
    }
}

/// Draw `len` copies of `cell` rightwards from `from`.
pub fn h_line(screen: &mut dyn Backend, from: Vec2, len: i32, cell: Cell) {
    for x in 0..len {
        screen.set_cell(from + Vec2::new(x, 0), cell);
    }
}

/// Draw `len` copies of `cell` downwards from `from`.
pub fn v_line(screen: &mut dyn Backend, from: Vec2, len: i32, cell: Cell) {
    for y in 0..len {
        screen.set_cell(from + Vec2::new(0, y), cell);
    }
}

/// Fill a rectangle with one cell.
pub fn fill_rect(screen: &mut dyn Backend, rect: Rect, cell: Cell) {
    for y in 0..rect.size.y {
        h_line(screen, rect.pos + Vec2::new(0, y), rect.size.x, cell);
    }
}

/// Write `text` at `pos`, clipped to `max_width` cells.
///
/// Clipped text keeps its last visible cell for `trailing` (an ellipsis,
/// typically) when one is given. Returns the number of cells written.
pub fn text_line(
    screen: &mut dyn Backend,
    pos: Vec2,
    max_width: i32,
    text: &str,
    style: Style,
    trailing: Option<char>,
) -> i32 {
    if max_width <= 0 {
        return 0;
    }
    let width = usize::try_from(max_width).unwrap_or(0);
    let count = text.chars().count();
    let clipped = count > width;
    let body = if clipped && trailing.is_some() {
        width - 1
    } else {
        width.min(count)
    };

    let mut written = 0;
    for (i, ch) in text.chars().take(body).enumerate() {
        let offset = i32::try_from(i).unwrap_or(i32::MAX);
        screen.set_cell(pos + Vec2::new(offset, 0), Cell::new(ch, style));
        written += 1;
    }
    if clipped {
        if let Some(t) = trailing {
            screen.set_cell(pos + Vec2::new(written, 0), Cell::new(t, style));
            written += 1;
        }
    }
    written
}

/// Draw the requested sides of a border around `rect`.
///
/// Corners appear where two drawn sides meet. Returns the interior
/// rectangle, shrunk by one cell along each drawn side.
pub fn border(
    screen: &mut dyn Backend,
    rect: Rect,
    glyphs: &BorderGlyphs,
    sides: BorderSides,
) -> Rect {
    let Rect { pos, size } = rect;
    if rect.is_empty() {
        return Rect::new(pos, Vec2::ZERO);
    }
    let style = glyphs.style;
    let right = pos.x + size.x - 1;
    let bottom = pos.y + size.y - 1;

    let h = Cell::new(glyphs.horizontal, style);
    let v = Cell::new(glyphs.vertical, style);

    if sides.contains(BorderSides::TOP) {
        h_line(screen, pos, size.x, h);
    }
    if sides.contains(BorderSides::BOTTOM) {
        h_line(screen, Vec2::new(pos.x, bottom), size.x, h);
    }
    if sides.contains(BorderSides::LEFT) {
        v_line(screen, pos, size.y, v);
    }
    if sides.contains(BorderSides::RIGHT) {
        v_line(screen, Vec2::new(right, pos.y), size.y, v);
    }

    let corner_specs = [
        (BorderSides::TOP | BorderSides::LEFT, Vec2::new(pos.x, pos.y), 0),
        (BorderSides::TOP | BorderSides::RIGHT, Vec2::new(right, pos.y), 1),
        (BorderSides::BOTTOM | BorderSides::LEFT, Vec2::new(pos.x, bottom), 2),
        (BorderSides::BOTTOM | BorderSides::RIGHT, Vec2::new(right, bottom), 3),
    ];
    for (needed, at, idx) in corner_specs {
        if sides.contains(needed) {
            screen.set_cell(at, Cell::new(glyphs.corners[idx], style));
        }
    }

    let mut interior_pos = pos;
    let mut interior_size = size;
    if sides.contains(BorderSides::TOP) {
        interior_pos.y += 1;
        interior_size.y -= 1;
    }
    if sides.contains(BorderSides::BOTTOM) {
        interior_size.y -= 1;
    }
    if sides.contains(BorderSides::LEFT) {
        interior_pos.x += 1;
        interior_size.x -= 1;
    }
    if sides.contains(BorderSides::RIGHT) {
        interior_size.x -= 1;
    }
    interior_size.x = interior_size.x.max(0);
    interior_size.y = interior_size.y.max(0);
    Rect::new(interior_pos, interior_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TestBackend;

    #[test]
    fn test_text_line_clips_with_ellipsis() {
        let mut b = TestBackend::new(10, 1);
        let n = text_line(
            &mut b,
            Vec2::ZERO,
            5,
            "hello world",
            Style::default(),
            Some('\u{2026}'),
        );
        assert_eq!(n, 5);
        assert_eq!(b.row_text(0), "hell\u{2026}     ");
    }

    #[test]
    fn test_text_line_short_text_untouched() {
        let mut b = TestBackend::new(10, 1);
        let n = text_line(&mut b, Vec2::ZERO, 8, "hi", Style::default(), Some('+'));
        assert_eq!(n, 2);
        assert_eq!(b.row_text(0), "hi        ");
    }

    #[test]
    fn test_full_border_interior_shrinks_by_one() {
        let mut b = TestBackend::new(8, 5);
        let interior = border(
            &mut b,
            Rect::new(Vec2::ZERO, Vec2::new(8, 5)),
            &BorderGlyphs::single(Style::default()),
            BorderSides::ALL,
        );
        assert_eq!(interior, Rect::new(Vec2::new(1, 1), Vec2::new(6, 3)));
        assert_eq!(b.row_text(0), "\u{250c}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2510}");
        assert_eq!(b.row_text(4), "\u{2514}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2518}");
        assert_eq!(
            b.cell_at(Vec2::new(0, 2)).unwrap().ch,
            '\u{2502}'
        );
    }

    #[test]
    fn test_partial_border_keeps_undrawn_sides() {
        let mut b = TestBackend::new(6, 4);
        let interior = border(
            &mut b,
            Rect::new(Vec2::ZERO, Vec2::new(6, 4)),
            &BorderGlyphs::single(Style::default()),
            BorderSides::TOP,
        );
        assert_eq!(interior, Rect::new(Vec2::new(0, 1), Vec2::new(6, 3)));
        // No corners without a meeting side.
        assert_eq!(b.cell_at(Vec2::ZERO).unwrap().ch, '\u{2500}');
        assert_eq!(b.cell_at(Vec2::new(0, 1)).unwrap().ch, ' ');
    }

    #[test]
    fn test_fill_rect_covers_exactly() {
        let mut b = TestBackend::new(5, 4);
        fill_rect(
            &mut b,
            Rect::new(Vec2::new(1, 1), Vec2::new(3, 2)),
            Cell::from_char('#'),
        );
        assert_eq!(b.row_text(0), "     ");
        assert_eq!(b.row_text(1), " ### ");
        assert_eq!(b.row_text(2), " ### ");
        assert_eq!(b.row_text(3), "     ");
    }
}

//! Styled terminal cells.

use serde::{Deserialize, Serialize};

/// A terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// The terminal's default foreground or background.
    #[default]
    Default,
    /// A palette index (0-15 named, 16-255 extended).
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

/// How colors are resolved before being emitted to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// 16-color palette only.
    Basic,
    /// 256-color palette; RGB values are quantized.
    Palette256,
    /// Full 24-bit color.
    #[default]
    TrueColor,
}

/// Text attributes as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attrs(u8);

impl Attrs {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// Bold text.
    pub const BOLD: Self = Self(1 << 0);
    /// Underlined text.
    pub const UNDERLINE: Self = Self(1 << 1);
    /// Reversed colors.
    pub const REVERSE: Self = Self(1 << 2);
    /// Italic text.
    pub const ITALIC: Self = Self(1 << 3);
    /// Dim/faint text.
    pub const DIM: Self = Self(1 << 4);
    /// Blinking text.
    pub const BLINK: Self = Self(1 << 5);

    /// Check whether all attributes in `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether no attribute is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for Attrs {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Attrs {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Foreground, background and attributes of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Text attributes.
    pub attrs: Attrs,
}

impl Style {
    /// Create a style from foreground and background colors.
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attrs::NONE,
        }
    }

    /// Add attributes to the style.
    #[must_use]
    pub const fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

/// One character plus its style: the unit of terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character displayed in the cell.
    pub ch: char,
    /// The cell's style.
    pub style: Style,
}

impl Cell {
    /// Create a cell.
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// A cell with the default style.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        Self {
            ch,
            style: Style {
                fg: Color::Default,
                bg: Color::Default,
                attrs: Attrs::NONE,
            },
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_bitset() {
        let a = Attrs::BOLD | Attrs::UNDERLINE;
        assert!(a.contains(Attrs::BOLD));
        assert!(a.contains(Attrs::UNDERLINE));
        assert!(!a.contains(Attrs::REVERSE));
        assert!(Attrs::NONE.is_empty());
    }

    #[test]
    fn test_default_cell_is_blank() {
        let c = Cell::default();
        assert_eq!(c.ch, ' ');
        assert_eq!(c.style.fg, Color::Default);
    }
}

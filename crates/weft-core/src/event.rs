//! Terminal events and key modifiers.

use crate::geometry::Vec2;
use serde::{Deserialize, Serialize};

/// Modifier combination attached to a key.
///
/// `Any` is only meaningful on chord patterns, where it matches every
/// combination; terminal events always carry one of the other variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Modifier {
    /// No modifier held.
    #[default]
    None,
    /// Matches any modifier combination (patterns only).
    Any,
    /// Shift.
    Shift,
    /// Alt (Meta).
    Alt,
    /// Alt + Shift.
    AltShift,
    /// Ctrl.
    Ctrl,
    /// Ctrl + Shift.
    CtrlShift,
    /// Alt + Ctrl.
    AltCtrl,
    /// Alt + Ctrl + Shift.
    AltCtrlShift,
}

impl Modifier {
    /// Build a modifier from individual flags.
    #[must_use]
    pub const fn from_flags(ctrl: bool, shift: bool, alt: bool) -> Self {
        match (ctrl, shift, alt) {
            (false, false, false) => Self::None,
            (false, false, true) => Self::Alt,
            (false, true, false) => Self::Shift,
            (false, true, true) => Self::AltShift,
            (true, false, false) => Self::Ctrl,
            (true, false, true) => Self::AltCtrl,
            (true, true, false) => Self::CtrlShift,
            (true, true, true) => Self::AltCtrlShift,
        }
    }

    /// Whether the Ctrl bit is set.
    #[must_use]
    pub const fn ctrl(self) -> bool {
        matches!(
            self,
            Self::Ctrl | Self::CtrlShift | Self::AltCtrl | Self::AltCtrlShift
        )
    }

    /// Whether the Shift bit is set.
    #[must_use]
    pub const fn shift(self) -> bool {
        matches!(
            self,
            Self::Shift | Self::AltShift | Self::CtrlShift | Self::AltCtrlShift
        )
    }

    /// Whether the Alt bit is set.
    #[must_use]
    pub const fn alt(self) -> bool {
        matches!(
            self,
            Self::Alt | Self::AltShift | Self::AltCtrl | Self::AltCtrlShift
        )
    }

    /// The same combination with the Shift bit forced on.
    ///
    /// Used by the case-insensitive character wildcard, which compares
    /// modifiers as if both sides were shifted. `Any` stays `Any`.
    #[must_use]
    pub const fn with_shift(self) -> Self {
        match self {
            Self::Any => Self::Any,
            other => Self::from_flags(other.ctrl(), true, other.alt()),
        }
    }
}

/// A key with no character representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymKey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Down,
    Up,
    Backspace,
    Tab,
    Enter,
    Esc,
    Space,
}

impl SymKey {
    /// Display name, as used by the chord grammar and name rendering.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
            Self::Insert => "INS",
            Self::Delete => "DEL",
            Self::Home => "HOME",
            Self::End => "END",
            Self::PageUp => "PGUP",
            Self::PageDown => "PGDN",
            Self::Left => "\u{2190}",
            Self::Right => "\u{2192}",
            Self::Down => "\u{2193}",
            Self::Up => "\u{2191}",
            Self::Backspace => "BACKSPACE",
            Self::Tab => "TAB",
            Self::Enter => "ENTER",
            Self::Esc => "ESC",
            Self::Space => "SPC",
        }
    }
}

/// A key as reported by the terminal: a character or a symbolic key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A printable character key.
    Char(char),
    /// A symbolic key.
    Sym(SymKey),
}

/// A decoded keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEventData {
    /// The key.
    pub code: KeyCode,
    /// Modifiers held with it.
    pub modifier: Modifier,
}

impl KeyEventData {
    /// Create a key event.
    #[must_use]
    pub const fn new(code: KeyCode, modifier: Modifier) -> Self {
        Self { code, modifier }
    }

    /// A plain character press.
    #[must_use]
    pub const fn ch(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifier::None)
    }

    /// A plain symbolic key press.
    #[must_use]
    pub const fn sym(k: SymKey) -> Self {
        Self::new(KeyCode::Sym(k), Modifier::None)
    }
}

/// A mouse button or wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Button released.
    Release,
    WheelUp,
    WheelDown,
}

/// A decoded mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseEventData {
    /// Button or wheel direction.
    pub button: MouseButton,
    /// Absolute cell position.
    pub pos: Vec2,
}

/// A terminal event, as produced by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermEvent {
    /// The terminal was resized to the given dimensions.
    Resize(Vec2),
    /// A key was pressed.
    Key(KeyEventData),
    /// A mouse button or wheel event.
    Mouse(MouseEventData),
}

//! Key-chord grammar and matching.
//!
//! A [`Chord`] is an ordered sequence of [`Key`] patterns plus a callback.
//! Its match cursor *is* the state machine: every key event either
//! advances it, resets it, or completes the sequence and fires the
//! callback.
//!
//! # Grammar
//!
//! Chords parse from a space-separated string of chord-keys. Each
//! chord-key is a `-`-separated list of modifier letters followed by a
//! base token:
//!
//! - modifiers: `C` (ctrl), `S` (shift), `M` (alt), at most one of each,
//!   or `A` (any modifier) on its own;
//! - base: a symbolic name (`F1`..`F12`, `INS`, `DEL`, `HOME`, `END`,
//!   `PGUP`, `PGDN`, `LEFT`, `RIGHT`, `DOWN`, `UP`, `BACKSPACE`, `TAB`,
//!   `ENTER`, `ESC`, `SPC`), a single character, or one of the wildcards
//!   `#CHAR`, `#SCHAR`, `#ANY`.
//!
//! `"C-x C-q"` is a two-key chord; `"g g"` is vi-style go-to-top.

use crate::context::EventContext;
use crate::error::{Error, Result};
use crate::event::{KeyCode, KeyEventData, Modifier, SymKey};
use std::fmt;

/// What a single chord key matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPattern {
    /// An exact character key.
    Char(char),
    /// An exact symbolic key.
    Sym(SymKey),
    /// Any character key (`#CHAR`).
    AnyChar,
    /// Any character key, ignoring the shift state (`#SCHAR`).
    AnyCharNoCase,
    /// Any key at all (`#ANY`).
    Any,
}

impl KeyPattern {
    /// Whether this pattern is one of the wildcard variants.
    #[must_use]
    pub const fn is_wildcard(self) -> bool {
        matches!(self, Self::AnyChar | Self::AnyCharNoCase | Self::Any)
    }
}

/// One logical key of a chord: a pattern plus the required modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    /// What the key matches.
    pub pattern: KeyPattern,
    /// Required modifier combination (`Modifier::Any` matches all).
    pub modifier: Modifier,
}

impl Key {
    /// Create a key.
    #[must_use]
    pub const fn new(pattern: KeyPattern, modifier: Modifier) -> Self {
        Self { pattern, modifier }
    }

    /// A plain character key with no modifier.
    #[must_use]
    pub const fn ch(c: char) -> Self {
        Self::new(KeyPattern::Char(c), Modifier::None)
    }

    /// A plain symbolic key with no modifier.
    #[must_use]
    pub const fn sym(k: SymKey) -> Self {
        Self::new(KeyPattern::Sym(k), Modifier::None)
    }

    fn modifier_ok(self, ev: Modifier) -> bool {
        self.modifier == Modifier::Any || self.modifier == ev
    }

    /// Whether this key matches the given terminal key event.
    #[must_use]
    pub fn matches(self, ev: KeyEventData) -> bool {
        match self.pattern {
            KeyPattern::Any => true,
            KeyPattern::AnyChar => {
                matches!(ev.code, KeyCode::Char(_)) && self.modifier_ok(ev.modifier)
            }
            KeyPattern::AnyCharNoCase => {
                matches!(ev.code, KeyCode::Char(_))
                    && (self.modifier == Modifier::Any
                        || self.modifier.with_shift() == ev.modifier.with_shift())
            }
            KeyPattern::Char(c) => ev.code == KeyCode::Char(c) && self.modifier_ok(ev.modifier),
            KeyPattern::Sym(s) => ev.code == KeyCode::Sym(s) && self.modifier_ok(ev.modifier),
        }
    }

    /// Display name: `C-`/`M-` prefixes, `S-` for shifted non-character
    /// keys, upper case for shifted characters.
    #[must_use]
    pub fn name(&self) -> String {
        if self.pattern == KeyPattern::Any {
            return "(any)".to_owned();
        }
        let char_key = matches!(self.pattern, KeyPattern::Char(_));
        let mut out = String::new();
        if self.modifier.ctrl() {
            out.push_str("C-");
        }
        if self.modifier.alt() {
            out.push_str("M-");
        }
        if self.modifier.shift() && !char_key {
            out.push_str("S-");
        }
        match self.pattern {
            KeyPattern::Char(c) => {
                if self.modifier.shift() {
                    out.extend(c.to_uppercase());
                } else {
                    out.push(c);
                }
            }
            KeyPattern::Sym(s) => out.push_str(s.name()),
            KeyPattern::AnyChar => out.push_str("(char)"),
            KeyPattern::AnyCharNoCase => out.push_str("(char nocase)"),
            KeyPattern::Any => unreachable!(),
        }
        out
    }
}

fn symbolic(name: &str) -> Option<SymKey> {
    Some(match name {
        "F1" => SymKey::F1,
        "F2" => SymKey::F2,
        "F3" => SymKey::F3,
        "F4" => SymKey::F4,
        "F5" => SymKey::F5,
        "F6" => SymKey::F6,
        "F7" => SymKey::F7,
        "F8" => SymKey::F8,
        "F9" => SymKey::F9,
        "F10" => SymKey::F10,
        "F11" => SymKey::F11,
        "F12" => SymKey::F12,
        "INS" => SymKey::Insert,
        "DEL" => SymKey::Delete,
        "HOME" => SymKey::Home,
        "END" => SymKey::End,
        "PGUP" => SymKey::PageUp,
        "PGDN" => SymKey::PageDown,
        "LEFT" => SymKey::Left,
        "RIGHT" => SymKey::Right,
        "DOWN" => SymKey::Down,
        "UP" => SymKey::Up,
        "BACKSPACE" => SymKey::Backspace,
        "TAB" => SymKey::Tab,
        "ENTER" => SymKey::Enter,
        "ESC" => SymKey::Esc,
        "SPC" => SymKey::Space,
        _ => return None,
    })
}

/// Parse the chord grammar into a key sequence.
///
/// The error offset is the cumulative number of characters consumed
/// before the chord-key that failed to parse.
pub fn parse_keys(s: &str) -> Result<Vec<Key>> {
    let mut keys = Vec::new();
    let mut offset = 0usize;

    let words: Vec<&str> = s.split(' ').filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
        return Err(Error::ChordParse { offset: 0 });
    }

    for word in words {
        let parts: Vec<&str> = word.split('-').filter(|p| !p.is_empty()).collect();
        let Some((&base, mods)) = parts.split_last() else {
            return Err(Error::ChordParse { offset });
        };

        let (mut any, mut ctrl, mut shift, mut alt) = (false, false, false, false);
        for &m in mods {
            match m {
                "A" if !any && !ctrl && !shift && !alt => any = true,
                "C" if !ctrl && !any => ctrl = true,
                "S" if !shift && !any => shift = true,
                "M" if !alt && !any => alt = true,
                _ => return Err(Error::ChordParse { offset }),
            }
        }

        keys.push(resolve_base(base, any, ctrl, shift, alt).ok_or(Error::ChordParse { offset })?);
        offset += word.chars().count();
    }

    Ok(keys)
}

fn resolve_base(base: &str, any: bool, ctrl: bool, mut shift: bool, alt: bool) -> Option<Key> {
    let modifier = |shift: bool| {
        if any {
            Modifier::Any
        } else {
            Modifier::from_flags(ctrl, shift, alt)
        }
    };

    if let Some(sym) = symbolic(&base.to_uppercase()) {
        return Some(Key::new(KeyPattern::Sym(sym), modifier(shift)));
    }

    match base {
        "#CHAR" => return Some(Key::new(KeyPattern::AnyChar, modifier(shift))),
        "#SCHAR" => return Some(Key::new(KeyPattern::AnyCharNoCase, modifier(shift))),
        "#ANY" => return Some(Key::new(KeyPattern::Any, modifier(shift))),
        _ => {}
    }

    let mut chars = base.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    // Control chords are caseless; otherwise an inherently upper-case
    // letter implies shift, and the stored character follows the shift
    // state ("S-a" and "A" both mean shift+a).
    let c = if ctrl && !shift {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        shift = shift || c.is_uppercase();
        if shift {
            c.to_uppercase().next().unwrap_or(c)
        } else {
            c.to_lowercase().next().unwrap_or(c)
        }
    };

    Some(Key::new(KeyPattern::Char(c), modifier(shift)))
}

/// Result of feeding one key event to a chord (or a set of them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyDispatch {
    /// A chord completed and its callback ran.
    pub fired: bool,
    /// A chord advanced mid-sequence without completing.
    pub advanced: bool,
}

impl KeyDispatch {
    /// Neither fired nor advanced.
    pub const NONE: Self = Self {
        fired: false,
        advanced: false,
    };
}

impl std::ops::BitOrAssign for KeyDispatch {
    fn bitor_assign(&mut self, rhs: Self) {
        self.fired |= rhs.fired;
        self.advanced |= rhs.advanced;
    }
}

/// An ordered key sequence with a callback and a match cursor.
///
/// The callback receives the dispatch target (the owning widget) and the
/// event context.
pub struct Chord<W: ?Sized> {
    keys: Vec<Key>,
    cursor: usize,
    callback: Box<dyn FnMut(&mut W, &mut EventContext)>,
}

impl<W: ?Sized> Chord<W> {
    /// Build a chord from an explicit key sequence.
    pub fn from_keys(
        keys: Vec<Key>,
        callback: impl FnMut(&mut W, &mut EventContext) + 'static,
    ) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::EmptyChord);
        }
        Ok(Self {
            keys,
            cursor: 0,
            callback: Box::new(callback),
        })
    }

    /// Parse a chord from the textual grammar.
    pub fn parse(
        s: &str,
        callback: impl FnMut(&mut W, &mut EventContext) + 'static,
    ) -> Result<Self> {
        Ok(Self {
            keys: parse_keys(s)?,
            cursor: 0,
            callback: Box::new(callback),
        })
    }

    /// Number of keys in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Chords are never empty; this exists for clippy symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The key sequence.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// The key at `index`, if any.
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<Key> {
        self.keys.get(index).copied()
    }

    /// Current match cursor (0 = no progress).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Reset the match cursor.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Whether two chords bind the same key sequence.
    #[must_use]
    pub fn keys_eq(&self, keys: &[Key]) -> bool {
        self.keys == keys
    }

    /// Render the chord's display name with the given separator.
    #[must_use]
    pub fn name(&self, separator: &str) -> String {
        self.keys
            .iter()
            .map(Key::name)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Feed the current key event to this chord.
    ///
    /// Attempts only the key at the current cursor. Success advances the
    /// cursor; completion fires the callback and resets it; failure
    /// resets it. A fresh non-wildcard chord sits the event out entirely
    /// while another chord is pending from the previous event, so a
    /// binding like `"t"` cannot fire on the second key of `"g t"`.
    pub fn feed(&mut self, target: &mut W, ctx: &mut EventContext) -> KeyDispatch {
        let Some(ev) = ctx.key_event() else {
            return KeyDispatch::NONE;
        };

        if self.cursor == 0 && ctx.chord_pending() && !self.keys[0].pattern.is_wildcard() {
            return KeyDispatch::NONE;
        }

        if self.keys[self.cursor].matches(ev) {
            self.cursor += 1;
        } else {
            self.cursor = 0;
            return KeyDispatch::NONE;
        }

        if self.cursor == self.keys.len() {
            self.cursor = 0;
            (self.callback)(target, ctx);
            return KeyDispatch {
                fired: true,
                advanced: false,
            };
        }
        KeyDispatch {
            fired: false,
            advanced: true,
        }
    }
}

impl<W: ?Sized> fmt::Display for Chord<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name(" "))
    }
}

impl<W: ?Sized> fmt::Debug for Chord<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chord")
            .field("keys", &self.keys)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

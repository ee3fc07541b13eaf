//! Per-widget input routing: chord bindings plus mouse hit areas.

use crate::chord::{Chord, Key, KeyDispatch};
use crate::context::EventContext;
use crate::error::Result;
use crate::geometry::Vec2;
use crate::hit::HitArea;
use std::fmt;

/// The input surface of one widget.
///
/// Owns the widget's chord bindings and mouse hit areas and routes one
/// event at a time into them. Widgets dispatch into themselves by taking
/// the router out with [`std::mem::take`], routing, then merging it back
/// with [`InputRouter::absorb`] so bindings added from inside a callback
/// survive.
pub struct InputRouter<W: ?Sized> {
    chords: Vec<Chord<W>>,
    areas: Vec<HitArea<W>>,
}

impl<W: ?Sized> Default for InputRouter<W> {
    fn default() -> Self {
        Self {
            chords: Vec::new(),
            areas: Vec::new(),
        }
    }
}

impl<W: ?Sized> InputRouter<W> {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chord binding.
    pub fn add_chord(&mut self, chord: Chord<W>) {
        self.chords.push(chord);
    }

    /// Parse and register a chord binding.
    pub fn bind(
        &mut self,
        spelling: &str,
        callback: impl FnMut(&mut W, &mut EventContext) + 'static,
    ) -> Result<()> {
        self.chords.push(Chord::parse(spelling, callback)?);
        Ok(())
    }

    /// Remove every binding for the given key sequence. Returns how many
    /// were removed.
    pub fn remove_chord(&mut self, keys: &[Key]) -> usize {
        let before = self.chords.len();
        self.chords.retain(|c| !c.keys_eq(keys));
        before - self.chords.len()
    }

    /// Drop all chord bindings.
    pub fn clear_chords(&mut self) {
        self.chords.clear();
    }

    /// Register a mouse hit area.
    pub fn add_area(&mut self, area: HitArea<W>) {
        self.areas.push(area);
    }

    /// Drop all hit areas.
    pub fn clear_areas(&mut self) {
        self.areas.clear();
    }

    /// Registered chords, in registration order.
    #[must_use]
    pub fn chords(&self) -> &[Chord<W>] {
        &self.chords
    }

    /// Whether the router has no bindings at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty() && self.areas.is_empty()
    }

    /// Move every binding out of `other` into `self`, ahead of the ones
    /// already present.
    ///
    /// Restores a router after a take-dispatch cycle without losing
    /// bindings the callbacks registered on the fresh instance: the
    /// taken (original) bindings keep their registration order, anything
    /// added during dispatch follows them.
    pub fn absorb(&mut self, mut other: Self) {
        std::mem::swap(&mut self.chords, &mut other.chords);
        std::mem::swap(&mut self.areas, &mut other.areas);
        self.chords.append(&mut other.chords);
        self.areas.append(&mut other.areas);
    }

    /// Reset every chord's match cursor.
    pub fn reset_chords(&mut self) {
        for chord in &mut self.chords {
            chord.reset();
        }
    }

    /// Route the current key event to every chord.
    ///
    /// All chords see the event (they track independent cursors); the
    /// results are ORed. A callback that calls `ctx.stop_input()` stops
    /// the remaining chords from seeing the event.
    pub fn dispatch_key(&mut self, target: &mut W, ctx: &mut EventContext) -> KeyDispatch {
        let mut dispatch = KeyDispatch::NONE;
        for chord in &mut self.chords {
            let d = chord.feed(target, ctx);
            if d.fired {
                tracing::trace!(chord = %chord.name(ctx.chord_separator()), "chord fired");
            }
            dispatch |= d;
            if ctx.input_stopped() {
                break;
            }
        }
        dispatch
    }

    /// Route the current mouse event to the hit areas; the first match
    /// fires and wins.
    pub fn dispatch_mouse(
        &mut self,
        target: &mut W,
        ctx: &mut EventContext,
        widget_pos: Vec2,
        widget_size: Vec2,
    ) -> bool {
        for area in &mut self.areas {
            if area.try_fire(target, ctx, widget_pos, widget_size) {
                return true;
            }
        }
        false
    }
}

impl<W: ?Sized> fmt::Debug for InputRouter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRouter")
            .field("chords", &self.chords.len())
            .field("areas", &self.areas.len())
            .finish()
    }
}

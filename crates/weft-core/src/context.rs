//! Per-event runtime state shared with widget callbacks.

use crate::event::{KeyEventData, MouseEventData, TermEvent};
use crate::notifier::{Notifier, Phase};
use crate::runtime::WidgetId;

/// Mutable state threaded through every callback during event dispatch.
///
/// Widget callbacks receive `&mut EventContext` and use it to inspect the
/// raw event, read the pending repeat count, cut input routing short, or
/// request deferred widget removal.
#[derive(Debug)]
pub struct EventContext {
    stop: bool,
    full_redraw: bool,
    frame_count: u64,
    repeat: usize,
    has_repeat: bool,
    event: Option<TermEvent>,
    stop_input: bool,
    dont_reset_repeat: bool,
    no_repeat_capture: bool,
    chord_pending: bool,
    chord_separator: String,
    removals: Vec<(WidgetId, bool)>,
    /// Fired around every change of the repeat accumulator: `Before` with
    /// the outgoing value, `After` with the applied value.
    pub on_repeat_change: Notifier<usize>,
}

impl Default for EventContext {
    fn default() -> Self {
        Self {
            stop: false,
            full_redraw: false,
            frame_count: 0,
            repeat: 0,
            has_repeat: false,
            event: None,
            stop_input: false,
            dont_reset_repeat: false,
            no_repeat_capture: false,
            chord_pending: false,
            chord_separator: " ".to_owned(),
            removals: Vec::new(),
            on_repeat_change: Notifier::new(),
        }
    }
}

impl EventContext {
    /// Ask the event loop to exit after the current iteration.
    pub fn request_stop(&mut self) {
        self.stop = true;
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop
    }

    /// Force every visible widget to repaint on the next redraw pass.
    pub fn request_full_redraw(&mut self) {
        self.full_redraw = true;
    }

    /// Whether a full redraw is pending.
    #[must_use]
    pub fn full_redraw(&self) -> bool {
        self.full_redraw
    }

    pub(crate) fn clear_full_redraw(&mut self) {
        self.full_redraw = false;
    }

    /// Number of frames flushed so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub(crate) fn bump_frame(&mut self) {
        self.frame_count += 1;
    }

    /// The event currently being dispatched.
    #[must_use]
    pub fn event(&self) -> Option<TermEvent> {
        self.event
    }

    /// Set the event currently being dispatched.
    pub fn set_event(&mut self, ev: TermEvent) {
        self.event = Some(ev);
    }

    /// The current event, if it is a key event.
    #[must_use]
    pub fn key_event(&self) -> Option<KeyEventData> {
        match self.event {
            Some(TermEvent::Key(k)) => Some(k),
            _ => None,
        }
    }

    /// The current event, if it is a mouse event.
    #[must_use]
    pub fn mouse_event(&self) -> Option<MouseEventData> {
        match self.event {
            Some(TermEvent::Mouse(m)) => Some(m),
            _ => None,
        }
    }

    /// Pending repeat count accumulated from digit keys (0 if none).
    #[must_use]
    pub fn repeat(&self) -> usize {
        self.repeat
    }

    /// Whether any digit has been captured since the last reset.
    ///
    /// Distinguishes "no count" from an explicit count of zero.
    #[must_use]
    pub fn has_repeat(&self) -> bool {
        self.has_repeat
    }

    /// Stop routing the current event to further chords and widgets.
    pub fn stop_input(&mut self) {
        self.stop_input = true;
    }

    /// Whether input routing has been cut short for this event.
    #[must_use]
    pub fn input_stopped(&self) -> bool {
        self.stop_input
    }

    pub(crate) fn reset_stop_input(&mut self) {
        self.stop_input = false;
    }

    /// Keep the repeat accumulator across the current event instead of
    /// resetting it once dispatch finishes. Cleared automatically at the
    /// end of the event.
    pub fn protect_repeat(&mut self) {
        self.dont_reset_repeat = true;
    }

    /// Enable or disable digit capture entirely (e.g. while an input
    /// field has focus and digits must reach it as characters).
    pub fn set_repeat_capture(&mut self, enabled: bool) {
        self.no_repeat_capture = !enabled;
    }

    /// Whether digit capture is currently suppressed.
    #[must_use]
    pub fn repeat_capture_suppressed(&self) -> bool {
        self.no_repeat_capture
    }

    /// Whether some chord advanced (without firing) on the previous key
    /// event. While set, fresh non-wildcard chords sit out the event so a
    /// pending multi-key sequence cannot be stolen from.
    #[must_use]
    pub fn chord_pending(&self) -> bool {
        self.chord_pending
    }

    pub(crate) fn set_chord_pending(&mut self, pending: bool) {
        self.chord_pending = pending;
    }

    /// Separator to put between key names when rendering a chord,
    /// taken from [`crate::Config::chord_separator`] by the runtime.
    #[must_use]
    pub fn chord_separator(&self) -> &str {
        &self.chord_separator
    }

    pub(crate) fn set_chord_separator(&mut self, separator: String) {
        self.chord_separator = separator;
    }

    /// Request removal of a widget once the current event's callbacks have
    /// all returned. With `defer_delete` the widget is destroyed on the
    /// destruction queue; otherwise it is dropped immediately at the drain
    /// point. Safe to call from the removed widget's own callback.
    pub fn request_remove(&mut self, id: WidgetId, defer_delete: bool) {
        self.removals.push((id, defer_delete));
    }

    pub(crate) fn take_removals(&mut self) -> Vec<(WidgetId, bool)> {
        std::mem::take(&mut self.removals)
    }

    /// Fold one decimal digit into the repeat accumulator, notifying the
    /// repeat listeners before and after the mutation.
    pub(crate) fn accumulate_repeat(&mut self, digit: usize) {
        self.on_repeat_change.notify(Phase::Before, &self.repeat);
        self.has_repeat = true;
        self.repeat = self.repeat * 10 + digit;
        self.on_repeat_change.notify(Phase::After, &self.repeat);
    }

    /// End-of-key-event repeat bookkeeping: reset the accumulator unless
    /// it was explicitly protected, then clear the protection for the
    /// next event.
    pub(crate) fn finish_repeat_event(&mut self) {
        if self.repeat != 0 && !self.dont_reset_repeat {
            self.on_repeat_change.notify(Phase::Before, &self.repeat);
            self.repeat = 0;
            self.has_repeat = false;
            self.on_repeat_change.notify(Phase::After, &self.repeat);
        }
        self.dont_reset_repeat = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_repeat_accumulates_decimal_digits() {
        let mut ctx = EventContext::default();
        ctx.accumulate_repeat(1);
        ctx.accumulate_repeat(2);
        assert_eq!(ctx.repeat(), 12);
        assert!(ctx.has_repeat());
    }

    #[test]
    fn test_finish_resets_unless_protected() {
        let mut ctx = EventContext::default();
        ctx.accumulate_repeat(3);
        ctx.protect_repeat();
        ctx.finish_repeat_event();
        assert_eq!(ctx.repeat(), 3);
        // Protection only lasts one event.
        ctx.finish_repeat_event();
        assert_eq!(ctx.repeat(), 0);
        assert!(!ctx.has_repeat());
    }

    #[test]
    fn test_chord_separator_defaults_to_a_space() {
        let mut ctx = EventContext::default();
        assert_eq!(ctx.chord_separator(), " ");
        ctx.set_chord_separator("-".to_owned());
        assert_eq!(ctx.chord_separator(), "-");
    }

    #[test]
    fn test_repeat_listeners_see_old_then_new_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = EventContext::default();
        let s = Rc::clone(&seen);
        ctx.on_repeat_change
            .add(Phase::Before, move |v| s.borrow_mut().push(("before", *v)));
        let s = Rc::clone(&seen);
        ctx.on_repeat_change
            .add(Phase::After, move |v| s.borrow_mut().push(("after", *v)));

        ctx.accumulate_repeat(4);
        assert_eq!(*seen.borrow(), vec![("before", 0), ("after", 4)]);
    }
}

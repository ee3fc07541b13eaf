//! Rectangular mouse hit areas.

use crate::context::EventContext;
use crate::event::MouseButton;
use crate::geometry::Vec2;
use std::fmt;

/// A rectangular region, relative to its owning widget, that reacts to
/// one mouse button.
///
/// The rectangle is expressed as offsets so it tracks the widget through
/// moves and resizes: it covers `[pos + pos_offset, pos + pos_offset +
/// size + size_offset]`, inclusive on both axes. Zero offsets cover the
/// widget exactly; a `size_offset` of `(0, -height+1)` restricts the area
/// to the widget's top row.
pub struct HitArea<W: ?Sized> {
    /// Offset of the area's origin from the widget origin.
    pub pos_offset: Vec2,
    /// Adjustment applied to the widget size to get the area extent.
    pub size_offset: Vec2,
    button: MouseButton,
    callback: Box<dyn FnMut(&mut W, &mut EventContext, Vec2)>,
}

impl<W: ?Sized> HitArea<W> {
    /// Create a hit area covering the widget exactly.
    ///
    /// The callback receives the event position relative to the area
    /// origin.
    pub fn new(
        button: MouseButton,
        callback: impl FnMut(&mut W, &mut EventContext, Vec2) + 'static,
    ) -> Self {
        Self {
            pos_offset: Vec2::ZERO,
            size_offset: Vec2::ZERO,
            button,
            callback: Box::new(callback),
        }
    }

    /// Adjust both offsets.
    pub fn set_offset(&mut self, pos_offset: Vec2, size_offset: Vec2) {
        self.pos_offset = pos_offset;
        self.size_offset = size_offset;
    }

    /// The button this area reacts to.
    #[must_use]
    pub fn button(&self) -> MouseButton {
        self.button
    }

    /// Fire the callback if the event hits this area.
    ///
    /// `widget_pos` and `widget_size` are the owning widget's current
    /// geometry. Returns whether the area matched.
    pub fn try_fire(
        &mut self,
        target: &mut W,
        ctx: &mut EventContext,
        widget_pos: Vec2,
        widget_size: Vec2,
    ) -> bool {
        let Some(ev) = ctx.mouse_event() else {
            return false;
        };
        if ev.button != self.button {
            return false;
        }
        let lo = widget_pos + self.pos_offset;
        let hi = lo + widget_size + self.size_offset;
        if !ev.pos.within(lo, hi) {
            return false;
        }
        (self.callback)(target, ctx, ev.pos - lo);
        true
    }
}

impl<W: ?Sized> fmt::Debug for HitArea<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitArea")
            .field("pos_offset", &self.pos_offset)
            .field("size_offset", &self.size_offset)
            .field("button", &self.button)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MouseEventData, TermEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mouse_ctx(button: MouseButton, pos: Vec2) -> EventContext {
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Mouse(MouseEventData { button, pos }));
        ctx
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h = Rc::clone(&hits);
        let mut area = HitArea::new(MouseButton::Left, move |(), _, rel| {
            h.borrow_mut().push(rel);
        });
        let pos = Vec2::new(0, 0);
        let size = Vec2::new(4, 4);

        let mut ctx = mouse_ctx(MouseButton::Left, Vec2::new(4, 4));
        assert!(area.try_fire(&mut (), &mut ctx, pos, size));

        let mut ctx = mouse_ctx(MouseButton::Left, Vec2::new(5, 0));
        assert!(!area.try_fire(&mut (), &mut ctx, pos, size));

        assert_eq!(*hits.borrow(), vec![Vec2::new(4, 4)]);
    }

    #[test]
    fn test_button_must_match() {
        let mut area = HitArea::new(MouseButton::WheelUp, |(), _, _| {});
        let mut ctx = mouse_ctx(MouseButton::Left, Vec2::new(1, 1));
        assert!(!area.try_fire(&mut (), &mut ctx, Vec2::ZERO, Vec2::new(4, 4)));
    }

    #[test]
    fn test_offsets_shift_and_shrink() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h = Rc::clone(&hits);
        let mut area = HitArea::new(MouseButton::Left, move |(), _, rel| {
            h.borrow_mut().push(rel);
        });
        // Top row only of a 10x5 widget at (2,3).
        area.set_offset(Vec2::new(0, 0), Vec2::new(0, -5));
        let pos = Vec2::new(2, 3);
        let size = Vec2::new(10, 5);

        let mut ctx = mouse_ctx(MouseButton::Left, Vec2::new(6, 3));
        assert!(area.try_fire(&mut (), &mut ctx, pos, size));
        let mut ctx = mouse_ctx(MouseButton::Left, Vec2::new(6, 4));
        assert!(!area.try_fire(&mut (), &mut ctx, pos, size));

        // Relative position is measured from the area origin.
        assert_eq!(*hits.borrow(), vec![Vec2::new(4, 0)]);
    }

    #[test]
    fn test_ignores_key_events() {
        let mut area = HitArea::new(MouseButton::Left, |(), _, _| {});
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Key(crate::event::KeyEventData::ch('x')));
        assert!(!area.try_fire(&mut (), &mut ctx, Vec2::ZERO, Vec2::new(4, 4)));
    }
}

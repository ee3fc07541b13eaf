//! A bordered, titled container widget.

use crate::backend::Backend;
use crate::chord::KeyDispatch;
use crate::context::EventContext;
use crate::draw::{self, BorderGlyphs, BorderSides};
use crate::geometry::{Rect, Vec2};
use crate::router::InputRouter;
use crate::style::{Cell, Style};
use crate::widget::{Draw, KeyboardHandler, MouseHandler, Resize, Widget, WidgetCore};
use std::any::Any;

struct Child {
    widget: Box<dyn Widget>,
    expired: bool,
}

/// A composite widget: border, title, background, and owned children
/// positioned relative to the interior.
///
/// The window registers with the runtime as one widget and fans events
/// out itself: active children see input first (a match wins), then the
/// window's own bindings. Children are translated into the interior for
/// drawing and mouse dispatch, so a child at `(0, 0)` sits in the
/// interior's top-left corner.
pub struct Window {
    core: WidgetCore,
    router: InputRouter<Window>,
    children: Vec<Child>,
    glyphs: BorderGlyphs,
    sides: BorderSides,
    title: String,
    background: Style,
    invalidated: bool,
    interior: Rect,
    saved_active: Option<Vec<bool>>,
}

impl Window {
    /// Create a window with a single-line border on all sides.
    #[must_use]
    pub fn new(pos: Vec2, size: Vec2, title: impl Into<String>) -> Self {
        let mut core = WidgetCore::new();
        core.set_position(pos);
        core.set_size(size);
        let mut win = Self {
            core,
            router: InputRouter::new(),
            children: Vec::new(),
            glyphs: BorderGlyphs::default(),
            sides: BorderSides::ALL,
            title: title.into(),
            background: Style::default(),
            invalidated: true,
            interior: Rect::default(),
            saved_active: None,
        };
        win.recompute_interior();
        win
    }

    fn recompute_interior(&mut self) {
        let outer = Rect::new(self.core.position(), self.core.size());
        let mut interior = outer;
        if self.sides.contains(BorderSides::TOP) {
            interior.pos.y += 1;
            interior.size.y -= 1;
        }
        if self.sides.contains(BorderSides::BOTTOM) {
            interior.size.y -= 1;
        }
        if self.sides.contains(BorderSides::LEFT) {
            interior.pos.x += 1;
            interior.size.x -= 1;
        }
        if self.sides.contains(BorderSides::RIGHT) {
            interior.size.x -= 1;
        }
        interior.size.x = interior.size.x.max(0);
        interior.size.y = interior.size.y.max(0);
        self.interior = interior;
    }

    /// The window's input bindings.
    pub fn router_mut(&mut self) -> &mut InputRouter<Window> {
        &mut self.router
    }

    /// Change the title. Repaints on the next draw.
    pub fn set_name(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.invalidated = true;
    }

    /// Change the background fill, optionally recoloring the border and
    /// title to match.
    pub fn set_background(&mut self, style: Style, recolor_frame: bool) {
        self.background = style;
        if recolor_frame {
            self.glyphs = self.glyphs.with_style(style);
        }
        self.invalidated = true;
    }

    /// Replace the border glyphs and sides.
    pub fn set_border(&mut self, glyphs: BorderGlyphs, sides: BorderSides) {
        self.glyphs = glyphs;
        self.sides = sides;
        self.recompute_interior();
        self.invalidated = true;
    }

    /// Force a full repaint of frame and children on the next draw.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// The interior rectangle, in absolute coordinates.
    #[must_use]
    pub fn interior_bounds(&self) -> Rect {
        self.interior
    }

    /// Adopt a child widget, positioned relative to the interior.
    /// Returns its index.
    pub fn add_child(&mut self, widget: Box<dyn Widget>) -> usize {
        self.children.push(Child {
            widget,
            expired: true,
        });
        self.children.len() - 1
    }

    /// A child by index.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&dyn Widget> {
        self.children.get(index).map(|c| c.widget.as_ref())
    }

    /// A child by index, mutably.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut (dyn Widget + 'static)> {
        self.children.get_mut(index).map(|c| c.widget.as_mut())
    }

    /// A child downcast to its concrete type.
    #[must_use]
    pub fn child_as<W: Widget + 'static>(&self, index: usize) -> Option<&W> {
        self.child(index).and_then(|c| c.as_any().downcast_ref())
    }

    /// A child downcast to its concrete type, mutably. Marks the child
    /// dirty, since callers usually mutate it.
    pub fn child_as_mut<W: Widget + 'static>(&mut self, index: usize) -> Option<&mut W> {
        if let Some(child) = self.children.get_mut(index) {
            child.expired = true;
        }
        self.child_mut(index)
            .and_then(|c| c.as_any_mut().downcast_mut())
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Mark a child dirty so it repaints on the next draw.
    pub fn expire_child(&mut self, index: usize) {
        if let Some(child) = self.children.get_mut(index) {
            child.expired = true;
        }
    }

    /// Deactivate every child, remembering the current states.
    pub fn suspend_children(&mut self) {
        let saved = self
            .children
            .iter()
            .map(|c| c.widget.core().active())
            .collect();
        self.saved_active = Some(saved);
        for child in &mut self.children {
            child.widget.core_mut().set_active(false);
        }
    }

    /// Undo [`Window::suspend_children`], restoring the saved states.
    pub fn restore_children(&mut self) {
        if let Some(saved) = self.saved_active.take() {
            for (child, active) in self.children.iter_mut().zip(saved) {
                child.widget.core_mut().set_active(active);
            }
        }
    }

    fn draw_frame(&mut self, screen: &mut dyn Backend) {
        let outer = Rect::new(self.core.position(), self.core.size());
        draw::fill_rect(screen, outer, Cell::new(' ', self.background));
        self.interior = draw::border(screen, outer, &self.glyphs, self.sides);
        if !self.title.is_empty() && self.sides.contains(BorderSides::TOP) {
            let at = outer.pos + Vec2::new(2, 0);
            draw::text_line(
                screen,
                at,
                outer.size.x - 4,
                &self.title,
                self.glyphs.style,
                Some('\u{2026}'),
            );
        }
    }
}

impl Draw for Window {
    fn draw(&mut self, screen: &mut dyn Backend) {
        if self.invalidated {
            self.draw_frame(screen);
        }
        let offset = self.interior.pos;
        for child in &mut self.children {
            if !child.widget.core().visible() {
                continue;
            }
            if child.expired || self.invalidated {
                child.widget.core_mut().translate(offset);
                child.widget.draw(screen);
                child.widget.core_mut().translate(Vec2::ZERO - offset);
                child.expired = false;
            }
        }
        self.invalidated = false;
    }
}

impl Resize for Window {
    fn resize(&mut self, size: Vec2) {
        for child in &mut self.children {
            child.widget.resize(size);
            child.expired = true;
        }
        self.invalidated = true;
    }
}

impl KeyboardHandler for Window {
    fn process_key(&mut self, ctx: &mut EventContext) -> KeyDispatch {
        let mut dispatch = KeyDispatch::NONE;
        for child in &mut self.children {
            if !child.widget.core().active() {
                continue;
            }
            let d = child.widget.process_key(ctx);
            child.expired |= d.fired;
            dispatch |= d;
            if d.fired || ctx.input_stopped() {
                return dispatch;
            }
        }

        let mut router = std::mem::take(&mut self.router);
        dispatch |= router.dispatch_key(self, ctx);
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        dispatch
    }
}

impl MouseHandler for Window {
    fn process_mouse(&mut self, ctx: &mut EventContext) -> bool {
        let offset = self.interior.pos;
        for child in &mut self.children {
            if !child.widget.core().active() {
                continue;
            }
            child.widget.core_mut().translate(offset);
            let hit = child.widget.process_mouse(ctx);
            child.widget.core_mut().translate(Vec2::ZERO - offset);
            if hit {
                child.expired = true;
                return true;
            }
        }

        let mut router = std::mem::take(&mut self.router);
        let hit = router.dispatch_mouse(self, ctx, self.core.position(), self.core.size());
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        hit
    }
}

impl Widget for Window {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TestBackend;
    use crate::event::{KeyEventData, MouseButton, MouseEventData, TermEvent};
    use crate::hit::HitArea;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    struct Glyph {
        core: WidgetCore,
        router: InputRouter<Glyph>,
        ch: char,
    }

    impl Glyph {
        fn boxed(pos: Vec2, ch: char) -> Box<Self> {
            let mut core = WidgetCore::new();
            core.set_position(pos);
            core.set_size(Vec2::new(1, 1));
            Box::new(Self {
                core,
                router: InputRouter::new(),
                ch,
            })
        }
    }

    impl Draw for Glyph {
        fn draw(&mut self, screen: &mut dyn Backend) {
            screen.set_cell(self.core.position(), Cell::from_char(self.ch));
        }
    }

    impl Resize for Glyph {
        fn resize(&mut self, _size: Vec2) {}
    }

    impl KeyboardHandler for Glyph {
        fn process_key(&mut self, ctx: &mut EventContext) -> KeyDispatch {
            let mut router = std::mem::take(&mut self.router);
            let d = router.dispatch_key(self, ctx);
            self.router = router;
            d
        }
    }

    impl MouseHandler for Glyph {
        fn process_mouse(&mut self, ctx: &mut EventContext) -> bool {
            let mut router = std::mem::take(&mut self.router);
            let hit = router.dispatch_mouse(self, ctx, self.core.position(), self.core.size());
            self.router = router;
            hit
        }
    }

    impl Widget for Glyph {
        fn core(&self) -> &WidgetCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut WidgetCore {
            &mut self.core
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn key_ctx(c: char) -> EventContext {
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Key(KeyEventData::ch(c)));
        ctx
    }

    #[test]
    fn test_children_draw_inside_the_interior() {
        let mut win = Window::new(Vec2::new(1, 1), Vec2::new(8, 4), "t");
        win.add_child(Glyph::boxed(Vec2::ZERO, 'x'));

        let mut screen = TestBackend::new(12, 6);
        win.draw(&mut screen);

        // Interior starts one cell inside the border.
        assert_eq!(win.interior_bounds(), Rect::new(Vec2::new(2, 2), Vec2::new(6, 2)));
        assert_eq!(screen.cell_at(Vec2::new(2, 2)).unwrap().ch, 'x');
        assert_eq!(screen.cell_at(Vec2::new(1, 1)).unwrap().ch, '\u{250c}');
        // Child position restored after the draw.
        assert_eq!(win.child(0).unwrap().core().position(), Vec2::ZERO);
    }

    #[test]
    fn test_title_renders_on_top_border() {
        let mut win = Window::new(Vec2::ZERO, Vec2::new(10, 3), "log");
        let mut screen = TestBackend::new(10, 3);
        win.draw(&mut screen);
        assert_eq!(&screen.row_text(0)[..], "\u{250c}\u{2500}log\u{2500}\u{2500}\u{2500}\u{2500}\u{2510}");
    }

    #[test]
    fn test_active_children_get_keys_before_the_window() {
        let order = Rc::new(StdCell::new(0));
        let mut win = Window::new(Vec2::ZERO, Vec2::new(8, 4), "");

        let mut child = Glyph::boxed(Vec2::ZERO, 'c');
        let o = Rc::clone(&order);
        child
            .router
            .bind("k", move |_: &mut Glyph, _| o.set(1))
            .unwrap();
        win.add_child(child);

        let o = Rc::clone(&order);
        win.router_mut()
            .bind("k", move |_: &mut Window, _| o.set(2))
            .unwrap();

        let mut ctx = key_ctx('k');
        let d = win.process_key(&mut ctx);
        assert!(d.fired);
        assert_eq!(order.get(), 1);
    }

    #[test]
    fn test_suspended_children_skip_input_until_restored() {
        let hits = Rc::new(StdCell::new(0));
        let mut win = Window::new(Vec2::ZERO, Vec2::new(8, 4), "");
        let mut child = Glyph::boxed(Vec2::ZERO, 'c');
        let h = Rc::clone(&hits);
        child
            .router
            .bind("k", move |_: &mut Glyph, _| h.set(h.get() + 1))
            .unwrap();
        win.add_child(child);

        win.suspend_children();
        assert!(!win.process_key(&mut key_ctx('k')).fired);
        win.restore_children();
        assert!(win.process_key(&mut key_ctx('k')).fired);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_mouse_hits_translated_child() {
        let hits = Rc::new(StdCell::new(None));
        let mut win = Window::new(Vec2::new(1, 1), Vec2::new(8, 4), "");
        let mut child = Glyph::boxed(Vec2::ZERO, 'c');
        child.core.set_size(Vec2::new(2, 1));
        let h = Rc::clone(&hits);
        child
            .router
            .add_area(HitArea::new(MouseButton::Left, move |_: &mut Glyph, _, rel| {
                h.set(Some(rel));
            }));
        win.add_child(child);

        // Interior origin is (2,2); click the child's second cell.
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Mouse(MouseEventData {
            button: MouseButton::Left,
            pos: Vec2::new(3, 2),
        }));
        assert!(win.process_mouse(&mut ctx));
        assert_eq!(hits.get(), Some(Vec2::new(1, 0)));
    }
}

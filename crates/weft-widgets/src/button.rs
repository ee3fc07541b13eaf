//! A clickable, focusable button.

use weft_core::chord::KeyDispatch;
use weft_core::draw::{self, BorderGlyphs, BorderSides};
use weft_core::{
    Attrs, Backend, Cell, Draw, EventContext, HitArea, InputRouter, KeyboardHandler, MouseButton,
    MouseHandler, Notifier, Phase, Rect, Resize, Style, Vec2, Widget, WidgetCore,
};

/// A bordered button that presses on Enter, Space or a left click.
///
/// Subscribers hear about presses through [`Button::on_press`]; the
/// `After` phase fires once the press has been applied.
pub struct Button {
    core: WidgetCore,
    router: InputRouter<Button>,
    label: String,
    style: Style,
    presses: u64,
    /// Fired around every press.
    pub on_press: Notifier<u64>,
}

impl Button {
    /// A button at `pos` sized to its label plus the border.
    #[must_use]
    pub fn new(pos: Vec2, label: impl Into<String>) -> Self {
        let label = label.into();
        let width = i32::try_from(label.chars().count()).unwrap_or(i32::MAX - 4) + 4;
        let mut core = WidgetCore::new();
        core.set_position(pos);
        core.set_size(Vec2::new(width, 3));

        let mut router = InputRouter::new();
        for spelling in ["ENTER", "SPC"] {
            router
                .bind(spelling, Button::press)
                .expect("static chord spelling");
        }
        router.add_area(HitArea::new(MouseButton::Left, |b: &mut Button, ctx, _| {
            b.press(ctx);
        }));

        Self {
            core,
            router,
            label,
            style: Style::default(),
            presses: 0,
            on_press: Notifier::new(),
        }
    }

    /// The label text.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Total presses so far.
    #[must_use]
    pub fn presses(&self) -> u64 {
        self.presses
    }

    /// Replace the style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn press(&mut self, _ctx: &mut EventContext) {
        self.on_press.notify(Phase::Before, &self.presses);
        self.presses += 1;
        self.on_press.notify(Phase::After, &self.presses);
    }
}

impl Draw for Button {
    fn draw(&mut self, screen: &mut dyn Backend) {
        let outer = Rect::new(self.core.position(), self.core.size());
        let style = if self.core.active() {
            self.style.with_attrs(self.style.attrs | Attrs::BOLD)
        } else {
            self.style.with_attrs(self.style.attrs | Attrs::DIM)
        };
        draw::fill_rect(screen, outer, Cell::new(' ', style));
        let interior = draw::border(
            screen,
            outer,
            &BorderGlyphs::single(style),
            BorderSides::ALL,
        );
        draw::text_line(
            screen,
            interior.pos + Vec2::new(1, 0),
            interior.size.x - 2,
            &self.label,
            style,
            Some('\u{2026}'),
        );
    }
}

impl Resize for Button {
    fn resize(&mut self, _size: Vec2) {}
}

impl KeyboardHandler for Button {
    fn process_key(&mut self, ctx: &mut EventContext) -> KeyDispatch {
        let mut router = std::mem::take(&mut self.router);
        let d = router.dispatch_key(self, ctx);
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        d
    }
}

impl MouseHandler for Button {
    fn process_mouse(&mut self, ctx: &mut EventContext) -> bool {
        let mut router = std::mem::take(&mut self.router);
        let hit = router.dispatch_mouse(self, ctx, self.core.position(), self.core.size());
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        hit
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;
    use weft_core::{KeyEventData, MouseEventData, SymKey, TermEvent, TestBackend};

    fn key_ctx(ev: KeyEventData) -> EventContext {
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Key(ev));
        ctx
    }

    #[test]
    fn test_enter_and_space_press() {
        let mut button = Button::new(Vec2::ZERO, "ok");
        let mut ctx = key_ctx(KeyEventData::sym(SymKey::Enter));
        assert!(button.process_key(&mut ctx).fired);
        let mut ctx = key_ctx(KeyEventData::sym(SymKey::Space));
        assert!(button.process_key(&mut ctx).fired);
        assert_eq!(button.presses(), 2);
    }

    #[test]
    fn test_click_inside_presses_outside_misses() {
        let mut button = Button::new(Vec2::new(2, 1), "ok");
        let count = Rc::new(StdCell::new(0u64));
        let c = Rc::clone(&count);
        button.on_press.add(Phase::After, move |n| c.set(*n));

        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Mouse(MouseEventData {
            button: MouseButton::Left,
            pos: Vec2::new(3, 2),
        }));
        assert!(button.process_mouse(&mut ctx));
        assert_eq!(count.get(), 1);

        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Mouse(MouseEventData {
            button: MouseButton::Left,
            pos: Vec2::new(20, 2),
        }));
        assert!(!button.process_mouse(&mut ctx));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_draws_bordered_label() {
        let mut button = Button::new(Vec2::ZERO, "go");
        let mut screen = TestBackend::new(8, 3);
        button.draw(&mut screen);
        assert_eq!(screen.row_text(1), "\u{2502} go \u{2502}  ");
    }
}

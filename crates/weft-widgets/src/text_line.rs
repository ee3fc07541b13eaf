//! A single styled line of text.

use weft_core::chord::KeyDispatch;
use weft_core::draw;
use weft_core::{
    Backend, Draw, EventContext, KeyboardHandler, MouseHandler, Resize, Style, Vec2, Widget,
    WidgetCore,
};

/// A non-interactive text label, clipped to its width with a trailing
/// ellipsis.
#[derive(Debug)]
pub struct TextLine {
    core: WidgetCore,
    text: String,
    style: Style,
}

impl TextLine {
    /// A label at `pos`, `width` cells wide.
    #[must_use]
    pub fn new(pos: Vec2, width: i32, text: impl Into<String>) -> Self {
        let mut core = WidgetCore::new();
        core.set_position(pos);
        core.set_size(Vec2::new(width, 1));
        Self {
            core,
            text: text.into(),
            style: Style::default(),
        }
    }

    /// The current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }
}

impl Draw for TextLine {
    fn draw(&mut self, screen: &mut dyn Backend) {
        let pos = self.core.position();
        let width = self.core.size().x;
        // Blank the full width so shorter text replaces longer text.
        draw::h_line(
            screen,
            pos,
            width,
            weft_core::Cell::new(' ', self.style),
        );
        draw::text_line(screen, pos, width, &self.text, self.style, Some('\u{2026}'));
    }
}

impl Resize for TextLine {
    fn resize(&mut self, _size: Vec2) {}
}

impl KeyboardHandler for TextLine {
    fn process_key(&mut self, _ctx: &mut EventContext) -> KeyDispatch {
        KeyDispatch::NONE
    }
}

impl MouseHandler for TextLine {
    fn process_mouse(&mut self, _ctx: &mut EventContext) -> bool {
        false
    }
}

impl Widget for TextLine {
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
    use weft_core::TestBackend;

    #[test]
    fn test_draws_clipped_text() {
        let mut label = TextLine::new(Vec2::new(1, 0), 5, "hello world");
        let mut screen = TestBackend::new(10, 1);
        label.draw(&mut screen);
        assert_eq!(screen.row_text(0), " hell\u{2026}    ");
    }

    #[test]
    fn test_redraw_blanks_stale_tail() {
        let mut label = TextLine::new(Vec2::ZERO, 8, "longtext");
        let mut screen = TestBackend::new(8, 1);
        label.draw(&mut screen);
        label.set_text("ok");
        label.draw(&mut screen);
        assert_eq!(screen.row_text(0), "ok      ");
    }
}

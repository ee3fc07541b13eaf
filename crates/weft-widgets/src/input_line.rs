//! A single-line text input with history.

use weft_core::chord::KeyDispatch;
use weft_core::{
    Attrs, Backend, Cell, Draw, EventContext, InputRouter, KeyCode, KeyboardHandler, MouseHandler,
    Notifier, Phase, Resize, Style, Vec2, Widget, WidgetCore,
};

/// An editable text field.
///
/// Printable characters arrive through a character wildcard, so the
/// field accepts anything the terminal can type without per-key
/// bindings. Enter commits the line: it is appended to the history,
/// announced on [`InputLine::on_submit`], and the field clears.
///
/// Digit keys reach the field only while the runtime's repeat capture
/// is disabled (`EventContext::set_repeat_capture(false)`); callers
/// that focus an input line are expected to toggle that.
pub struct InputLine {
    core: WidgetCore,
    router: InputRouter<InputLine>,
    buffer: Vec<char>,
    cursor: usize,
    scroll: usize,
    history: Vec<String>,
    history_pos: Option<usize>,
    draft: Vec<char>,
    style: Style,
    /// Fired around every commit, with the submitted line.
    pub on_submit: Notifier<String>,
}

impl InputLine {
    /// An empty field at `pos`, `width` cells wide.
    #[must_use]
    pub fn new(pos: Vec2, width: i32) -> Self {
        let mut core = WidgetCore::new();
        core.set_position(pos);
        core.set_size(Vec2::new(width, 1));

        let mut router = InputRouter::new();
        let bindings: [(&str, fn(&mut InputLine, &mut EventContext)); 10] = [
            ("#SCHAR", Self::insert_event_char),
            ("SPC", |line, _| line.insert(' ')),
            ("LEFT", |line, _| line.move_cursor(-1)),
            ("RIGHT", |line, _| line.move_cursor(1)),
            ("HOME", |line, _| line.set_cursor(0)),
            ("END", |line, _| line.set_cursor(line.buffer.len())),
            ("BACKSPACE", |line, _| line.delete_before()),
            ("DEL", |line, _| line.delete_at()),
            ("ENTER", Self::submit),
            ("UP", |line, _| line.history_step(-1)),
        ];
        for (spelling, f) in bindings {
            router.bind(spelling, f).expect("static chord spelling");
        }
        router
            .bind("DOWN", |line: &mut Self, _| line.history_step(1))
            .expect("static chord spelling");

        Self {
            core,
            router,
            buffer: Vec::new(),
            cursor: 0,
            scroll: 0,
            history: Vec::new(),
            history_pos: None,
            draft: Vec::new(),
            style: Style::default(),
            on_submit: Notifier::new(),
        }
    }

    /// The current (uncommitted) text.
    #[must_use]
    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    /// Replace the current text, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.chars().collect();
        self.set_cursor(self.buffer.len());
    }

    /// Committed lines, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Cursor position, in characters.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn insert_event_char(&mut self, ctx: &mut EventContext) {
        if let Some(ev) = ctx.key_event() {
            if let KeyCode::Char(c) = ev.code {
                self.insert(c);
            }
        }
    }

    fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.set_cursor(self.cursor + 1);
        self.history_pos = None;
    }

    fn move_cursor(&mut self, delta: i32) {
        let target = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.cursor + delta as usize
        };
        self.set_cursor(target);
    }

    fn set_cursor(&mut self, at: usize) {
        self.cursor = at.min(self.buffer.len());
        let visible = usize::try_from(self.core.size().x.max(1) - 1).unwrap_or(0).max(1);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + visible {
            self.scroll = self.cursor + 1 - visible;
        }
    }

    fn delete_before(&mut self) {
        if self.cursor > 0 {
            self.buffer.remove(self.cursor - 1);
            self.set_cursor(self.cursor - 1);
        }
    }

    fn delete_at(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    fn submit(&mut self, _ctx: &mut EventContext) {
        let line = self.text();
        self.on_submit.notify(Phase::Before, &line);
        if !line.is_empty() {
            self.history.push(line.clone());
        }
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
        self.history_pos = None;
        self.on_submit.notify(Phase::After, &line);
    }

    /// Step through history: negative towards older entries, positive
    /// back towards the in-progress draft.
    fn history_step(&mut self, direction: i32) {
        if self.history.is_empty() {
            return;
        }
        let next = match (self.history_pos, direction) {
            (None, d) if d < 0 => {
                self.draft = std::mem::take(&mut self.buffer);
                Some(self.history.len() - 1)
            }
            (None, _) => None,
            (Some(i), d) if d < 0 => Some(i.saturating_sub(1)),
            (Some(i), _) if i + 1 < self.history.len() => Some(i + 1),
            (Some(_), _) => {
                self.buffer = std::mem::take(&mut self.draft);
                self.set_cursor(self.buffer.len());
                self.history_pos = None;
                return;
            }
        };
        if let Some(i) = next {
            self.buffer = self.history[i].chars().collect();
            self.set_cursor(self.buffer.len());
        }
        self.history_pos = next;
    }
}

impl Draw for InputLine {
    fn draw(&mut self, screen: &mut dyn Backend) {
        let pos = self.core.position();
        let width = usize::try_from(self.core.size().x.max(0)).unwrap_or(0);
        for col in 0..width {
            let idx = self.scroll + col;
            let ch = self.buffer.get(idx).copied().unwrap_or(' ');
            let style = if idx == self.cursor && self.core.active() {
                self.style.with_attrs(self.style.attrs | Attrs::REVERSE)
            } else {
                self.style
            };
            let offset = i32::try_from(col).unwrap_or(i32::MAX);
            screen.set_cell(pos + Vec2::new(offset, 0), Cell::new(ch, style));
        }
    }
}

impl Resize for InputLine {
    fn resize(&mut self, _size: Vec2) {}
}

impl KeyboardHandler for InputLine {
    fn process_key(&mut self, ctx: &mut EventContext) -> KeyDispatch {
        let mut router = std::mem::take(&mut self.router);
        let d = router.dispatch_key(self, ctx);
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        d
    }
}

impl MouseHandler for InputLine {
    fn process_mouse(&mut self, ctx: &mut EventContext) -> bool {
        let mut router = std::mem::take(&mut self.router);
        let hit = router.dispatch_mouse(self, ctx, self.core.position(), self.core.size());
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        hit
    }
}

impl Widget for InputLine {
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
    use std::cell::RefCell;
    use std::rc::Rc;
    use weft_core::{KeyEventData, Modifier, SymKey, TermEvent};

    fn feed(line: &mut InputLine, ev: KeyEventData) {
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Key(ev));
        line.process_key(&mut ctx);
    }

    fn type_str(line: &mut InputLine, s: &str) {
        for c in s.chars() {
            if c == ' ' {
                feed(line, KeyEventData::sym(SymKey::Space));
            } else if c.is_uppercase() {
                feed(
                    line,
                    KeyEventData::new(KeyCode::Char(c), Modifier::Shift),
                );
            } else {
                feed(line, KeyEventData::ch(c));
            }
        }
    }

    #[test]
    fn test_typing_and_editing() {
        let mut line = InputLine::new(Vec2::ZERO, 20);
        type_str(&mut line, "Hi there");
        assert_eq!(line.text(), "Hi there");

        feed(&mut line, KeyEventData::sym(SymKey::Backspace));
        assert_eq!(line.text(), "Hi ther");

        feed(&mut line, KeyEventData::sym(SymKey::Home));
        feed(&mut line, KeyEventData::sym(SymKey::Delete));
        assert_eq!(line.text(), "i ther");

        feed(&mut line, KeyEventData::sym(SymKey::Right));
        feed(&mut line, KeyEventData::ch('x'));
        assert_eq!(line.text(), "ix ther");
    }

    #[test]
    fn test_ctrl_chars_are_not_inserted() {
        let mut line = InputLine::new(Vec2::ZERO, 10);
        feed(
            &mut line,
            KeyEventData::new(KeyCode::Char('c'), Modifier::Ctrl),
        );
        assert_eq!(line.text(), "");
    }

    #[test]
    fn test_submit_commits_to_history_and_clears() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut line = InputLine::new(Vec2::ZERO, 10);
        let s = Rc::clone(&seen);
        line.on_submit
            .add(Phase::After, move |l: &String| s.borrow_mut().push(l.clone()));

        type_str(&mut line, "one");
        feed(&mut line, KeyEventData::sym(SymKey::Enter));
        assert_eq!(line.text(), "");
        assert_eq!(line.history(), ["one"]);
        assert_eq!(*seen.borrow(), vec!["one".to_owned()]);
    }

    #[test]
    fn test_history_navigation_round_trip() {
        let mut line = InputLine::new(Vec2::ZERO, 10);
        for s in ["first", "second"] {
            type_str(&mut line, s);
            feed(&mut line, KeyEventData::sym(SymKey::Enter));
        }
        type_str(&mut line, "dra");

        feed(&mut line, KeyEventData::sym(SymKey::Up));
        assert_eq!(line.text(), "second");
        feed(&mut line, KeyEventData::sym(SymKey::Up));
        assert_eq!(line.text(), "first");
        feed(&mut line, KeyEventData::sym(SymKey::Down));
        assert_eq!(line.text(), "second");
        feed(&mut line, KeyEventData::sym(SymKey::Down));
        // Back past the newest entry restores the draft.
        assert_eq!(line.text(), "dra");
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut line = InputLine::new(Vec2::ZERO, 5);
        type_str(&mut line, "abcdefgh");
        // Cursor past the window scrolled the view.
        assert_eq!(line.cursor(), 8);
        let mut screen = weft_core::TestBackend::new(5, 1);
        line.draw(&mut screen);
        assert_eq!(screen.row_text(0), "fgh  ");
    }
}

//! A scrollable selection list.

use weft_core::chord::KeyDispatch;
use weft_core::draw;
use weft_core::{
    Attrs, Backend, Cell, Draw, EventContext, HitArea, InputRouter, KeyboardHandler, MouseButton,
    MouseHandler, Notifier, Phase, Resize, Style, Vec2, Widget, WidgetCore,
};

/// A vertical list with one selected row.
///
/// Vi-flavored navigation: arrows and the mouse wheel move the
/// selection, `g g` jumps to the top, `G` to the bottom, and a pending
/// repeat count multiplies an arrow step (`1 2 DOWN` moves twelve
/// rows). Selection changes fire [`ListView::on_select`].
pub struct ListView {
    core: WidgetCore,
    router: InputRouter<ListView>,
    items: Vec<String>,
    selected: usize,
    offset: usize,
    cycling: bool,
    style: Style,
    /// Fired around selection changes: `Before` with the outgoing row,
    /// `After` with the new one.
    pub on_select: Notifier<usize>,
}

impl ListView {
    /// A list at `pos` of the given size.
    #[must_use]
    pub fn new(pos: Vec2, size: Vec2, items: Vec<String>) -> Self {
        let mut core = WidgetCore::new();
        core.set_position(pos);
        core.set_size(size);

        let mut router = InputRouter::new();
        let step = |delta: i64| {
            move |list: &mut ListView, ctx: &mut EventContext| {
                let count = if ctx.has_repeat() {
                    i64::try_from(ctx.repeat().max(1)).unwrap_or(i64::MAX)
                } else {
                    1
                };
                list.move_selection(delta * count);
            }
        };
        router.bind("UP", step(-1)).expect("static chord spelling");
        router.bind("DOWN", step(1)).expect("static chord spelling");
        router
            .bind("PGUP", |list: &mut Self, _| {
                list.move_selection(-list.page_step());
            })
            .expect("static chord spelling");
        router
            .bind("PGDN", |list: &mut Self, _| {
                list.move_selection(list.page_step());
            })
            .expect("static chord spelling");
        router
            .bind("g g", |list: &mut Self, _| list.select(0))
            .expect("static chord spelling");
        router
            .bind("S-G", |list: &mut Self, _| {
                list.select(list.items.len().saturating_sub(1));
            })
            .expect("static chord spelling");
        router.add_area(HitArea::new(MouseButton::WheelUp, |list: &mut Self, _, _| {
            list.move_selection(-1);
        }));
        router.add_area(HitArea::new(
            MouseButton::WheelDown,
            |list: &mut Self, _, _| list.move_selection(1),
        ));

        Self {
            core,
            router,
            items,
            selected: 0,
            offset: 0,
            cycling: false,
            style: Style::default(),
            on_select: Notifier::new(),
        }
    }

    /// Wrap from the last row to the first and back.
    pub fn set_cycling(&mut self, cycling: bool) {
        self.cycling = cycling;
    }

    /// Replace the style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    /// The selected row index.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The selected item, if the list is non-empty.
    #[must_use]
    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// The items.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Append an item.
    pub fn push_item(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Replace the items, clamping the selection.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        let last = self.items.len().saturating_sub(1);
        if self.selected > last {
            self.select(last);
        }
        self.ensure_visible();
    }

    fn page_step(&self) -> i64 {
        i64::from(self.core.size().y.max(1))
    }

    fn move_selection(&mut self, delta: i64) {
        if self.items.is_empty() {
            return;
        }
        let len = i64::try_from(self.items.len()).unwrap_or(i64::MAX);
        let current = i64::try_from(self.selected).unwrap_or(0);
        let target = if self.cycling {
            (current + delta).rem_euclid(len)
        } else {
            (current + delta).clamp(0, len - 1)
        };
        self.select(usize::try_from(target).unwrap_or(0));
    }

    fn select(&mut self, index: usize) {
        let index = index.min(self.items.len().saturating_sub(1));
        if index == self.selected {
            return;
        }
        self.on_select.notify(Phase::Before, &self.selected);
        self.selected = index;
        self.ensure_visible();
        self.on_select.notify(Phase::After, &self.selected);
    }

    fn ensure_visible(&mut self) {
        let height = usize::try_from(self.core.size().y.max(1)).unwrap_or(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected + 1 - height;
        }
    }
}

impl Draw for ListView {
    fn draw(&mut self, screen: &mut dyn Backend) {
        let pos = self.core.position();
        let size = self.core.size();
        for row in 0..size.y {
            let at = pos + Vec2::new(0, row);
            let idx = self.offset + usize::try_from(row).unwrap_or(0);
            let style = if idx == self.selected && !self.items.is_empty() {
                self.style.with_attrs(self.style.attrs | Attrs::REVERSE)
            } else {
                self.style
            };
            draw::h_line(screen, at, size.x, Cell::new(' ', style));
            if let Some(item) = self.items.get(idx) {
                draw::text_line(screen, at, size.x, item, style, Some('\u{2026}'));
            }
        }
    }
}

impl Resize for ListView {
    fn resize(&mut self, _size: Vec2) {
        self.ensure_visible();
    }
}

impl KeyboardHandler for ListView {
    fn process_key(&mut self, ctx: &mut EventContext) -> KeyDispatch {
        let mut router = std::mem::take(&mut self.router);
        let d = router.dispatch_key(self, ctx);
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        d
    }
}

impl MouseHandler for ListView {
    fn process_mouse(&mut self, ctx: &mut EventContext) -> bool {
        let mut router = std::mem::take(&mut self.router);
        let hit = router.dispatch_mouse(self, ctx, self.core.position(), self.core.size());
        router.absorb(std::mem::take(&mut self.router));
        self.router = router;
        hit
    }
}

impl Widget for ListView {
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
    use weft_core::{KeyEventData, Modifier, SymKey, TermEvent, TestBackend};

    fn items(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item {i}")).collect()
    }

    fn feed(list: &mut ListView, ev: KeyEventData) {
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Key(ev));
        list.process_key(&mut ctx);
    }

    #[test]
    fn test_arrows_move_and_clamp() {
        let mut list = ListView::new(Vec2::ZERO, Vec2::new(10, 4), items(3));
        feed(&mut list, KeyEventData::sym(SymKey::Up));
        assert_eq!(list.selected(), 0);
        for _ in 0..5 {
            feed(&mut list, KeyEventData::sym(SymKey::Down));
        }
        assert_eq!(list.selected(), 2);
    }

    #[test]
    fn test_cycling_wraps_both_ways() {
        let mut list = ListView::new(Vec2::ZERO, Vec2::new(10, 4), items(3));
        list.set_cycling(true);
        feed(&mut list, KeyEventData::sym(SymKey::Up));
        assert_eq!(list.selected(), 2);
        feed(&mut list, KeyEventData::sym(SymKey::Down));
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_vi_jumps() {
        let mut list = ListView::new(Vec2::ZERO, Vec2::new(10, 4), items(10));
        feed(
            &mut list,
            KeyEventData::new(weft_core::KeyCode::Char('G'), Modifier::Shift),
        );
        assert_eq!(list.selected(), 9);

        feed(&mut list, KeyEventData::ch('g'));
        assert_eq!(list.selected(), 9);
        feed(&mut list, KeyEventData::ch('g'));
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_selection_scrolls_the_view() {
        let mut list = ListView::new(Vec2::ZERO, Vec2::new(10, 3), items(10));
        for _ in 0..5 {
            feed(&mut list, KeyEventData::sym(SymKey::Down));
        }
        assert_eq!(list.selected(), 5);

        let mut screen = TestBackend::new(10, 3);
        list.draw(&mut screen);
        assert_eq!(screen.row_text(0), "item 3    ");
        assert_eq!(screen.row_text(2), "item 5    ");
    }

    #[test]
    fn test_select_notifies_old_then_new() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = ListView::new(Vec2::ZERO, Vec2::new(10, 4), items(5));
        let l = Rc::clone(&log);
        list.on_select
            .add(Phase::Before, move |i| l.borrow_mut().push(("old", *i)));
        let l = Rc::clone(&log);
        list.on_select
            .add(Phase::After, move |i| l.borrow_mut().push(("new", *i)));

        feed(&mut list, KeyEventData::sym(SymKey::Down));
        assert_eq!(*log.borrow(), vec![("old", 0), ("new", 1)]);
    }

    #[test]
    fn test_wheel_moves_selection() {
        let mut list = ListView::new(Vec2::ZERO, Vec2::new(10, 4), items(5));
        let mut ctx = EventContext::default();
        ctx.set_event(TermEvent::Mouse(weft_core::MouseEventData {
            button: MouseButton::WheelDown,
            pos: Vec2::new(2, 2),
        }));
        assert!(list.process_mouse(&mut ctx));
        assert_eq!(list.selected(), 1);
    }

    #[test]
    fn test_set_items_clamps_selection() {
        let mut list = ListView::new(Vec2::ZERO, Vec2::new(10, 4), items(10));
        for _ in 0..8 {
            feed(&mut list, KeyEventData::sym(SymKey::Down));
        }
        list.set_items(items(3));
        assert_eq!(list.selected(), 2);
    }
}

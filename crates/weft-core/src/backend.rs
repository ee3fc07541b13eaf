//! The terminal abstraction the runtime draws through.

use crate::error::Result;
use crate::event::TermEvent;
use crate::geometry::Vec2;
use crate::style::{Cell, ColorMode, Style};
use std::time::Duration;

/// Everything the runtime needs from a terminal.
///
/// One buffered cell grid plus an event source. Implementations own
/// their terminal state end to end; raw-mode setup and teardown are the
/// implementation's constructor and `Drop`, not part of this trait.
pub trait Backend {
    /// Current terminal dimensions in cells.
    fn size(&self) -> Vec2;

    /// Wait up to `timeout` for the next event.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<TermEvent>>;

    /// Reset every buffered cell to the background style.
    fn clear_buffer(&mut self);

    /// Clear the physical screen as well as the buffer.
    fn clear_screen(&mut self) -> Result<()>;

    /// Write one buffered cell. Out-of-bounds positions are ignored.
    fn set_cell(&mut self, pos: Vec2, cell: Cell);

    /// Read one buffered cell, `None` out of bounds.
    fn cell_at(&self, pos: Vec2) -> Option<Cell>;

    /// Push buffered changes to the terminal.
    fn flush(&mut self) -> Result<()>;

    /// Place the visible cursor.
    fn set_cursor(&mut self, pos: Vec2) -> Result<()>;

    /// Hide the visible cursor.
    fn hide_cursor(&mut self) -> Result<()>;

    /// Style used by [`Backend::clear_buffer`] for empty cells.
    fn set_background(&mut self, style: Style);

    /// Select how colors are resolved on output.
    fn set_color_mode(&mut self, mode: ColorMode);
}

/// In-memory backend with a scripted event queue.
///
/// Drives the runtime in tests: drawing lands in an inspectable cell
/// grid and `poll_event` replays the scripted events, then reports
/// timeouts forever.
#[derive(Debug)]
pub struct TestBackend {
    size: Vec2,
    cells: Vec<Cell>,
    background: Style,
    events: std::collections::VecDeque<TermEvent>,
    /// Number of completed flushes.
    pub flush_count: u64,
    /// Last cursor position set, if any.
    pub cursor: Option<Vec2>,
    color_mode: ColorMode,
}

impl TestBackend {
    /// A blank grid of the given dimensions.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let len = usize::try_from(width.max(0) * height.max(0)).unwrap_or(0);
        Self {
            size: Vec2::new(width, height),
            cells: vec![Cell::default(); len],
            background: Style::default(),
            events: std::collections::VecDeque::new(),
            flush_count: 0,
            cursor: None,
            color_mode: ColorMode::default(),
        }
    }

    /// Append an event to the script.
    pub fn push_event(&mut self, ev: TermEvent) {
        self.events.push_back(ev);
    }

    /// Whether any scripted event remains.
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn index(&self, pos: Vec2) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.size.x || pos.y >= self.size.y {
            return None;
        }
        usize::try_from(pos.y * self.size.x + pos.x).ok()
    }

    /// The characters of one row as a string, for assertions.
    #[must_use]
    pub fn row_text(&self, y: i32) -> String {
        (0..self.size.x)
            .filter_map(|x| self.cell_at(Vec2::new(x, y)))
            .map(|c| c.ch)
            .collect()
    }
}

impl Backend for TestBackend {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn poll_event(&mut self, _timeout: Duration) -> Result<Option<TermEvent>> {
        Ok(self.events.pop_front())
    }

    fn clear_buffer(&mut self) {
        let blank = Cell {
            ch: ' ',
            style: self.background,
        };
        self.cells.fill(blank);
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.clear_buffer();
        Ok(())
    }

    fn set_cell(&mut self, pos: Vec2, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_count += 1;
        Ok(())
    }

    fn set_cursor(&mut self, pos: Vec2) -> Result<()> {
        self.cursor = Some(pos);
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.cursor = None;
        Ok(())
    }

    fn set_background(&mut self, style: Style) {
        self.background = style;
    }

    fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyEventData;

    #[test]
    fn test_scripted_events_replay_in_order() {
        let mut backend = TestBackend::new(10, 4);
        backend.push_event(TermEvent::Key(KeyEventData::ch('a')));
        backend.push_event(TermEvent::Resize(Vec2::new(20, 8)));

        let t = Duration::from_millis(1);
        assert_eq!(
            backend.poll_event(t).unwrap(),
            Some(TermEvent::Key(KeyEventData::ch('a')))
        );
        assert_eq!(
            backend.poll_event(t).unwrap(),
            Some(TermEvent::Resize(Vec2::new(20, 8)))
        );
        assert_eq!(backend.poll_event(t).unwrap(), None);
    }

    #[test]
    fn test_out_of_bounds_writes_are_ignored() {
        let mut backend = TestBackend::new(4, 2);
        backend.set_cell(Vec2::new(5, 0), Cell::from_char('x'));
        backend.set_cell(Vec2::new(-1, 1), Cell::from_char('x'));
        backend.set_cell(Vec2::new(3, 1), Cell::from_char('x'));

        assert_eq!(backend.cell_at(Vec2::new(5, 0)), None);
        assert_eq!(backend.row_text(1), "   x");
    }
}
